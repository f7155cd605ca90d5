//! `wa.me` deep links with a prefilled payment confirmation.

use crate::error::{AppError, AppResult};
use crate::models::BookingResponse;
use crate::utils::normalize_whatsapp_number;
use url::{Url, form_urlencoded};

const WA_ME: &str = "https://wa.me/";

pub fn confirmation_message(booking: &BookingResponse) -> String {
    format!(
        "Hello, I have paid for my booking.\n\
         Name: {}\n\
         Field: {}\n\
         Date: {}\n\
         Time: {} - {}\n\
         Total: Rp {}\n\
         Booking ID: {}",
        booking.customer_name,
        booking.field_name.as_deref().unwrap_or("-"),
        booking.booking_date.format("%d %B %Y"),
        booking.start_time,
        booking.end_time,
        booking.total_amount,
        booking.id,
    )
}

/// Builds `https://wa.me/<number>?text=<message>`. Spaces are sent as `%20`
/// since the app does not decode `+`.
pub fn chat_link(number: &str, message: &str) -> AppResult<String> {
    let number = normalize_whatsapp_number(number);
    if number.is_empty() {
        return Err(AppError::ValidationError(
            "WhatsApp number has no digits".to_string(),
        ));
    }

    let mut url = Url::parse(WA_ME)
        .and_then(|base| base.join(&number))
        .map_err(|e| AppError::InternalError(format!("wa.me url: {e}")))?;

    let text: String = form_urlencoded::byte_serialize(message.as_bytes()).collect();
    url.set_query(Some(&format!("text={}", text.replace('+', "%20"))));
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::BookingStatus;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn booking() -> BookingResponse {
        BookingResponse {
            id: Uuid::nil(),
            field_id: Uuid::nil(),
            field_name: Some("Court A".into()),
            customer_id: None,
            booking_date: NaiveDate::from_ymd_opt(2025, 10, 20).unwrap(),
            start_time: "14:00".into(),
            end_time: "16:00".into(),
            customer_name: "Budi".into(),
            customer_phone: "081234567890".into(),
            customer_email: None,
            status: BookingStatus::Pending,
            total_amount: 300000,
            notes: None,
            created_at: None,
        }
    }

    #[test]
    fn test_confirmation_message_lists_booking() {
        let msg = confirmation_message(&booking());
        assert!(msg.contains("Name: Budi"));
        assert!(msg.contains("Field: Court A"));
        assert!(msg.contains("Date: 20 October 2025"));
        assert!(msg.contains("Time: 14:00 - 16:00"));
        assert!(msg.contains("Total: Rp 300000"));
    }

    #[test]
    fn test_chat_link_normalizes_and_encodes() {
        let link = chat_link("0812-3456-7890", "Hi there & thanks+1").unwrap();
        assert_eq!(
            link,
            "https://wa.me/6281234567890?text=Hi%20there%20%26%20thanks%2B1"
        );
    }

    #[test]
    fn test_chat_link_requires_digits() {
        assert!(chat_link("n/a", "hello").is_err());
    }
}
