use crate::config::SlotPolicy;
use crate::entities::{BookingStatus, booking_entity};
use crate::error::{AppError, AppResult};
use crate::utils::format_slot_time;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateBookingRequest {
    pub field_id: Uuid,
    /// `YYYY-MM-DD`
    #[schema(value_type = String, example = "2025-10-20")]
    pub booking_date: NaiveDate,
    /// `HH:MM`, one of the hourly slots
    #[schema(example = "14:00")]
    pub start_time: String,
    #[schema(example = 2)]
    pub duration_hours: u32,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingResponse {
    pub id: Uuid,
    pub field_id: Uuid,
    pub field_name: Option<String>,
    pub customer_id: Option<Uuid>,
    #[schema(value_type = String)]
    pub booking_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub status: BookingStatus,
    pub total_amount: i64,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl BookingResponse {
    pub fn from_model(model: booking_entity::Model, field_name: Option<String>) -> Self {
        Self {
            id: model.id,
            field_id: model.field_id,
            field_name,
            customer_id: model.customer_id,
            booking_date: model.booking_date,
            start_time: format_slot_time(model.start_time),
            end_time: format_slot_time(model.end_time),
            customer_name: model.customer_name,
            customer_phone: model.customer_phone,
            customer_email: model.customer_email,
            status: model.status,
            total_amount: model.total_amount,
            notes: model.notes,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
}

/// Staff booking list query. `status` is `all` or one of the statuses.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookingQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl BookingQuery {
    /// `None` means no status filter.
    pub fn status_filter(&self) -> AppResult<Option<BookingStatus>> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") | Some("all") => Ok(None),
            Some("pending") => Ok(Some(BookingStatus::Pending)),
            Some("paid") => Ok(Some(BookingStatus::Paid)),
            Some("canceled") => Ok(Some(BookingStatus::Canceled)),
            Some(other) => Err(AppError::ValidationError(format!(
                "Unknown status filter: {other}"
            ))),
        }
    }

    /// Lowercased search needle, if any.
    pub fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AvailabilityQuery {
    #[param(value_type = String, example = "2025-10-20")]
    #[schema(value_type = String)]
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct SlotAvailability {
    /// `HH:MM`
    pub time: String,
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityResponse {
    pub field_id: Uuid,
    #[schema(value_type = String)]
    pub date: NaiveDate,
    pub policy: SlotPolicy,
    pub slots: Vec<SlotAvailability>,
}

/// Settings subset shown on the payment page.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentSettings {
    pub qris_image_url: Option<String>,
    pub payment_instructions: Option<String>,
    pub whatsapp_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentDetailsResponse {
    pub booking: BookingResponse,
    pub payment: PaymentSettings,
    /// `wa.me` link with the prefilled confirmation, when a number is set
    pub whatsapp_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(None, None)]
    #[test_case(Some("all"), None)]
    #[test_case(Some("paid"), Some(BookingStatus::Paid))]
    #[test_case(Some("canceled"), Some(BookingStatus::Canceled))]
    fn test_status_filter(raw: Option<&str>, expected: Option<BookingStatus>) {
        let query = BookingQuery {
            status: raw.map(str::to_string),
            ..Default::default()
        };
        assert_eq!(query.status_filter().unwrap(), expected);
    }

    #[test]
    fn test_status_filter_rejects_unknown() {
        let query = BookingQuery {
            status: Some("refunded".into()),
            ..Default::default()
        };
        assert!(query.status_filter().is_err());
    }

    #[test]
    fn test_needle_is_lowercased() {
        let query = BookingQuery {
            search: Some("  BuDi ".into()),
            ..Default::default()
        };
        assert_eq!(query.needle().as_deref(), Some("budi"));
    }
}
