use crate::config::BookingConfig;
use crate::database::DbPool;
use crate::entities::{BookingStatus, booking_entity as bookings, field_entity as fields};
use crate::error::{AppError, AppResult};
use crate::models::{AvailabilityResponse, SlotAvailability};
use crate::utils::{BookedInterval, format_slot_time, hourly_slots, slot_availability};
use chrono::NaiveDate;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

/// Answers "which hourly slots are still free on this field and date".
#[derive(Clone)]
pub struct AvailabilityService {
    pool: DbPool,
    booking: BookingConfig,
}

impl AvailabilityService {
    pub fn new(pool: DbPool, booking: BookingConfig) -> Self {
        Self { pool, booking }
    }

    /// Non-canceled bookings of the field on `date`.
    pub async fn booked_intervals(&self, field_id: Uuid, date: NaiveDate) -> AppResult<Vec<BookedInterval>> {
        let rows = bookings::Entity::find()
            .filter(bookings::Column::FieldId.eq(field_id))
            .filter(bookings::Column::BookingDate.eq(date))
            .filter(bookings::Column::Status.ne(BookingStatus::Canceled))
            .order_by_asc(bookings::Column::StartTime)
            .all(self.pool.as_ref())
            .await?;

        Ok(rows
            .into_iter()
            .map(|b| BookedInterval {
                start: b.start_time,
                end: b.end_time,
                status: b.status,
            })
            .collect())
    }

    /// A failed read is an error, never "everything free".
    pub async fn check_availability(&self, field_id: Uuid, date: NaiveDate) -> AppResult<AvailabilityResponse> {
        fields::Entity::find_by_id(field_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Field not found".to_string()))?;

        let booked = self.booked_intervals(field_id, date).await?;
        let candidates = hourly_slots(self.booking.opening_hour, self.booking.closing_hour);
        let slots = slot_availability(self.booking.slot_policy, &candidates, &booked)
            .into_iter()
            .map(|(time, available)| SlotAvailability {
                time: format_slot_time(time),
                available,
            })
            .collect();

        Ok(AvailabilityResponse {
            field_id,
            date,
            policy: self.booking.slot_policy,
            slots,
        })
    }
}
