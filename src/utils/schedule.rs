//! Hourly slot schedule and the booking conflict check.

use crate::config::SlotPolicy;
use crate::entities::BookingStatus;
use crate::error::{AppError, AppResult};
use chrono::{NaiveTime, Timelike};
use std::ops::RangeInclusive;

/// Bookable durations, in hours
pub const ALLOWED_DURATIONS: RangeInclusive<u32> = 1..=4;

/// Latest hour a booking may end at; end times live on the same day.
pub const LATEST_END_HOUR: u32 = 23;

/// Hourly start times from `opening_hour` through `closing_hour` inclusive.
pub fn hourly_slots(opening_hour: u32, closing_hour: u32) -> Vec<NaiveTime> {
    (opening_hour..=closing_hour)
        .filter_map(|h| NaiveTime::from_hms_opt(h, 0, 0))
        .collect()
}

/// Accepts `HH:MM` or `HH:MM:SS`.
pub fn parse_slot_time(raw: &str) -> AppResult<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| AppError::ValidationError(format!("Invalid time: {raw}")))
}

pub fn format_slot_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Rejects start times that are not one of the configured hourly slots.
pub fn ensure_on_schedule(start: NaiveTime, opening_hour: u32, closing_hour: u32) -> AppResult<()> {
    let on_the_hour = start.minute() == 0 && start.second() == 0;
    if !on_the_hour || start.hour() < opening_hour || start.hour() > closing_hour {
        return Err(AppError::ValidationError(format!(
            "Start time {} is not a bookable slot ({:02}:00-{:02}:00)",
            format_slot_time(start),
            opening_hour,
            closing_hour
        )));
    }
    Ok(())
}

/// `start + duration_hours`, restricted to the same day.
pub fn end_time_for(start: NaiveTime, duration_hours: u32) -> AppResult<NaiveTime> {
    if !ALLOWED_DURATIONS.contains(&duration_hours) {
        return Err(AppError::ValidationError(format!(
            "Duration must be between {} and {} hours",
            ALLOWED_DURATIONS.start(),
            ALLOWED_DURATIONS.end()
        )));
    }
    let end_hour = start.hour() + duration_hours;
    if end_hour > LATEST_END_HOUR {
        return Err(AppError::ValidationError(format!(
            "Booking must end by {LATEST_END_HOUR:02}:00"
        )));
    }
    NaiveTime::from_hms_opt(end_hour, start.minute(), 0)
        .ok_or_else(|| AppError::ValidationError("Invalid end time".to_string()))
}

/// An existing booking as seen by the conflict check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookedInterval {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub status: BookingStatus,
}

fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

impl BookedInterval {
    /// Canceled bookings never block anything.
    pub fn blocks(&self, policy: SlotPolicy, candidate: NaiveTime) -> bool {
        if self.status == BookingStatus::Canceled {
            return false;
        }
        match policy {
            SlotPolicy::ExactStart => self.start == candidate,
            SlotPolicy::Overlap => {
                let slot_start = minute_of_day(candidate);
                let slot_end = slot_start + 60;
                minute_of_day(self.start) < slot_end && slot_start < minute_of_day(self.end)
            }
        }
    }
}

/// Annotates every candidate with whether it is still free, keeping
/// candidate order.
pub fn slot_availability(
    policy: SlotPolicy,
    candidates: &[NaiveTime],
    booked: &[BookedInterval],
) -> Vec<(NaiveTime, bool)> {
    candidates
        .iter()
        .map(|&slot| {
            let taken = booked.iter().any(|b| b.blocks(policy, slot));
            (slot, !taken)
        })
        .collect()
}

pub fn available_slots(
    policy: SlotPolicy,
    candidates: &[NaiveTime],
    booked: &[BookedInterval],
) -> Vec<NaiveTime> {
    slot_availability(policy, candidates, booked)
        .into_iter()
        .filter_map(|(slot, free)| free.then_some(slot))
        .collect()
}
