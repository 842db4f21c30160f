//! Which days and slots the wizard offers.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ClinicConfig;
use crate::models::SlotAvailability;
use crate::validation::{format_minutes, is_working_day, time_to_minutes};

/// Why a calendar day cannot be selected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DateRejection {
    Past,
    Weekend,
    Blackout,
}

impl DateRejection {
    /// Message shown next to the calendar.
    pub fn message(&self) -> &'static str {
        match self {
            DateRejection::Past => "Past dates cannot be selected",
            DateRejection::Weekend => "The office is closed on weekends",
            DateRejection::Blackout => "The office is closed on this date",
        }
    }
}

impl std::fmt::Display for DateRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Check a day against the disqualification rules, past dates first.
pub fn check_date(
    date: NaiveDate,
    today: NaiveDate,
    config: &ClinicConfig,
) -> Result<(), DateRejection> {
    if date < today {
        return Err(DateRejection::Past);
    }
    if !is_working_day(date) {
        return Err(DateRejection::Weekend);
    }
    let closed = config
        .blackout_days
        .iter()
        .any(|day| day.month == date.month() && day.day == date.day());
    if closed {
        return Err(DateRejection::Blackout);
    }
    Ok(())
}

pub fn is_date_disabled(date: NaiveDate, today: NaiveDate, config: &ClinicConfig) -> bool {
    check_date(date, today, config).is_err()
}

/// Every slot start offered in a day, in order.
pub fn slot_grid(config: &ClinicConfig) -> Vec<String> {
    let step = config.slot_minutes.max(1);
    config
        .sessions
        .iter()
        .filter_map(|session| {
            let start = time_to_minutes(&session.start)?;
            let end = time_to_minutes(&session.end)?;
            Some((start..end).step_by(step as usize).map(format_minutes))
        })
        .flatten()
        .collect()
}

/// Slot grid with the booked slots marked unavailable.
pub fn slot_availability(config: &ClinicConfig) -> Vec<SlotAvailability> {
    slot_grid(config)
        .into_iter()
        .map(|time| {
            let is_booked = config.booked_slots.iter().any(|booked| booked == &time);
            SlotAvailability {
                time,
                is_available: !is_booked,
                is_booked,
            }
        })
        .collect()
}

/// Human-readable booking reference: `DR-` and the last six digits of the epoch millis.
pub fn booking_reference(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().unsigned_abs() % 1_000_000;
    format!("DR-{millis:06}")
}
