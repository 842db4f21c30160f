//! Clinic configuration.
//!
//! Every field has a default matching the practice's current setup, so a JSON
//! document only needs to carry the values it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::{appointment_time, time_to_minutes, EmailPolicy, SLOT_MINUTES};

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// A block of consulting hours; `end` is exclusive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionWindow {
    pub start: String,
    pub end: String,
}

impl SessionWindow {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
        }
    }
}

/// A recurring closed day (holiday), independent of year.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

/// Keys under which collections are persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageKeys {
    pub appointments: String,
    pub insurances: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            appointments: "dr_osvaldo_appointments".into(),
            insurances: "dr_osvaldo_health_insurances".into(),
        }
    }
}

/// Booking and storage settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClinicConfig {
    /// Consulting hours offered by the booking wizard
    pub sessions: Vec<SessionWindow>,
    /// Slot length in minutes
    pub slot_minutes: u32,
    /// Slots reported as already taken on every day
    pub booked_slots: Vec<String>,
    /// Days the practice is closed
    pub blackout_days: Vec<MonthDay>,
    /// Simulated latency of the final booking confirmation
    pub confirmation_delay_ms: u64,
    /// Email domains accepted on patient forms
    pub email_policy: EmailPolicy,
    pub storage: StorageKeys,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            sessions: vec![
                SessionWindow::new("09:00", "12:00"),
                SessionWindow::new("13:00", "18:00"),
            ],
            slot_minutes: 30,
            booked_slots: vec![
                "10:30".into(),
                "14:00".into(),
                "15:30".into(),
                "16:00".into(),
            ],
            blackout_days: vec![MonthDay { month: 9, day: 15 }],
            confirmation_delay_ms: 2000,
            email_policy: EmailPolicy::CommonDomains,
            storage: StorageKeys::default(),
        }
    }
}

impl ClinicConfig {
    /// Parse and check a JSON document.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: ClinicConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Same settings with no artificial confirmation delay.
    pub fn without_delay(mut self) -> Self {
        self.confirmation_delay_ms = 0;
        self
    }

    /// Reject settings the wizard cannot work with.
    ///
    /// Session bounds and booked slots must be bookable appointment times, so every
    /// slot the wizard offers passes [`appointment_time`].
    pub fn validate(&self) -> ConfigResult<()> {
        if self.slot_minutes == 0
            || 60 % self.slot_minutes != 0
            || self.slot_minutes % SLOT_MINUTES != 0
        {
            return Err(ConfigError::Invalid(format!(
                "slot_minutes must be a multiple of {SLOT_MINUTES} dividing an hour, got {}",
                self.slot_minutes
            )));
        }
        if self.sessions.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one session is required".into(),
            ));
        }
        for session in &self.sessions {
            let start = bookable_minutes(&session.start)?;
            let end = bookable_minutes(&session.end)?;
            if start >= end {
                return Err(ConfigError::Invalid(format!(
                    "session {}-{} ends before it starts",
                    session.start, session.end
                )));
            }
        }
        for slot in &self.booked_slots {
            bookable_minutes(slot)?;
        }
        for day in &self.blackout_days {
            if !(1..=12).contains(&day.month) || !(1..=31).contains(&day.day) {
                return Err(ConfigError::Invalid(format!(
                    "blackout day {}/{} is not a calendar day",
                    day.day, day.month
                )));
            }
        }
        if self.storage.appointments.is_empty() || self.storage.insurances.is_empty() {
            return Err(ConfigError::Invalid(
                "storage keys must not be empty".into(),
            ));
        }
        Ok(())
    }
}

fn bookable_minutes(raw: &str) -> ConfigResult<u32> {
    let invalid = |reason: String| ConfigError::Invalid(format!("invalid time {raw}: {reason}"));
    let time = appointment_time(raw).map_err(invalid)?;
    time_to_minutes(&time).ok_or_else(|| invalid("unreadable".into()))
}
