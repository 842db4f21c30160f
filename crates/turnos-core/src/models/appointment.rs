//! Appointment models for the admin dashboard.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::validation::{notes, FieldResult};

/// Lifecycle status of an appointment.
///
/// Transitions only move forward: pending → confirmed → completed, or
/// pending/confirmed → cancelled. The legacy Spanish spellings written by
/// older builds of the front-end are still accepted on read.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[serde(alias = "solicitada")]
    Pending,
    #[serde(alias = "confirmada")]
    Confirmed,
    #[serde(alias = "cancelada")]
    Cancelled,
    #[serde(alias = "completada")]
    Completed,
}

impl AppointmentStatus {
    /// All statuses, in dashboard display order.
    pub const ALL: [AppointmentStatus; 4] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::Completed,
    ];

    /// Wire/storage spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
        }
    }

    /// Label shown to staff.
    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "Pendiente",
            AppointmentStatus::Confirmed => "Confirmada",
            AppointmentStatus::Cancelled => "Cancelada",
            AppointmentStatus::Completed => "Completada",
        }
    }

    /// Whether the appointment still occupies its slot.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Pending | AppointmentStatus::Confirmed
        )
    }

    /// Whether `next` is a legal forward move from this status.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Confirmed, Completed)
                | (Pending, Cancelled)
                | (Confirmed, Cancelled)
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognised status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown appointment status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for AppointmentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" | "solicitada" => Ok(AppointmentStatus::Pending),
            "confirmed" | "confirmada" => Ok(AppointmentStatus::Confirmed),
            "cancelled" | "cancelada" => Ok(AppointmentStatus::Cancelled),
            "completed" | "completada" => Ok(AppointmentStatus::Completed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A booked appointment as stored by the admin services.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    /// Slot start, `HH:MM`
    pub time: String,
    /// Insurance display name or code. Older admin builds stored the provider id
    /// under `healthInsurance`.
    #[serde(alias = "healthInsurance")]
    pub insurance: String,
    pub status: AppointmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Visit reason, only present on records written by the older admin builds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Creation timestamp (RFC 3339) when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Appointment {
    /// Sort key used by upcoming lists: date, then time.
    pub fn schedule_key(&self) -> (&str, &str) {
        (self.date.as_str(), self.time.as_str())
    }

    /// Append a line to the notes, keeping what was there.
    ///
    /// Fails without touching the notes when the result would be over the notes limit.
    pub fn append_note(&mut self, line: &str) -> FieldResult<()> {
        let combined = match self.notes.as_deref() {
            Some(existing) if !existing.trim().is_empty() => format!("{existing}\n{line}"),
            _ => line.to_string(),
        };
        self.notes = notes(Some(&combined))?;
        Ok(())
    }
}

/// Admin dashboard counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppointmentStats {
    pub total: usize,
    pub pending: usize,
    pub confirmed: usize,
    pub cancelled: usize,
    pub completed: usize,
}

impl AppointmentStats {
    /// Count statuses across a collection.
    pub fn from_appointments(appointments: &[Appointment]) -> Self {
        appointments
            .iter()
            .fold(Self::default(), |mut stats, appointment| {
                stats.total += 1;
                match appointment.status {
                    AppointmentStatus::Pending => stats.pending += 1,
                    AppointmentStatus::Confirmed => stats.confirmed += 1,
                    AppointmentStatus::Cancelled => stats.cancelled += 1,
                    AppointmentStatus::Completed => stats.completed += 1,
                }
                stats
            })
    }
}

/// Status filter used by the appointments table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(AppointmentStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: AppointmentStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

/// Validated filters for the appointments table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentFilters {
    pub status: StatusFilter,
    pub date: Option<String>,
    pub insurance: Option<String>,
    pub search: Option<String>,
}

impl AppointmentFilters {
    /// Whether an appointment passes every active filter.
    ///
    /// Search is a case-insensitive substring match on patient name or email.
    pub fn matches(&self, appointment: &Appointment) -> bool {
        if !self.status.matches(appointment.status) {
            return false;
        }
        if let Some(date) = &self.date {
            if &appointment.date != date {
                return false;
            }
        }
        if let Some(insurance) = &self.insurance {
            if &appointment.insurance != insurance {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let in_name = appointment.patient_name.to_lowercase().contains(&needle);
            let in_email = appointment.patient_email.to_lowercase().contains(&needle);
            if !in_name && !in_email {
                return false;
            }
        }
        true
    }
}
