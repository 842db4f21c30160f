//! Booking wizard models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Raw patient form as typed into the booking wizard.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PatientInfoForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    /// `YYYY-MM-DD`
    pub birth_date: String,
    pub insurance: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Validated and normalized patient information.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PatientInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: NaiveDate,
    pub insurance: String,
    pub notes: Option<String>,
}

impl PatientInfo {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Data accumulated across the wizard steps.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingData {
    pub selected_date: Option<NaiveDate>,
    /// `HH:MM`
    pub selected_time: Option<String>,
    pub patient_info: Option<PatientInfo>,
}

/// Fields contributed by a single step; unset fields keep their value on merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingPatch {
    pub selected_date: Option<NaiveDate>,
    pub selected_time: Option<String>,
    pub patient_info: Option<PatientInfo>,
}

impl BookingData {
    /// Return a merged copy; `self` is left untouched.
    ///
    /// Moving to a different date drops the time picked for the old one, unless
    /// the patch brings its own.
    pub fn merge(&self, patch: BookingPatch) -> BookingData {
        let date_changed = patch
            .selected_date
            .map_or(false, |date| self.selected_date != Some(date));
        let previous_time = self.selected_time.clone().filter(|_| !date_changed);
        BookingData {
            selected_date: patch.selected_date.or(self.selected_date),
            selected_time: patch.selected_time.or(previous_time),
            patient_info: patch.patient_info.or_else(|| self.patient_info.clone()),
        }
    }

    /// All three parts present, in typed form.
    pub fn completed(&self) -> Option<CompletedBooking> {
        Some(CompletedBooking {
            date: self.selected_date?,
            time: self.selected_time.clone()?,
            patient: self.patient_info.clone()?,
        })
    }
}

/// A booking with every step filled in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletedBooking {
    pub date: NaiveDate,
    pub time: String,
    pub patient: PatientInfo,
}

/// Result of the final confirm action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingConfirmation {
    /// Human-readable reference, e.g. `DR-482913`
    pub reference: String,
    pub booking: CompletedBooking,
}

/// Availability of one slot on a given day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SlotAvailability {
    pub time: String,
    pub is_available: bool,
    pub is_booked: bool,
}
