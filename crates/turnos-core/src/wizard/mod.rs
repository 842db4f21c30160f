//! Booking wizard.
//!
//! ```text
//!   Date ──select_date──▶ Time ──select_time + confirm_time──▶ Form
//!    ▲                     │                                    │
//!    └──────back───────────┘◀──────────────back─────────────────┤
//!                                                     submit_patient_info
//!                                                               │
//!                                                               ▼
//!                        [success] ◀──confirm_booking── Confirmation
//! ```
//!
//! Steps are strictly linear. Going back never discards data; the success
//! screen is a flag on the wizard, not a step of its own.

mod availability;

pub use availability::*;

use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::ClinicConfig;
use crate::models::{
    BookingConfirmation, BookingData, BookingPatch, PatientInfoForm, SlotAvailability,
};
use crate::validation::{validate_patient_info, ValidationContext, ValidationErrors};

/// Wizard steps, in order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BookingStep {
    Date,
    Time,
    Form,
    Confirmation,
}

impl BookingStep {
    pub const TOTAL: u32 = 4;

    /// 1-based position for the progress indicator.
    pub fn number(&self) -> u32 {
        match self {
            BookingStep::Date => 1,
            BookingStep::Time => 2,
            BookingStep::Form => 3,
            BookingStep::Confirmation => 4,
        }
    }

    pub fn previous(&self) -> Option<BookingStep> {
        match self {
            BookingStep::Date => None,
            BookingStep::Time => Some(BookingStep::Date),
            BookingStep::Form => Some(BookingStep::Time),
            BookingStep::Confirmation => Some(BookingStep::Form),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStep::Date => "date",
            BookingStep::Time => "time",
            BookingStep::Form => "form",
            BookingStep::Confirmation => "confirmation",
        }
    }
}

/// Why a wizard action was refused. The wizard state is unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WizardError {
    #[error("Action only allowed at the {expected:?} step (current: {actual:?})")]
    WrongStep {
        expected: BookingStep,
        actual: BookingStep,
    },

    #[error("{0}")]
    DateUnavailable(DateRejection),

    #[error("Unknown time slot: {0}")]
    UnknownSlot(String),

    #[error("Time slot {0} is already booked")]
    SlotUnavailable(String),

    #[error("No time slot selected")]
    NoSlotSelected,

    #[error("Invalid patient information: {0}")]
    Invalid(ValidationErrors),

    #[error("Booking data is incomplete")]
    Incomplete,

    #[error("Booking already confirmed")]
    AlreadyCompleted,
}

pub type WizardResult<T> = Result<T, WizardError>;

/// Drives one booking from date selection to confirmation.
#[derive(Debug, Clone)]
pub struct BookingWizard {
    config: ClinicConfig,
    ctx: ValidationContext,
    step: BookingStep,
    data: BookingData,
    pending_slot: Option<String>,
    errors: Option<ValidationErrors>,
    confirmation: Option<BookingConfirmation>,
}

impl BookingWizard {
    /// Start a wizard whose notion of "today" is fixed to `today`.
    pub fn new(config: ClinicConfig, today: NaiveDate) -> Self {
        let ctx = ValidationContext::new(today).with_email_policy(config.email_policy);
        Self {
            config,
            ctx,
            step: BookingStep::Date,
            data: BookingData::default(),
            pending_slot: None,
            errors: None,
            confirmation: None,
        }
    }

    /// Start a wizard anchored on the local calendar date.
    pub fn starting_today(config: ClinicConfig) -> Self {
        Self::new(config, chrono::Local::now().date_naive())
    }

    pub fn step(&self) -> BookingStep {
        self.step
    }

    pub fn data(&self) -> &BookingData {
        &self.data
    }

    pub fn today(&self) -> NaiveDate {
        self.ctx.today
    }

    /// Slot picked at the time step but not yet confirmed.
    pub fn pending_slot(&self) -> Option<&str> {
        self.pending_slot.as_deref()
    }

    /// Field errors from the last rejected patient form.
    pub fn errors(&self) -> Option<&ValidationErrors> {
        self.errors.as_ref()
    }

    pub fn confirmation(&self) -> Option<&BookingConfirmation> {
        self.confirmation.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.confirmation.is_some()
    }

    /// `(current step number, total steps)`.
    pub fn progress(&self) -> (u32, u32) {
        (self.step.number(), BookingStep::TOTAL)
    }

    fn expect_step(&self, expected: BookingStep) -> WizardResult<()> {
        if self.confirmation.is_some() {
            return Err(WizardError::AlreadyCompleted);
        }
        if self.step != expected {
            return Err(WizardError::WrongStep {
                expected,
                actual: self.step,
            });
        }
        Ok(())
    }

    fn advance(&mut self, patch: BookingPatch, next: BookingStep) {
        self.data = self.data.merge(patch);
        debug!(from = self.step.as_str(), to = next.as_str(), "booking step advanced");
        self.step = next;
    }

    /// Pick the appointment day and move to the time step.
    pub fn select_date(&mut self, date: NaiveDate) -> WizardResult<()> {
        self.expect_step(BookingStep::Date)?;
        check_date(date, self.ctx.today, &self.config).map_err(|rejection| {
            debug!(%date, reason = ?rejection, "date rejected");
            WizardError::DateUnavailable(rejection)
        })?;

        // The merge drops a time chosen for another day; the highlight goes with it.
        if self.data.selected_date != Some(date) {
            self.pending_slot = None;
        }
        self.advance(
            BookingPatch {
                selected_date: Some(date),
                ..Default::default()
            },
            BookingStep::Time,
        );
        Ok(())
    }

    /// Whether the calendar should offer `date` at all.
    pub fn is_date_disabled(&self, date: NaiveDate) -> bool {
        is_date_disabled(date, self.ctx.today, &self.config)
    }

    /// Slots for the selected day; empty before a date is chosen.
    pub fn available_slots(&self) -> Vec<SlotAvailability> {
        if self.data.selected_date.is_none() {
            return Vec::new();
        }
        slot_availability(&self.config)
    }

    /// Highlight a slot. Does not advance; see [`confirm_time`](Self::confirm_time).
    pub fn select_time(&mut self, time: &str) -> WizardResult<()> {
        self.expect_step(BookingStep::Time)?;
        let slot = self
            .available_slots()
            .into_iter()
            .find(|slot| slot.time == time)
            .ok_or_else(|| WizardError::UnknownSlot(time.to_string()))?;
        if !slot.is_available {
            return Err(WizardError::SlotUnavailable(slot.time));
        }
        self.pending_slot = Some(slot.time);
        Ok(())
    }

    /// Accept the highlighted slot and move to the patient form.
    pub fn confirm_time(&mut self) -> WizardResult<()> {
        self.expect_step(BookingStep::Time)?;
        let time = self
            .pending_slot
            .clone()
            .or_else(|| self.data.selected_time.clone())
            .ok_or(WizardError::NoSlotSelected)?;
        self.pending_slot = None;
        self.advance(
            BookingPatch {
                selected_time: Some(time),
                ..Default::default()
            },
            BookingStep::Form,
        );
        Ok(())
    }

    /// Validate the patient form; on success move to the confirmation step.
    pub fn submit_patient_info(&mut self, form: &PatientInfoForm) -> WizardResult<()> {
        self.expect_step(BookingStep::Form)?;
        match validate_patient_info(form, &self.ctx) {
            Ok(patient_info) => {
                self.errors = None;
                self.advance(
                    BookingPatch {
                        patient_info: Some(patient_info),
                        ..Default::default()
                    },
                    BookingStep::Confirmation,
                );
                Ok(())
            }
            Err(errors) => {
                debug!(fields = ?errors.paths(), "patient form rejected");
                self.errors = Some(errors.clone());
                Err(WizardError::Invalid(errors))
            }
        }
    }

    /// Final confirm: waits the configured delay, then records the success.
    ///
    /// Nothing is persisted here; use
    /// [`AppointmentService::record_booking`](crate::services::AppointmentService::record_booking)
    /// to store the booking.
    pub fn confirm_booking(&mut self) -> WizardResult<BookingConfirmation> {
        self.expect_step(BookingStep::Confirmation)?;
        let booking = self.data.completed().ok_or(WizardError::Incomplete)?;

        if self.config.confirmation_delay_ms > 0 {
            std::thread::sleep(Duration::from_millis(self.config.confirmation_delay_ms));
        }

        let confirmation = BookingConfirmation {
            reference: booking_reference(chrono::Utc::now()),
            booking,
        };
        info!(
            reference = %confirmation.reference,
            date = %confirmation.booking.date,
            time = %confirmation.booking.time,
            "booking confirmed"
        );
        self.confirmation = Some(confirmation.clone());
        Ok(confirmation)
    }

    /// Return to the previous step, keeping every field.
    ///
    /// Returns `false` at the first step or once the booking is confirmed.
    pub fn back(&mut self) -> bool {
        if self.confirmation.is_some() {
            return false;
        }
        match self.step.previous() {
            Some(previous) => {
                debug!(from = self.step.as_str(), to = previous.as_str(), "booking step back");
                self.step = previous;
                true
            }
            None => false,
        }
    }

    /// Discard everything and start over at the date step.
    pub fn reset(&mut self) {
        self.step = BookingStep::Date;
        self.data = BookingData::default();
        self.pending_slot = None;
        self.errors = None;
        self.confirmation = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn wizard() -> BookingWizard {
        BookingWizard::new(ClinicConfig::default().without_delay(), today())
    }

    fn patient_form() -> PatientInfoForm {
        PatientInfoForm {
            first_name: "ana".into(),
            last_name: "garcía".into(),
            email: "ana.garcia@gmail.com".into(),
            phone: "+54 11 1234-5678".into(),
            birth_date: "1990-01-15".into(),
            insurance: "osde".into(),
            notes: None,
        }
    }

    #[test]
    fn test_initial_state() {
        let wizard = wizard();
        assert_eq!(wizard.step(), BookingStep::Date);
        assert_eq!(wizard.data(), &BookingData::default());
        assert_eq!(wizard.progress(), (1, 4));
        assert!(wizard.available_slots().is_empty());
        assert!(!wizard.is_complete());
    }

    #[test]
    fn test_weekend_rejected_and_stays() {
        let mut wizard = wizard();
        let saturday = NaiveDate::from_ymd_opt(2026, 10, 24).unwrap();
        let err = wizard.select_date(saturday).unwrap_err();
        assert_eq!(err, WizardError::DateUnavailable(DateRejection::Weekend));
        assert_eq!(err.to_string(), "The office is closed on weekends");
        assert_eq!(wizard.step(), BookingStep::Date);
        assert!(wizard.data().selected_date.is_none());
    }

    #[test]
    fn test_select_time_does_not_advance() {
        let mut wizard = wizard();
        wizard
            .select_date(NaiveDate::from_ymd_opt(2026, 10, 20).unwrap())
            .unwrap();
        assert_eq!(wizard.step(), BookingStep::Time);

        wizard.select_time("09:30").unwrap();
        assert_eq!(wizard.step(), BookingStep::Time);
        assert_eq!(wizard.pending_slot(), Some("09:30"));

        assert_eq!(
            wizard.select_time("10:30"),
            Err(WizardError::SlotUnavailable("10:30".into()))
        );
        assert_eq!(
            wizard.select_time("12:00"),
            Err(WizardError::UnknownSlot("12:00".into()))
        );
        // Rejected picks keep the earlier selection.
        assert_eq!(wizard.pending_slot(), Some("09:30"));

        wizard.confirm_time().unwrap();
        assert_eq!(wizard.step(), BookingStep::Form);
        assert_eq!(wizard.data().selected_time.as_deref(), Some("09:30"));
    }

    #[test]
    fn test_confirm_time_requires_selection() {
        let mut wizard = wizard();
        wizard
            .select_date(NaiveDate::from_ymd_opt(2026, 10, 20).unwrap())
            .unwrap();
        assert_eq!(wizard.confirm_time(), Err(WizardError::NoSlotSelected));
        assert_eq!(wizard.step(), BookingStep::Time);
    }

    #[test]
    fn test_wrong_step() {
        let mut wizard = wizard();
        assert_eq!(
            wizard.select_time("09:00"),
            Err(WizardError::WrongStep {
                expected: BookingStep::Time,
                actual: BookingStep::Date,
            })
        );
        assert!(matches!(
            wizard.confirm_booking(),
            Err(WizardError::WrongStep { .. })
        ));
    }

    #[test]
    fn test_full_flow_and_back_keeps_data() {
        let mut wizard = wizard();
        let date = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        wizard.select_date(date).unwrap();
        wizard.select_time("11:00").unwrap();
        wizard.confirm_time().unwrap();
        wizard.submit_patient_info(&patient_form()).unwrap();
        assert_eq!(wizard.step(), BookingStep::Confirmation);

        assert!(wizard.back());
        assert_eq!(wizard.step(), BookingStep::Form);
        assert!(wizard.data().patient_info.is_some());
        assert!(wizard.back());
        assert!(wizard.back());
        assert_eq!(wizard.step(), BookingStep::Date);
        assert!(!wizard.back());
        assert_eq!(wizard.data().selected_time.as_deref(), Some("11:00"));

        // Same date again keeps the chosen time.
        wizard.select_date(date).unwrap();
        wizard.confirm_time().unwrap();
        wizard.submit_patient_info(&patient_form()).unwrap();

        let confirmation = wizard.confirm_booking().unwrap();
        assert!(confirmation.reference.starts_with("DR-"));
        assert_eq!(confirmation.reference.len(), 9);
        assert_eq!(confirmation.booking.date, date);
        assert_eq!(confirmation.booking.time, "11:00");
        assert_eq!(confirmation.booking.patient.last_name, "García");
        assert!(wizard.is_complete());
        assert!(!wizard.back());
        assert_eq!(wizard.confirm_booking(), Err(WizardError::AlreadyCompleted));
    }

    #[test]
    fn test_new_date_clears_time() {
        let mut wizard = wizard();
        wizard
            .select_date(NaiveDate::from_ymd_opt(2026, 10, 20).unwrap())
            .unwrap();
        wizard.select_time("09:00").unwrap();
        wizard.confirm_time().unwrap();
        wizard.back();
        wizard.back();
        wizard
            .select_date(NaiveDate::from_ymd_opt(2026, 10, 21).unwrap())
            .unwrap();
        assert!(wizard.data().selected_time.is_none());
        assert_eq!(wizard.confirm_time(), Err(WizardError::NoSlotSelected));
    }

    #[test]
    fn test_reset() {
        let mut wizard = wizard();
        wizard
            .select_date(NaiveDate::from_ymd_opt(2026, 10, 20).unwrap())
            .unwrap();
        wizard.reset();
        assert_eq!(wizard.step(), BookingStep::Date);
        assert_eq!(wizard.data(), &BookingData::default());
    }
}
