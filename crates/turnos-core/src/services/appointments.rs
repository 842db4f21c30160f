//! Appointment administration.

use chrono::NaiveDate;
use tracing::{info, warn};

use super::{load_collection, save_collection, seed_appointments, ServiceError, ServiceResult};
use crate::config::ClinicConfig;
use crate::db::KeyValueStore;
use crate::models::{
    Appointment, AppointmentFilters, AppointmentStats, AppointmentStatus, BookingConfirmation,
};
use crate::validation::{
    appointment_date, appointment_time, notes, Cancellation, ValidationContext, ValidationErrors,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Appointment operations against a key/value store.
pub struct AppointmentService<'a, S: KeyValueStore + ?Sized> {
    store: &'a S,
    key: &'a str,
}

impl<'a, S: KeyValueStore + ?Sized> AppointmentService<'a, S> {
    pub fn new(store: &'a S, config: &'a ClinicConfig) -> Self {
        Self {
            store,
            key: &config.storage.appointments,
        }
    }

    pub fn list(&self) -> ServiceResult<Vec<Appointment>> {
        load_collection(self.store, self.key, seed_appointments)
    }

    fn save(&self, appointments: &[Appointment]) -> ServiceResult<()> {
        save_collection(self.store, self.key, appointments)
    }

    pub fn get(&self, id: &str) -> ServiceResult<Option<Appointment>> {
        Ok(self.list()?.into_iter().find(|a| a.id == id))
    }

    pub fn by_status(&self, status: AppointmentStatus) -> ServiceResult<Vec<Appointment>> {
        self.matching(|a| a.status == status)
    }

    pub fn by_date(&self, date: NaiveDate) -> ServiceResult<Vec<Appointment>> {
        let date = date.format(DATE_FORMAT).to_string();
        self.matching(|a| a.date == date)
    }

    /// Appointments on `today`'s calendar date.
    pub fn today(&self, today: NaiveDate) -> ServiceResult<Vec<Appointment>> {
        self.by_date(today)
    }

    /// Open appointments from `today` on, soonest first.
    pub fn upcoming(&self, today: NaiveDate) -> ServiceResult<Vec<Appointment>> {
        let today = today.format(DATE_FORMAT).to_string();
        let mut upcoming = self.matching(|a| a.status.is_open() && a.date >= today)?;
        upcoming.sort_by(|a, b| a.schedule_key().cmp(&b.schedule_key()));
        Ok(upcoming)
    }

    pub fn filtered(&self, filters: &AppointmentFilters) -> ServiceResult<Vec<Appointment>> {
        self.matching(|a| filters.matches(a))
    }

    pub fn stats(&self) -> ServiceResult<AppointmentStats> {
        Ok(AppointmentStats::from_appointments(&self.list()?))
    }

    fn matching(&self, pred: impl Fn(&Appointment) -> bool) -> ServiceResult<Vec<Appointment>> {
        Ok(self.list()?.into_iter().filter(|a| pred(a)).collect())
    }

    /// Load, apply `change` to the record with `id` and save.
    ///
    /// Nothing is written when the id is unknown or `change` returns `false` or fails.
    fn modify(
        &self,
        id: &str,
        change: impl FnOnce(&mut Appointment) -> ServiceResult<bool>,
    ) -> ServiceResult<bool> {
        let mut appointments = self.list()?;
        let Some(appointment) = appointments.iter_mut().find(|a| a.id == id) else {
            warn!(id, "appointment not found");
            return Ok(false);
        };
        if !change(appointment)? {
            return Ok(false);
        }
        self.save(&appointments)?;
        Ok(true)
    }

    fn transition(&self, id: &str, next: AppointmentStatus) -> ServiceResult<bool> {
        let changed = self.modify(id, |appointment| {
            if !appointment.status.can_transition_to(next) {
                warn!(id, from = %appointment.status, to = %next, "status change refused");
                return Ok(false);
            }
            appointment.status = next;
            Ok(true)
        })?;
        if changed {
            info!(id, status = %next, "appointment status changed");
        }
        Ok(changed)
    }

    /// Pending → confirmed.
    pub fn confirm(&self, id: &str) -> ServiceResult<bool> {
        self.transition(id, AppointmentStatus::Confirmed)
    }

    /// Confirmed → completed.
    pub fn complete(&self, id: &str) -> ServiceResult<bool> {
        self.transition(id, AppointmentStatus::Completed)
    }

    /// Pending or confirmed → cancelled; a reason is appended to the notes.
    pub fn cancel(&self, id: &str, reason: Option<&str>) -> ServiceResult<bool> {
        let reason = reason.map(str::trim).filter(|r| !r.is_empty());
        let changed = self.modify(id, |appointment| {
            let status = appointment.status;
            if !status.can_transition_to(AppointmentStatus::Cancelled) {
                warn!(id, %status, "cancellation refused");
                return Ok(false);
            }
            if let Some(reason) = reason {
                appointment
                    .append_note(&format!("Cancellation reason: {reason}"))
                    .map_err(|message| ValidationErrors::single("notes", message))?;
            }
            appointment.status = AppointmentStatus::Cancelled;
            Ok(true)
        })?;
        if changed {
            info!(id, "appointment cancelled");
        }
        Ok(changed)
    }

    /// Cancel from a validated cancellation form.
    pub fn cancel_with(&self, cancellation: &Cancellation) -> ServiceResult<bool> {
        self.cancel(&cancellation.appointment_id, Some(&cancellation.describe()))
    }

    /// Move an open appointment to a new slot; it becomes confirmed.
    pub fn reschedule(
        &self,
        id: &str,
        date: &str,
        time: &str,
        ctx: &ValidationContext,
    ) -> ServiceResult<bool> {
        let date = appointment_date(date, ctx)
            .map_err(|message| ValidationErrors::single("date", message))?;
        let time =
            appointment_time(time).map_err(|message| ValidationErrors::single("time", message))?;
        let date = date.format(DATE_FORMAT).to_string();

        let changed = self.modify(id, |appointment| {
            if !appointment.status.is_open() {
                warn!(id, status = %appointment.status, "reschedule refused");
                return Ok(false);
            }
            appointment.date = date.clone();
            appointment.time = time.clone();
            appointment.status = AppointmentStatus::Confirmed;
            Ok(true)
        })?;
        if changed {
            info!(id, %date, %time, "appointment rescheduled");
        }
        Ok(changed)
    }

    /// Replace the notes; blank clears them.
    pub fn add_notes(&self, id: &str, text: &str) -> ServiceResult<bool> {
        let text = notes(Some(text)).map_err(|message| ValidationErrors::single("notes", message))?;
        self.modify(id, |appointment| {
            appointment.notes = text;
            Ok(true)
        })
    }

    /// Store a confirmed wizard booking as a pending appointment.
    ///
    /// Fails when an open appointment already holds the same slot, or when the
    /// booking reference does not fit in the patient's notes.
    pub fn record_booking(
        &self,
        confirmation: &BookingConfirmation,
    ) -> ServiceResult<Appointment> {
        let booking = &confirmation.booking;
        let date = booking.date.format(DATE_FORMAT).to_string();
        let mut appointments = self.list()?;

        let taken = appointments
            .iter()
            .any(|a| a.status.is_open() && a.date == date && a.time == booking.time);
        if taken {
            let errors = ValidationErrors::single("time", "This time slot is already booked");
            return Err(errors.into());
        }

        let mut appointment = Appointment {
            id: uuid::Uuid::new_v4().to_string(),
            patient_name: booking.patient.full_name(),
            patient_email: booking.patient.email.clone(),
            patient_phone: booking.patient.phone.clone(),
            date,
            time: booking.time.clone(),
            insurance: booking.patient.insurance.clone(),
            status: AppointmentStatus::Pending,
            notes: booking.patient.notes.clone(),
            reason: None,
            created_at: Some(chrono::Utc::now().to_rfc3339()),
        };
        appointment
            .append_note(&format!("Booking reference: {}", confirmation.reference))
            .map_err(|message| ValidationErrors::single("notes", message))?;

        appointments.push(appointment.clone());
        self.save(&appointments)?;
        info!(
            id = %appointment.id,
            reference = %confirmation.reference,
            "booking recorded"
        );
        Ok(appointment)
    }

    pub fn delete(&self, id: &str) -> ServiceResult<bool> {
        let mut appointments = self.list()?;
        let before = appointments.len();
        appointments.retain(|a| a.id != id);
        if appointments.len() == before {
            return Ok(false);
        }
        self.save(&appointments)?;
        info!(id, "appointment deleted");
        Ok(true)
    }

    /// Like [`get`](Self::get), but a missing id is an error.
    pub fn require(&self, id: &str) -> ServiceResult<Appointment> {
        self.get(id)?
            .ok_or_else(|| ServiceError::NotFound(format!("appointment {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{CompletedBooking, PatientInfo, StatusFilter};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn confirmation(date: NaiveDate, time: &str) -> BookingConfirmation {
        BookingConfirmation {
            reference: "DR-123456".into(),
            booking: CompletedBooking {
                date,
                time: time.into(),
                patient: PatientInfo {
                    first_name: "Ana".into(),
                    last_name: "García".into(),
                    email: "ana@gmail.com".into(),
                    phone: "11 2345 6789".into(),
                    birth_date: day(1990, 1, 15),
                    insurance: "OSDE".into(),
                    notes: Some("Cefaleas".into()),
                },
            },
        }
    }

    #[test]
    fn test_seed_served_until_first_write() {
        let store = MemoryStore::new();
        let config = ClinicConfig::default();
        let service = AppointmentService::new(&store, &config);

        assert_eq!(service.list().unwrap().len(), 5);
        assert!(store.is_empty());

        assert!(service.confirm("2").unwrap());
        assert!(!store.is_empty());
        assert_eq!(
            service.get("2").unwrap().unwrap().status,
            AppointmentStatus::Confirmed
        );
    }

    #[test]
    fn test_transitions_respect_preconditions() {
        let store = MemoryStore::new();
        let config = ClinicConfig::default();
        let service = AppointmentService::new(&store, &config);

        // "1" is confirmed, "4" cancelled, "5" completed
        assert!(!service.confirm("1").unwrap());
        assert!(!service.confirm("4").unwrap());
        assert!(!service.complete("2").unwrap());
        assert!(!service.cancel("5", None).unwrap());
        assert!(!service.confirm("missing").unwrap());
        assert!(store.is_empty());

        assert!(service.complete("1").unwrap());
        assert_eq!(service.stats().unwrap().completed, 2);
    }

    #[test]
    fn test_cancel_appends_reason() {
        let store = MemoryStore::new();
        let config = ClinicConfig::default();
        let service = AppointmentService::new(&store, &config);

        assert!(service.cancel("2", Some("Patient travelling")).unwrap());
        let cancelled = service.require("2").unwrap();
        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
        assert_eq!(
            cancelled.notes.as_deref(),
            Some("Temblor esencial - Primera consulta\nCancellation reason: Patient travelling")
        );
    }

    #[test]
    fn test_queries() {
        let store = MemoryStore::new();
        let config = ClinicConfig::default();
        let service = AppointmentService::new(&store, &config);

        assert_eq!(service.by_date(day(2025, 10, 1)).unwrap().len(), 3);
        assert_eq!(service.today(day(2025, 10, 2)).unwrap().len(), 1);
        assert_eq!(
            service
                .by_status(AppointmentStatus::Confirmed)
                .unwrap()
                .len(),
            2
        );

        let upcoming: Vec<String> = service
            .upcoming(day(2025, 10, 1))
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(upcoming, vec!["1", "2", "3"]);

        let filters = AppointmentFilters {
            status: StatusFilter::Only(AppointmentStatus::Confirmed),
            search: Some("martínez".into()),
            ..Default::default()
        };
        let found = service.filtered(&filters).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "3");

        let stats = service.stats().unwrap();
        assert_eq!(stats.total, 5);
        assert_eq!(stats.pending, 1);
    }

    #[test]
    fn test_reschedule_validates_and_confirms() {
        let store = MemoryStore::new();
        let config = ClinicConfig::default();
        let service = AppointmentService::new(&store, &config);
        let ctx = ValidationContext::new(day(2026, 10, 19));

        let err = service
            .reschedule("2", "2026-10-20", "12:15", &ctx)
            .unwrap_err();
        match err {
            ServiceError::Invalid(errors) => assert!(errors.has_field("time")),
            other => panic!("unexpected error: {other}"),
        }

        assert!(service.reschedule("2", "2026-10-20", "9:30", &ctx).unwrap());
        let moved = service.require("2").unwrap();
        assert_eq!(moved.date, "2026-10-20");
        assert_eq!(moved.time, "09:30");
        assert_eq!(moved.status, AppointmentStatus::Confirmed);

        let cancelled = service.reschedule("4", "2026-10-20", "10:00", &ctx);
        assert!(!cancelled.unwrap());
    }

    #[test]
    fn test_add_notes_and_delete() {
        let store = MemoryStore::new();
        let config = ClinicConfig::default();
        let service = AppointmentService::new(&store, &config);

        assert!(service.add_notes("3", "  Traer estudios  ").unwrap());
        assert_eq!(
            service.require("3").unwrap().notes.as_deref(),
            Some("Traer estudios")
        );
        assert!(service.add_notes("3", "").unwrap());
        assert_eq!(service.require("3").unwrap().notes, None);
        assert!(matches!(
            service.add_notes("3", &"x".repeat(501)),
            Err(ServiceError::Invalid(_))
        ));

        assert!(service.delete("3").unwrap());
        assert!(!service.delete("3").unwrap());
        assert!(matches!(
            service.require("3"),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn test_record_booking() {
        let store = MemoryStore::new();
        let config = ClinicConfig::default();
        let service = AppointmentService::new(&store, &config);

        let stored = service
            .record_booking(&confirmation(day(2026, 10, 20), "09:00"))
            .unwrap();
        assert_eq!(stored.status, AppointmentStatus::Pending);
        assert_eq!(stored.patient_name, "Ana García");
        assert_eq!(stored.date, "2026-10-20");
        assert_eq!(
            stored.notes.as_deref(),
            Some("Cefaleas\nBooking reference: DR-123456")
        );
        assert_eq!(service.list().unwrap().len(), 6);

        let clash = service.record_booking(&confirmation(day(2026, 10, 20), "09:00"));
        assert!(matches!(clash, Err(ServiceError::Invalid(_))));
    }

    #[test]
    fn test_record_booking_rejects_overlong_notes() {
        let store = MemoryStore::new();
        let config = ClinicConfig::default();
        let service = AppointmentService::new(&store, &config);

        let mut long = confirmation(day(2026, 10, 20), "10:00");
        long.booking.patient.notes = Some("n".repeat(495));
        let errors = match service.record_booking(&long) {
            Err(ServiceError::Invalid(errors)) => errors,
            other => panic!("unexpected result: {other:?}"),
        };
        assert_eq!(
            errors.field("notes"),
            Some("Notes cannot exceed 500 characters")
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_cancel_reason_must_fit_in_notes() {
        let store = MemoryStore::new();
        let config = ClinicConfig::default();
        let service = AppointmentService::new(&store, &config);

        assert!(service.add_notes("2", &"n".repeat(480)).unwrap());
        let err = service.cancel("2", Some("Patient travelling")).unwrap_err();
        match err {
            ServiceError::Invalid(errors) => assert!(errors.has_field("notes")),
            other => panic!("unexpected error: {other}"),
        }

        let untouched = service.require("2").unwrap();
        assert_eq!(untouched.status, AppointmentStatus::Pending);
        assert_eq!(untouched.notes.map(|n| n.len()), Some(480));

        // Without a reason the cancellation goes through.
        assert!(service.cancel("2", None).unwrap());
    }
}
