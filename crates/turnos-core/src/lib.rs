//! Turnos Core Library
//!
//! Appointment booking for a single-doctor practice: a guided booking wizard,
//! declarative form validation and the admin services behind the dashboard.
//!
//! # Architecture
//!
//! ```text
//!   Patient                                        Admin dashboard
//!      │                                                 │
//!      ▼                                                 ▼
//!  BookingWizard ──validate──▶ validation ◀──validate── services
//!  Date → Time → Form →            │               AppointmentService
//!  Confirmation                    │               InsuranceService
//!      │                           │                     │
//!      └──── record_booking (opt-in) ───────────────────▶│
//!                                                        ▼
//!                                               KeyValueStore (JSON per key)
//!                                               ├── Database (SQLite)
//!                                               └── MemoryStore
//! ```
//!
//! # Modules
//!
//! - [`validation`]: Field and form validators with per-field error paths
//! - [`wizard`]: Four-step booking flow and slot availability
//! - [`services`]: Appointment and insurance administration
//! - [`db`]: Local-storage style persistence
//! - [`models`]: Domain types (Appointment, Insurance, BookingData, etc.)
//! - [`config`]: Clinic settings

pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod validation;
pub mod wizard;

// Re-export commonly used types
pub use config::ClinicConfig;
pub use db::{Database, KeyValueStore, MemoryStore};
pub use models::{
    Appointment, AppointmentStats, AppointmentStatus, BookingConfirmation, BookingData,
    Insurance, InsuranceStats, PatientInfo, PatientInfoForm,
};
pub use services::{AppointmentService, InsuranceService};
pub use validation::{ValidationContext, ValidationErrors};
pub use wizard::{BookingStep, BookingWizard, WizardError};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum TurnosError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Booking rejected: {0}")]
    BookingRejected(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<db::DbError> for TurnosError {
    fn from(e: db::DbError) -> Self {
        TurnosError::DatabaseError(e.to_string())
    }
}

impl From<services::ServiceError> for TurnosError {
    fn from(e: services::ServiceError) -> Self {
        match e {
            services::ServiceError::Db(e) => e.into(),
            services::ServiceError::Invalid(errors) => errors.into(),
            services::ServiceError::NotFound(what) => TurnosError::NotFound(what),
        }
    }
}

impl From<ValidationErrors> for TurnosError {
    fn from(e: ValidationErrors) -> Self {
        TurnosError::InvalidInput(e.to_string())
    }
}

impl From<WizardError> for TurnosError {
    fn from(e: WizardError) -> Self {
        match e {
            WizardError::Invalid(errors) => errors.into(),
            other => TurnosError::BookingRejected(other.to_string()),
        }
    }
}

impl From<config::ConfigError> for TurnosError {
    fn from(e: config::ConfigError) -> Self {
        TurnosError::ConfigError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for TurnosError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        TurnosError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, TurnosError> {
    validation::parse_iso_date(raw).map_err(TurnosError::InvalidInput)
}

fn load_config(config_json: Option<String>) -> Result<ClinicConfig, TurnosError> {
    match config_json {
        Some(json) => Ok(ClinicConfig::from_json_str(&json)?),
        None => Ok(ClinicConfig::default()),
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a store at the given path. `config_json` overrides the
/// default clinic settings.
#[uniffi::export]
pub fn open_store(
    path: String,
    config_json: Option<String>,
) -> Result<Arc<TurnosCore>, TurnosError> {
    let config = load_config(config_json)?;
    let db = Database::open(&path)?;
    tracing::info!(%path, "store opened");
    Ok(Arc::new(TurnosCore {
        db: Arc::new(Mutex::new(db)),
        config,
    }))
}

/// Create an in-memory store (for testing).
#[uniffi::export]
pub fn open_store_in_memory(config_json: Option<String>) -> Result<Arc<TurnosCore>, TurnosError> {
    let config = load_config(config_json)?;
    let db = Database::open_in_memory()?;
    Ok(Arc::new(TurnosCore {
        db: Arc::new(Mutex::new(db)),
        config,
    }))
}

/// Install a fmt subscriber. `filter` takes `RUST_LOG` syntax and falls
/// back to the environment, then `info`. Returns `false` if a subscriber
/// was already installed.
#[uniffi::export]
pub fn init_logging(filter: Option<String>) -> bool {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = filter
        .and_then(|f| EnvFilter::try_new(f).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}

/// Validate a patient form without a booking session. Returns one entry per
/// failing field; empty means valid.
#[uniffi::export]
pub fn validate_patient_info_form(
    form: FfiPatientForm,
    today: String,
) -> Result<Vec<FfiFieldError>, TurnosError> {
    let ctx = ValidationContext::new(parse_date(&today)?);
    let form: PatientInfoForm = form.into();
    Ok(match validation::validate_patient_info(&form, &ctx) {
        Ok(_) => Vec::new(),
        Err(errors) => field_errors(&errors),
    })
}

fn field_errors(errors: &ValidationErrors) -> Vec<FfiFieldError> {
    errors
        .issues()
        .iter()
        .map(|issue| FfiFieldError {
            path: issue.path.clone(),
            message: issue.message.clone(),
        })
        .collect()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe store wrapper for FFI.
#[derive(uniffi::Object)]
pub struct TurnosCore {
    db: Arc<Mutex<Database>>,
    config: ClinicConfig,
}

#[uniffi::export]
impl TurnosCore {
    // =========================================================================
    // Appointment Operations
    // =========================================================================

    /// All appointments.
    pub fn list_appointments(&self) -> Result<Vec<FfiAppointment>, TurnosError> {
        let db = self.db.lock()?;
        let appointments = AppointmentService::new(&*db, &self.config).list()?;
        Ok(appointments.into_iter().map(|a| a.into()).collect())
    }

    /// Get an appointment by ID.
    pub fn get_appointment(&self, id: String) -> Result<Option<FfiAppointment>, TurnosError> {
        let db = self.db.lock()?;
        let appointment = AppointmentService::new(&*db, &self.config).get(&id)?;
        Ok(appointment.map(|a| a.into()))
    }

    /// Appointments with the given status (`pending`, `confirmed`, ...).
    pub fn appointments_by_status(
        &self,
        status: String,
    ) -> Result<Vec<FfiAppointment>, TurnosError> {
        let status: AppointmentStatus = status
            .parse()
            .map_err(|e: models::UnknownStatus| TurnosError::InvalidInput(e.to_string()))?;
        let db = self.db.lock()?;
        let appointments = AppointmentService::new(&*db, &self.config).by_status(status)?;
        Ok(appointments.into_iter().map(|a| a.into()).collect())
    }

    /// Appointments on a day (`YYYY-MM-DD`).
    pub fn appointments_on(&self, date: String) -> Result<Vec<FfiAppointment>, TurnosError> {
        let date = parse_date(&date)?;
        let db = self.db.lock()?;
        let appointments = AppointmentService::new(&*db, &self.config).by_date(date)?;
        Ok(appointments.into_iter().map(|a| a.into()).collect())
    }

    /// Open appointments from `today` on, soonest first.
    pub fn upcoming_appointments(
        &self,
        today: String,
    ) -> Result<Vec<FfiAppointment>, TurnosError> {
        let today = parse_date(&today)?;
        let db = self.db.lock()?;
        let appointments = AppointmentService::new(&*db, &self.config).upcoming(today)?;
        Ok(appointments.into_iter().map(|a| a.into()).collect())
    }

    /// Filter the appointments table.
    pub fn filter_appointments(
        &self,
        filters: FfiAppointmentFilters,
        today: String,
    ) -> Result<Vec<FfiAppointment>, TurnosError> {
        let ctx = ValidationContext::new(parse_date(&today)?);
        let filters = validation::validate_appointment_filters(&filters.into(), &ctx)?;
        let db = self.db.lock()?;
        let appointments = AppointmentService::new(&*db, &self.config).filtered(&filters)?;
        Ok(appointments.into_iter().map(|a| a.into()).collect())
    }

    pub fn appointment_stats(&self) -> Result<FfiAppointmentStats, TurnosError> {
        let db = self.db.lock()?;
        let stats = AppointmentService::new(&*db, &self.config).stats()?;
        Ok(stats.into())
    }

    pub fn confirm_appointment(&self, id: String) -> Result<bool, TurnosError> {
        let db = self.db.lock()?;
        Ok(AppointmentService::new(&*db, &self.config).confirm(&id)?)
    }

    pub fn complete_appointment(&self, id: String) -> Result<bool, TurnosError> {
        let db = self.db.lock()?;
        Ok(AppointmentService::new(&*db, &self.config).complete(&id)?)
    }

    /// Cancel from the cancellation form; the reason is kept in the notes.
    pub fn cancel_appointment(&self, form: FfiCancellationForm) -> Result<bool, TurnosError> {
        let cancellation = validation::validate_cancellation(&form.into())?;
        let db = self.db.lock()?;
        Ok(AppointmentService::new(&*db, &self.config).cancel_with(&cancellation)?)
    }

    pub fn reschedule_appointment(
        &self,
        id: String,
        date: String,
        time: String,
        today: String,
    ) -> Result<bool, TurnosError> {
        let ctx = ValidationContext::new(parse_date(&today)?)
            .with_email_policy(self.config.email_policy);
        let db = self.db.lock()?;
        Ok(AppointmentService::new(&*db, &self.config).reschedule(&id, &date, &time, &ctx)?)
    }

    pub fn add_appointment_notes(&self, id: String, notes: String) -> Result<bool, TurnosError> {
        let db = self.db.lock()?;
        Ok(AppointmentService::new(&*db, &self.config).add_notes(&id, &notes)?)
    }

    pub fn delete_appointment(&self, id: String) -> Result<bool, TurnosError> {
        let db = self.db.lock()?;
        Ok(AppointmentService::new(&*db, &self.config).delete(&id)?)
    }

    // =========================================================================
    // Insurance Operations
    // =========================================================================

    pub fn list_insurances(&self) -> Result<Vec<FfiInsurance>, TurnosError> {
        let db = self.db.lock()?;
        let insurances = InsuranceService::new(&*db, &self.config).list()?;
        Ok(insurances.into_iter().map(|i| i.into()).collect())
    }

    /// Providers offered in the patient form.
    pub fn active_insurances(&self) -> Result<Vec<FfiInsurance>, TurnosError> {
        let db = self.db.lock()?;
        let insurances = InsuranceService::new(&*db, &self.config).active()?;
        Ok(insurances.into_iter().map(|i| i.into()).collect())
    }

    pub fn get_insurance(&self, id: String) -> Result<Option<FfiInsurance>, TurnosError> {
        let db = self.db.lock()?;
        let insurance = InsuranceService::new(&*db, &self.config).get(&id)?;
        Ok(insurance.map(|i| i.into()))
    }

    /// Search by name, code or contact email.
    pub fn search_insurances(&self, query: String) -> Result<Vec<FfiInsurance>, TurnosError> {
        let db = self.db.lock()?;
        let insurances = InsuranceService::new(&*db, &self.config).search(&query)?;
        Ok(insurances.into_iter().map(|i| i.into()).collect())
    }

    pub fn create_insurance(&self, form: FfiInsuranceForm) -> Result<FfiInsurance, TurnosError> {
        let db = self.db.lock()?;
        let insurance = InsuranceService::new(&*db, &self.config).create(&form.into())?;
        Ok(insurance.into())
    }

    pub fn update_insurance(
        &self,
        id: String,
        update: FfiInsuranceUpdate,
    ) -> Result<bool, TurnosError> {
        let db = self.db.lock()?;
        Ok(InsuranceService::new(&*db, &self.config).update(&id, &update.into())?)
    }

    /// Soft delete.
    pub fn deactivate_insurance(&self, id: String) -> Result<bool, TurnosError> {
        let db = self.db.lock()?;
        Ok(InsuranceService::new(&*db, &self.config).deactivate(&id)?)
    }

    /// Flip the active flag and return the new value.
    pub fn toggle_insurance_status(&self, id: String) -> Result<bool, TurnosError> {
        let db = self.db.lock()?;
        InsuranceService::new(&*db, &self.config)
            .toggle_status(&id)?
            .ok_or_else(|| TurnosError::NotFound(format!("insurance {id}")))
    }

    pub fn set_insurances_active(
        &self,
        ids: Vec<String>,
        active: bool,
    ) -> Result<u32, TurnosError> {
        let db = self.db.lock()?;
        let changed = InsuranceService::new(&*db, &self.config).set_status_bulk(&ids, active)?;
        Ok(changed as u32)
    }

    pub fn insurance_stats(&self) -> Result<FfiInsuranceStats, TurnosError> {
        let db = self.db.lock()?;
        let stats = InsuranceService::new(&*db, &self.config).stats()?;
        Ok(stats.into())
    }

    // =========================================================================
    // Booking
    // =========================================================================

    /// Start a booking wizard anchored on `today` (`YYYY-MM-DD`).
    pub fn start_booking(&self, today: String) -> Result<Arc<BookingSession>, TurnosError> {
        let today = parse_date(&today)?;
        Ok(Arc::new(BookingSession {
            wizard: Mutex::new(BookingWizard::new(self.config.clone(), today)),
        }))
    }

    /// Store a confirmed booking as a pending appointment.
    pub fn record_booking(
        &self,
        session: Arc<BookingSession>,
    ) -> Result<FfiAppointment, TurnosError> {
        let confirmation = {
            let wizard = session.wizard.lock()?;
            wizard
                .confirmation()
                .cloned()
                .ok_or_else(|| TurnosError::BookingRejected("booking is not confirmed".into()))?
        };
        let db = self.db.lock()?;
        let appointment =
            AppointmentService::new(&*db, &self.config).record_booking(&confirmation)?;
        Ok(appointment.into())
    }
}

/// One booking wizard, shared with the UI layer.
#[derive(uniffi::Object)]
pub struct BookingSession {
    wizard: Mutex<BookingWizard>,
}

#[uniffi::export]
impl BookingSession {
    pub fn state(&self) -> Result<FfiBookingState, TurnosError> {
        let wizard = self.wizard.lock()?;
        Ok(FfiBookingState::from(&*wizard))
    }

    /// Whether the calendar should grey out `date`.
    pub fn is_date_disabled(&self, date: String) -> Result<bool, TurnosError> {
        let date = parse_date(&date)?;
        let wizard = self.wizard.lock()?;
        Ok(wizard.is_date_disabled(date))
    }

    pub fn select_date(&self, date: String) -> Result<FfiBookingState, TurnosError> {
        let date = parse_date(&date)?;
        let mut wizard = self.wizard.lock()?;
        wizard.select_date(date)?;
        Ok(FfiBookingState::from(&*wizard))
    }

    pub fn available_slots(&self) -> Result<Vec<FfiSlot>, TurnosError> {
        let wizard = self.wizard.lock()?;
        Ok(wizard
            .available_slots()
            .into_iter()
            .map(|s| s.into())
            .collect())
    }

    pub fn select_time(&self, time: String) -> Result<FfiBookingState, TurnosError> {
        let mut wizard = self.wizard.lock()?;
        wizard.select_time(&time)?;
        Ok(FfiBookingState::from(&*wizard))
    }

    pub fn confirm_time(&self) -> Result<FfiBookingState, TurnosError> {
        let mut wizard = self.wizard.lock()?;
        wizard.confirm_time()?;
        Ok(FfiBookingState::from(&*wizard))
    }

    /// Submit the patient form. Field errors are reported in the returned
    /// state rather than as an error.
    pub fn submit_patient_info(
        &self,
        form: FfiPatientForm,
    ) -> Result<FfiBookingState, TurnosError> {
        let mut wizard = self.wizard.lock()?;
        match wizard.submit_patient_info(&form.into()) {
            Ok(()) | Err(WizardError::Invalid(_)) => Ok(FfiBookingState::from(&*wizard)),
            Err(e) => Err(e.into()),
        }
    }

    /// Blocks for the configured confirmation delay.
    pub fn confirm_booking(&self) -> Result<FfiBookingConfirmation, TurnosError> {
        let mut wizard = self.wizard.lock()?;
        let confirmation = wizard.confirm_booking()?;
        Ok(confirmation.into())
    }

    pub fn back(&self) -> Result<FfiBookingState, TurnosError> {
        let mut wizard = self.wizard.lock()?;
        wizard.back();
        Ok(FfiBookingState::from(&*wizard))
    }

    pub fn reset(&self) -> Result<FfiBookingState, TurnosError> {
        let mut wizard = self.wizard.lock()?;
        wizard.reset();
        Ok(FfiBookingState::from(&*wizard))
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe appointment.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointment {
    pub id: String,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    pub date: String,
    pub time: String,
    pub insurance: String,
    pub status: String,
    pub notes: Option<String>,
}

impl From<Appointment> for FfiAppointment {
    fn from(a: Appointment) -> Self {
        Self {
            id: a.id,
            patient_name: a.patient_name,
            patient_email: a.patient_email,
            patient_phone: a.patient_phone,
            date: a.date,
            time: a.time,
            insurance: a.insurance,
            status: a.status.as_str().to_string(),
            notes: a.notes,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointmentStats {
    pub total: u32,
    pub pending: u32,
    pub confirmed: u32,
    pub cancelled: u32,
    pub completed: u32,
}

impl From<AppointmentStats> for FfiAppointmentStats {
    fn from(stats: AppointmentStats) -> Self {
        Self {
            total: stats.total as u32,
            pending: stats.pending as u32,
            confirmed: stats.confirmed as u32,
            cancelled: stats.cancelled as u32,
            completed: stats.completed as u32,
        }
    }
}

/// FFI-safe appointment table filters; `None` fields are ignored.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointmentFilters {
    pub status: Option<String>,
    pub date: Option<String>,
    pub insurance: Option<String>,
    pub search: Option<String>,
}

impl From<FfiAppointmentFilters> for validation::AppointmentFiltersForm {
    fn from(f: FfiAppointmentFilters) -> Self {
        Self {
            status: f.status,
            date: f.date,
            insurance: f.insurance,
            search: f.search,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCancellationForm {
    pub appointment_id: String,
    /// `personal`, `medical`, `work`, `emergency` or `other`
    pub reason: String,
    pub custom_reason: Option<String>,
    pub refund_requested: bool,
}

impl From<FfiCancellationForm> for validation::CancellationForm {
    fn from(f: FfiCancellationForm) -> Self {
        Self {
            appointment_id: f.appointment_id,
            reason: f.reason,
            custom_reason: f.custom_reason,
            refund_requested: f.refund_requested,
        }
    }
}

/// FFI-safe contact details.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiContactInfo {
    pub phone: String,
    pub email: String,
    pub address: String,
}

impl From<models::ContactInfo> for FfiContactInfo {
    fn from(c: models::ContactInfo) -> Self {
        Self {
            phone: c.phone,
            email: c.email,
            address: c.address,
        }
    }
}

impl From<FfiContactInfo> for models::ContactInfoForm {
    fn from(c: FfiContactInfo) -> Self {
        Self {
            phone: c.phone,
            email: c.email,
            address: c.address,
        }
    }
}

/// FFI-safe insurance provider.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiInsurance {
    pub id: String,
    pub name: String,
    pub code: String,
    pub is_active: bool,
    pub contact_info: FfiContactInfo,
    pub created_at: String,
}

impl From<Insurance> for FfiInsurance {
    fn from(i: Insurance) -> Self {
        Self {
            id: i.id,
            name: i.name,
            code: i.code,
            is_active: i.is_active,
            contact_info: i.contact_info.into(),
            created_at: i.created_at,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiInsuranceForm {
    pub name: String,
    pub code: String,
    pub is_active: bool,
    pub contact_info: FfiContactInfo,
}

impl From<FfiInsuranceForm> for models::InsuranceForm {
    fn from(f: FfiInsuranceForm) -> Self {
        Self {
            name: f.name,
            code: f.code,
            is_active: f.is_active,
            contact_info: f.contact_info.into(),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiInsuranceUpdate {
    pub name: Option<String>,
    pub code: Option<String>,
    pub is_active: Option<bool>,
    pub contact_info: Option<FfiContactInfo>,
}

impl From<FfiInsuranceUpdate> for models::InsuranceUpdate {
    fn from(u: FfiInsuranceUpdate) -> Self {
        Self {
            name: u.name,
            code: u.code,
            is_active: u.is_active,
            contact_info: u.contact_info.map(|c| c.into()),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiInsuranceStats {
    pub total: u32,
    pub active: u32,
    pub inactive: u32,
}

impl From<InsuranceStats> for FfiInsuranceStats {
    fn from(stats: InsuranceStats) -> Self {
        Self {
            total: stats.total as u32,
            active: stats.active as u32,
            inactive: stats.inactive as u32,
        }
    }
}

/// FFI-safe patient form, as typed.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: String,
    pub insurance: String,
    pub notes: Option<String>,
}

impl From<FfiPatientForm> for PatientInfoForm {
    fn from(f: FfiPatientForm) -> Self {
        Self {
            first_name: f.first_name,
            last_name: f.last_name,
            email: f.email,
            phone: f.phone,
            birth_date: f.birth_date,
            insurance: f.insurance,
            notes: f.notes,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFieldError {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSlot {
    pub time: String,
    pub is_available: bool,
    pub is_booked: bool,
}

impl From<models::SlotAvailability> for FfiSlot {
    fn from(s: models::SlotAvailability) -> Self {
        Self {
            time: s.time,
            is_available: s.is_available,
            is_booked: s.is_booked,
        }
    }
}

/// Snapshot of a booking session for rendering.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiBookingState {
    pub step: String,
    pub step_number: u32,
    pub total_steps: u32,
    pub selected_date: Option<String>,
    pub selected_time: Option<String>,
    pub pending_slot: Option<String>,
    pub patient_name: Option<String>,
    pub errors: Vec<FfiFieldError>,
    pub is_complete: bool,
}

impl From<&BookingWizard> for FfiBookingState {
    fn from(wizard: &BookingWizard) -> Self {
        let (step_number, total_steps) = wizard.progress();
        let data = wizard.data();
        Self {
            step: wizard.step().as_str().to_string(),
            step_number,
            total_steps,
            selected_date: data.selected_date.map(|d| d.format("%Y-%m-%d").to_string()),
            selected_time: data.selected_time.clone(),
            pending_slot: wizard.pending_slot().map(str::to_string),
            patient_name: data.patient_info.as_ref().map(|p| p.full_name()),
            errors: wizard.errors().map(field_errors).unwrap_or_default(),
            is_complete: wizard.is_complete(),
        }
    }
}

/// FFI-safe booking confirmation.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiBookingConfirmation {
    pub reference: String,
    pub date: String,
    pub time: String,
    pub patient_name: String,
    pub patient_email: String,
    pub insurance: String,
}

impl From<BookingConfirmation> for FfiBookingConfirmation {
    fn from(c: BookingConfirmation) -> Self {
        Self {
            reference: c.reference,
            date: c.booking.date.format("%Y-%m-%d").to_string(),
            time: c.booking.time,
            patient_name: c.booking.patient.full_name(),
            patient_email: c.booking.patient.email,
            insurance: c.booking.patient.insurance,
        }
    }
}
