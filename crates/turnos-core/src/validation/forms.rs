//! Form validators composed from the field validators.

use serde::{Deserialize, Serialize};

use super::fields::{
    address, appointment_date, appointment_time, birth_date, email, insurance_code,
    insurance_name, name, notes, password, phone, required_text, time_to_minutes,
};
use super::{EmailPolicy, IssueCollector, Validated, ValidationContext};
use crate::models::{
    Appointment, AppointmentFilters, AppointmentStatus, ContactInfo, ContactInfoForm,
    InsuranceForm, NewInsurance, PatientInfo, PatientInfoForm, StatusFilter,
};

pub const MAX_SEARCH_LEN: usize = 100;
pub const MAX_CUSTOM_REASON_LEN: usize = 200;
pub const MIN_CUSTOM_REASON_LEN: usize = 5;
pub const MIN_SLOT_DURATION: u32 = 15;
pub const MAX_SLOT_DURATION: u32 = 120;

// =========================================================================
// Booking
// =========================================================================

/// Patient step of the booking wizard.
pub fn validate_patient_info(
    form: &PatientInfoForm,
    ctx: &ValidationContext,
) -> Validated<PatientInfo> {
    let mut issues = IssueCollector::new();
    let first_name = issues.field("firstName", name(&form.first_name));
    let last_name = issues.field("lastName", name(&form.last_name));
    let email = issues.field("email", email(&form.email, ctx.email_policy));
    let phone = issues.field("phone", phone(&form.phone));
    let birth_date = issues.field("birthDate", birth_date(&form.birth_date, ctx));
    let insurance = issues.field(
        "insurance",
        required_text(&form.insurance, "Insurance is required"),
    );
    let notes = issues.field("notes", notes(form.notes.as_deref()));

    match (first_name, last_name, email, phone, birth_date, insurance, notes) {
        (
            Some(first_name),
            Some(last_name),
            Some(email),
            Some(phone),
            Some(birth_date),
            Some(insurance),
            Some(notes),
        ) => Ok(PatientInfo {
            first_name,
            last_name,
            email,
            phone,
            birth_date,
            insurance,
            notes,
        }),
        _ => Err(issues.into_errors()),
    }
}

/// Raw appointment record, e.g. from an import or an admin edit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentForm {
    pub id: String,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    pub date: String,
    pub time: String,
    pub insurance: String,
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
}

pub fn validate_appointment(
    form: &AppointmentForm,
    ctx: &ValidationContext,
) -> Validated<Appointment> {
    let mut issues = IssueCollector::new();
    let id = issues.field("id", required_text(&form.id, "Id is required"));
    let patient_name = issues.field("patientName", name(&form.patient_name));
    let patient_email = issues.field("patientEmail", email(&form.patient_email, ctx.email_policy));
    let patient_phone = issues.field("patientPhone", phone(&form.patient_phone));
    let date = issues.field("date", appointment_date(&form.date, ctx));
    let time = issues.field("time", appointment_time(&form.time));
    let insurance = issues.field(
        "insurance",
        required_text(&form.insurance, "Insurance is required"),
    );
    let status = issues.field(
        "status",
        form.status
            .parse::<AppointmentStatus>()
            .map_err(|_| "Invalid status".to_string()),
    );
    let notes = issues.field("notes", notes(form.notes.as_deref()));

    match (id, patient_name, patient_email, patient_phone, date, time, insurance, status, notes) {
        (
            Some(id),
            Some(patient_name),
            Some(patient_email),
            Some(patient_phone),
            Some(date),
            Some(time),
            Some(insurance),
            Some(status),
            Some(notes),
        ) => Ok(Appointment {
            id,
            patient_name,
            patient_email,
            patient_phone,
            date: date.format("%Y-%m-%d").to_string(),
            time,
            insurance,
            status,
            notes,
            reason: None,
            created_at: None,
        }),
        _ => Err(issues.into_errors()),
    }
}

// =========================================================================
// Insurance providers
// =========================================================================

fn contact_info(form: &ContactInfoForm, issues: &mut IssueCollector) -> Option<ContactInfo> {
    // Providers use their own corporate domains.
    let phone = issues.field("contactInfo.phone", phone(&form.phone));
    let email = issues.field("contactInfo.email", email(&form.email, EmailPolicy::Any));
    let address = issues.field("contactInfo.address", address(&form.address));
    Some(ContactInfo {
        phone: phone?,
        email: email?,
        address: address?,
    })
}

/// Create/edit form for an insurance provider.
pub fn validate_insurance(form: &InsuranceForm) -> Validated<NewInsurance> {
    let mut issues = IssueCollector::new();
    let name = issues.field("name", insurance_name(&form.name));
    let code = issues.field("code", insurance_code(&form.code));
    let contact_info = contact_info(&form.contact_info, &mut issues);

    match (name, code, contact_info) {
        (Some(name), Some(code), Some(contact_info)) => Ok(NewInsurance {
            name,
            code,
            is_active: form.is_active,
            contact_info,
        }),
        _ => Err(issues.into_errors()),
    }
}

// =========================================================================
// Accounts
// =========================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// Checked login input. Credential matching is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

pub fn validate_login_form(form: &LoginForm, ctx: &ValidationContext) -> Validated<LoginRequest> {
    let mut issues = IssueCollector::new();
    let email = issues.field("email", email(&form.email, ctx.email_policy));
    let password = issues.field("password", password(&form.password));
    match (email, password) {
        (Some(email), Some(password)) => Ok(LoginRequest {
            email,
            password,
            remember_me: form.remember_me,
        }),
        _ => Err(issues.into_errors()),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

pub fn validate_change_password(form: &ChangePasswordForm) -> Validated<PasswordChange> {
    let mut issues = IssueCollector::new();
    let current = issues.field(
        "currentPassword",
        required_text(&form.current_password, "Current password is required")
            .map(|_| form.current_password.clone()),
    );
    let new = issues.field("newPassword", password(&form.new_password));

    if form.new_password != form.confirm_password {
        issues.push("confirmPassword", "Passwords do not match");
    }
    if new.is_some() && form.current_password == form.new_password {
        issues.push(
            "newPassword",
            "New password must differ from the current one",
        );
    }

    match (current, new) {
        (Some(current_password), Some(new_password)) if issues.is_clean() => Ok(PasswordChange {
            current_password,
            new_password,
        }),
        _ => Err(issues.into_errors()),
    }
}

// =========================================================================
// Scheduling
// =========================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleConfigForm {
    /// 0 = Sunday ... 6 = Saturday
    pub working_days: Vec<u8>,
    pub start_time: String,
    pub end_time: String,
    pub slot_duration: u32,
    #[serde(default)]
    pub break_start: Option<String>,
    #[serde(default)]
    pub break_end: Option<String>,
}

/// Weekly office schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleConfig {
    pub working_days: Vec<u8>,
    pub start_time: String,
    pub end_time: String,
    pub slot_duration: u32,
    pub break_start: Option<String>,
    pub break_end: Option<String>,
}

fn optional_time(input: Option<&str>) -> Result<Option<String>, String> {
    input.map(appointment_time).transpose()
}

pub fn validate_schedule_config(form: &ScheduleConfigForm) -> Validated<ScheduleConfig> {
    let mut issues = IssueCollector::new();

    if form.working_days.is_empty() {
        issues.push("workingDays", "Select at least one working day");
    } else if form.working_days.iter().any(|day| *day > 6) {
        issues.push("workingDays", "Working days must be between 0 and 6");
    }
    let start_time = issues.field("startTime", appointment_time(&form.start_time));
    let end_time = issues.field("endTime", appointment_time(&form.end_time));

    let duration = form.slot_duration;
    if duration < MIN_SLOT_DURATION {
        issues.push("slotDuration", "Minimum slot duration is 15 minutes");
    } else if duration > MAX_SLOT_DURATION {
        issues.push("slotDuration", "Maximum slot duration is 120 minutes");
    } else if duration % 15 != 0 {
        issues.push(
            "slotDuration",
            "Slot duration must be a multiple of 15 minutes",
        );
    }

    let break_start = issues.field("breakStart", optional_time(form.break_start.as_deref()));
    let break_end = issues.field("breakEnd", optional_time(form.break_end.as_deref()));

    if let (Some(start), Some(end)) = (&start_time, &end_time) {
        if time_to_minutes(start) >= time_to_minutes(end) {
            issues.push("endTime", "End time must be after start time");
        }
    }
    if let (Some(Some(start)), Some(Some(end))) = (&break_start, &break_end) {
        if time_to_minutes(start) >= time_to_minutes(end) {
            issues.push("breakEnd", "Break end must be after break start");
        }
    }

    match (start_time, end_time, break_start, break_end) {
        (Some(start_time), Some(end_time), Some(break_start), Some(break_end))
            if issues.is_clean() =>
        {
            Ok(ScheduleConfig {
                working_days: form.working_days.clone(),
                start_time,
                end_time,
                slot_duration: duration,
                break_start,
                break_end,
            })
        }
        _ => Err(issues.into_errors()),
    }
}

// =========================================================================
// Cancellation
// =========================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CancellationReason {
    Personal,
    Medical,
    Work,
    Emergency,
    Other,
}

impl std::str::FromStr for CancellationReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "personal" => Ok(Self::Personal),
            "medical" => Ok(Self::Medical),
            "work" => Ok(Self::Work),
            "emergency" => Ok(Self::Emergency),
            "other" => Ok(Self::Other),
            _ => Err("Invalid cancellation reason".to_string()),
        }
    }
}

impl CancellationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Medical => "medical",
            Self::Work => "work",
            Self::Emergency => "emergency",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CancellationForm {
    pub appointment_id: String,
    pub reason: String,
    #[serde(default)]
    pub custom_reason: Option<String>,
    #[serde(default)]
    pub refund_requested: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cancellation {
    pub appointment_id: String,
    pub reason: CancellationReason,
    pub custom_reason: Option<String>,
    pub refund_requested: bool,
}

impl Cancellation {
    /// Text appended to the appointment notes.
    pub fn describe(&self) -> String {
        match (&self.reason, &self.custom_reason) {
            (CancellationReason::Other, Some(text)) => text.clone(),
            (reason, Some(text)) => format!("{}: {}", reason.as_str(), text),
            (reason, None) => reason.as_str().to_string(),
        }
    }
}

pub fn validate_cancellation(form: &CancellationForm) -> Validated<Cancellation> {
    let mut issues = IssueCollector::new();
    let appointment_id = issues.field(
        "appointmentId",
        required_text(&form.appointment_id, "Appointment id is required"),
    );
    let reason = issues.field("reason", form.reason.parse::<CancellationReason>());

    let custom_reason = form
        .custom_reason
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty());
    if let Some(raw) = &form.custom_reason {
        if raw.chars().count() > MAX_CUSTOM_REASON_LEN {
            issues.push("customReason", "Reason cannot exceed 200 characters");
        }
    }
    if reason == Some(CancellationReason::Other)
        && custom_reason.map_or(0, |text| text.chars().count()) < MIN_CUSTOM_REASON_LEN
    {
        issues.push(
            "customReason",
            "Describe the reason when selecting \"other\"",
        );
    }

    match (appointment_id, reason) {
        (Some(appointment_id), Some(reason)) if issues.is_clean() => Ok(Cancellation {
            appointment_id,
            reason,
            custom_reason: custom_reason.map(str::to_string),
            refund_requested: form.refund_requested,
        }),
        _ => Err(issues.into_errors()),
    }
}

// =========================================================================
// Admin filters
// =========================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppointmentFiltersForm {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub insurance: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

pub fn validate_appointment_filters(
    form: &AppointmentFiltersForm,
    ctx: &ValidationContext,
) -> Validated<AppointmentFilters> {
    let mut issues = IssueCollector::new();

    let status = match form.status.as_deref() {
        None | Some("all") => Some(StatusFilter::All),
        Some(raw) => issues.field(
            "status",
            raw.parse::<AppointmentStatus>()
                .map(StatusFilter::Only)
                .map_err(|_| "Invalid status".to_string()),
        ),
    };
    let date = issues.field(
        "date",
        form.date
            .as_deref()
            .map(|raw| appointment_date(raw, ctx))
            .transpose(),
    );
    let search = form
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    if search.map_or(false, |s| s.chars().count() > MAX_SEARCH_LEN) {
        issues.push("search", "Search cannot exceed 100 characters");
    }
    let insurance = form
        .insurance
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    match (status, date) {
        (Some(status), Some(date)) if issues.is_clean() => Ok(AppointmentFilters {
            status,
            date: date.map(|d| d.format("%Y-%m-%d").to_string()),
            insurance: insurance.map(str::to_string),
            search: search.map(str::to_string),
        }),
        _ => Err(issues.into_errors()),
    }
}
