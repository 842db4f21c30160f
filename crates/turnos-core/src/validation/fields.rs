//! Single-field validators.
//!
//! Each validator checks its rules in a fixed order and reports the message of
//! the first one that fails, so the same input always yields the same message.

use chrono::{Datelike, Months, NaiveDate, Weekday};

use super::{EmailPolicy, FieldResult, ValidationContext};

/// Appointments can be booked at most this far ahead.
pub const BOOKING_HORIZON_MONTHS: u32 = 6;
/// First bookable minute of the day (08:00).
pub const OPENING_MINUTES: u32 = 8 * 60;
/// Last bookable minute of the day (18:00).
pub const CLOSING_MINUTES: u32 = 18 * 60;
/// Appointment times must land on this grid.
pub const SLOT_MINUTES: u32 = 30;

pub const MIN_PATIENT_AGE: i32 = 16;
pub const MAX_PATIENT_AGE: i32 = 120;

pub const MIN_NAME_LEN: usize = 2;
pub const MAX_NAME_LEN: usize = 50;
pub const MAX_EMAIL_LEN: usize = 100;
pub const MIN_PHONE_LEN: usize = 8;
pub const MAX_PHONE_LEN: usize = 20;
pub const MIN_PHONE_DIGITS: usize = 8;
pub const MAX_PHONE_DIGITS: usize = 15;
pub const MIN_CODE_LEN: usize = 2;
pub const MAX_CODE_LEN: usize = 10;
pub const MIN_INSURANCE_NAME_LEN: usize = 2;
pub const MAX_INSURANCE_NAME_LEN: usize = 100;
pub const MIN_ADDRESS_LEN: usize = 5;
pub const MAX_ADDRESS_LEN: usize = 200;
pub const MAX_NOTES_LEN: usize = 500;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 100;

/// Country code and Argentine area codes accepted at the start of a phone number.
pub const PHONE_PREFIXES: &[&str] = &[
    "54", "11", "221", "351", "261", "381", "341", "342", "223", "2966", "2944", "299", "2983",
    "2972", "2901",
];

/// Consumer email providers accepted under [`EmailPolicy::CommonDomains`].
pub const COMMON_EMAIL_DOMAINS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "hotmail.com",
    "outlook.com",
    "yahoo.com.ar",
    "hotmail.com.ar",
    "live.com",
    "icloud.com",
    "protonmail.com",
    "tutanota.com",
];

/// Institutional domain suffixes accepted alongside the common providers.
pub const INSTITUTIONAL_EMAIL_MARKERS: &[&str] = &[".edu.ar", ".gov.ar"];

const SPANISH_LETTERS: &str = "áéíóúÁÉÍÓÚñÑ";
const PASSWORD_SPECIALS: &str = "@$!%*?&";

fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || SPANISH_LETTERS.contains(c)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

// =========================================================================
// Dates
// =========================================================================

/// Parse a strict `YYYY-MM-DD` calendar date.
pub fn parse_iso_date(input: &str) -> FieldResult<NaiveDate> {
    let bytes = input.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return Err("Invalid date format (YYYY-MM-DD)".into());
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| "Invalid calendar date".to_string())
}

/// Latest date an appointment may be booked for.
pub fn booking_horizon(today: NaiveDate) -> NaiveDate {
    today
        .checked_add_months(Months::new(BOOKING_HORIZON_MONTHS))
        .unwrap_or(NaiveDate::MAX)
}

/// Appointment date: today or later, at most six months ahead.
pub fn appointment_date(input: &str, ctx: &ValidationContext) -> FieldResult<NaiveDate> {
    if input.is_empty() {
        return Err("Date is required".into());
    }
    let date = parse_iso_date(input)?;
    if date < ctx.today {
        return Err("Appointments cannot be booked on past dates".into());
    }
    if date > booking_horizon(ctx.today) {
        return Err("Appointments cannot be booked more than 6 months ahead".into());
    }
    Ok(date)
}

/// Age in completed years on `today`.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

/// Birth date: not in the future, age between 16 and 120.
pub fn birth_date(input: &str, ctx: &ValidationContext) -> FieldResult<NaiveDate> {
    if input.is_empty() {
        return Err("Birth date is required".into());
    }
    let birth = parse_iso_date(input)?;
    if birth > ctx.today {
        return Err("Birth date cannot be in the future".into());
    }
    let age = age_on(birth, ctx.today);
    if age > MAX_PATIENT_AGE {
        return Err("Invalid age".into());
    }
    if age < MIN_PATIENT_AGE {
        return Err(format!(
            "Patients must be at least {MIN_PATIENT_AGE} years old to book"
        ));
    }
    Ok(birth)
}

/// Monday to Friday.
pub fn is_working_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

// =========================================================================
// Times
// =========================================================================

/// Minutes since midnight for `H:MM` / `HH:MM` 24h input.
pub fn time_to_minutes(input: &str) -> Option<u32> {
    let (hours, minutes) = input.split_once(':')?;
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !(1..=2).contains(&hours.len()) || minutes.len() != 2 || !digits(hours) || !digits(minutes)
    {
        return None;
    }
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// `HH:MM` rendering of minutes since midnight.
pub fn format_minutes(total: u32) -> String {
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Appointment time: office hours, on the 30-minute grid. Normalized to `HH:MM`.
pub fn appointment_time(input: &str) -> FieldResult<String> {
    if input.is_empty() {
        return Err("Time is required".into());
    }
    let total = time_to_minutes(input).ok_or_else(|| "Invalid time format (HH:MM)".to_string())?;
    if !(OPENING_MINUTES..=CLOSING_MINUTES).contains(&total) {
        return Err("Office hours are 08:00 to 18:00".into());
    }
    if total % SLOT_MINUTES != 0 {
        return Err("Times must fall on 30-minute intervals (e.g. 09:00, 09:30)".into());
    }
    Ok(format_minutes(total))
}

/// Hour falls in [08, 18).
pub fn is_working_hour(time: &str) -> bool {
    time_to_minutes(time)
        .map(|total| (OPENING_MINUTES..CLOSING_MINUTES).contains(&total))
        .unwrap_or(false)
}

/// Working day and working hour; booked-slot checks happen in the wizard.
pub fn is_slot_bookable(date: NaiveDate, time: &str) -> bool {
    is_working_day(date) && is_working_hour(time)
}

// =========================================================================
// Contact details
// =========================================================================

/// Argentine phone number.
pub fn phone(input: &str) -> FieldResult<String> {
    let input = input.trim();
    let len = char_len(input);
    if len < MIN_PHONE_LEN {
        return Err(format!("Phone must have at least {MIN_PHONE_LEN} digits"));
    }
    if len > MAX_PHONE_LEN {
        return Err(format!("Phone cannot exceed {MAX_PHONE_LEN} characters"));
    }

    let body = input.strip_prefix('+').unwrap_or(input);
    let allowed = |c: char| c.is_ascii_digit() || c.is_whitespace() || matches!(c, '-' | '(' | ')');
    if body.is_empty() || !body.chars().all(allowed) {
        return Err("Phone contains invalid characters".into());
    }

    let digits: String = body.chars().filter(|c| c.is_ascii_digit()).collect();
    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
        return Err("Invalid phone format".into());
    }
    let known_prefix = PHONE_PREFIXES
        .iter()
        .any(|prefix| digits.starts_with(prefix));
    if !known_prefix && digits.len() != 8 {
        return Err("Phone must start with a valid Argentine area code".into());
    }
    Ok(input.to_string())
}

fn is_valid_local_part(local: &str) -> bool {
    !local.is_empty()
        && local.len() <= 64
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._%+-'".contains(c))
}

fn is_valid_domain(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    let tld_ok = labels
        .last()
        .map(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
        .unwrap_or(false);
    labels_ok && tld_ok
}

/// Email syntax, optionally restricted to [`COMMON_EMAIL_DOMAINS`].
pub fn email(input: &str, policy: EmailPolicy) -> FieldResult<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("Email is required".into());
    }
    if char_len(input) > MAX_EMAIL_LEN {
        return Err(format!("Email cannot exceed {MAX_EMAIL_LEN} characters"));
    }
    let (local, domain) = match input.split_once('@') {
        Some((local, domain)) if !domain.contains('@') => (local, domain),
        _ => return Err("Invalid email format".into()),
    };
    if !is_valid_local_part(local) || !is_valid_domain(domain) {
        return Err("Invalid email format".into());
    }
    if policy == EmailPolicy::CommonDomains {
        let domain = domain.to_lowercase();
        let accepted = COMMON_EMAIL_DOMAINS.contains(&domain.as_str())
            || INSTITUTIONAL_EMAIL_MARKERS
                .iter()
                .any(|marker| domain.contains(marker));
        if !accepted {
            return Err("Email domain not accepted".into());
        }
    }
    Ok(input.to_string())
}

// =========================================================================
// Names and free text
// =========================================================================

/// Uppercase the first letter of each word, lowercase the rest, single spaces.
pub fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Person name: letters and spaces, title-cased.
pub fn name(input: &str) -> FieldResult<String> {
    let trimmed = input.trim();
    let len = char_len(trimmed);
    if len < MIN_NAME_LEN {
        return Err(format!("Must be at least {MIN_NAME_LEN} characters"));
    }
    if len > MAX_NAME_LEN {
        return Err(format!("Cannot exceed {MAX_NAME_LEN} characters"));
    }
    if !trimmed.chars().all(|c| is_letter(c) || c.is_whitespace()) {
        return Err("May only contain letters and spaces".into());
    }
    Ok(title_case(trimmed))
}

/// Insurance code, normalized to uppercase before the checks.
pub fn insurance_code(input: &str) -> FieldResult<String> {
    let code = input.trim().to_uppercase();
    let len = char_len(&code);
    if len < MIN_CODE_LEN {
        return Err(format!("Code must be at least {MIN_CODE_LEN} characters"));
    }
    if len > MAX_CODE_LEN {
        return Err(format!("Code cannot exceed {MAX_CODE_LEN} characters"));
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("Code may only contain uppercase letters and digits".into());
    }
    Ok(code)
}

/// Insurance provider display name.
pub fn insurance_name(input: &str) -> FieldResult<String> {
    let trimmed = input.trim();
    let len = char_len(trimmed);
    if len < MIN_INSURANCE_NAME_LEN {
        return Err(format!(
            "Name must be at least {MIN_INSURANCE_NAME_LEN} characters"
        ));
    }
    if len > MAX_INSURANCE_NAME_LEN {
        return Err(format!(
            "Name cannot exceed {MAX_INSURANCE_NAME_LEN} characters"
        ));
    }
    let allowed =
        |c: char| is_letter(c) || c.is_ascii_digit() || c.is_whitespace() || "&.-".contains(c);
    if !trimmed.chars().all(allowed) {
        return Err("Name contains invalid characters".into());
    }
    Ok(trimmed.to_string())
}

/// Street address.
pub fn address(input: &str) -> FieldResult<String> {
    let trimmed = input.trim();
    let len = char_len(trimmed);
    if len < MIN_ADDRESS_LEN {
        return Err(format!(
            "Address must be at least {MIN_ADDRESS_LEN} characters"
        ));
    }
    if len > MAX_ADDRESS_LEN {
        return Err(format!(
            "Address cannot exceed {MAX_ADDRESS_LEN} characters"
        ));
    }
    let allowed =
        |c: char| is_letter(c) || c.is_ascii_digit() || c.is_whitespace() || ",.-".contains(c);
    if !trimmed.chars().all(allowed) {
        return Err("Address contains invalid characters".into());
    }
    Ok(trimmed.to_string())
}

/// Optional notes; blank collapses to `None`.
pub fn notes(input: Option<&str>) -> FieldResult<Option<String>> {
    let Some(raw) = input else {
        return Ok(None);
    };
    if char_len(raw) > MAX_NOTES_LEN {
        return Err(format!("Notes cannot exceed {MAX_NOTES_LEN} characters"));
    }
    let trimmed = raw.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

/// Non-blank text, trimmed.
pub fn required_text(input: &str, message: &str) -> FieldResult<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(message.to_string());
    }
    Ok(trimmed.to_string())
}

/// Account password strength rules.
pub fn password(input: &str) -> FieldResult<String> {
    let len = char_len(input);
    if len < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(format!(
            "Password cannot exceed {MAX_PASSWORD_LEN} characters"
        ));
    }
    let has_lower = input.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = input.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = input.chars().any(|c| c.is_ascii_digit());
    let has_special = input.chars().any(|c| PASSWORD_SPECIALS.contains(c));
    let only_allowed = input
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c));
    if !(has_lower && has_upper && has_digit && has_special && only_allowed) {
        return Err(
            "Password must contain a lowercase letter, an uppercase letter, a digit and one of @$!%*?&"
                .into(),
        );
    }
    Ok(input.to_string())
}
