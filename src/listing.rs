//! Display helpers for bot and file listings, and local checks applied to
//! account and bot forms before any request is sent.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Converts a byte count to mebibytes.
#[must_use]
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// Size column text, e.g. `2.00 MB`.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    format!("{:.2} MB", bytes_to_mb(bytes))
}

/// Renders an RFC 3339 timestamp or epoch milliseconds as `YYYY-MM-DD HH:MM:SS`
/// in UTC. Anything unparseable is returned unchanged.
#[must_use]
pub fn format_iso_date(value: &str) -> String {
    let trimmed = value.trim();
    let parsed = OffsetDateTime::parse(trimmed, &Rfc3339).ok().or_else(|| {
        trimmed
            .parse::<i64>()
            .ok()
            .and_then(|millis| {
                OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok()
            })
    });

    let Some(parsed) = parsed else {
        return value.to_string();
    };

    parsed
        .to_offset(UtcOffset::UTC)
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .unwrap_or_else(|_| value.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please fill in all fields.")]
    MissingFields,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Please enter a valid 10-digit phone number.")]
    InvalidPhone,
}

fn email_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| Regex::new(r"\S+@\S+\.\S+").expect("email regex must compile"))
}

fn phone_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| Regex::new(r"^[0-9]{10}$").expect("phone regex must compile"))
}

fn require_all(fields: &[&str]) -> Result<(), FormError> {
    if fields.iter().any(|field| field.is_empty()) {
        Err(FormError::MissingFields)
    } else {
        Ok(())
    }
}

fn require_email(email: &str) -> Result<(), FormError> {
    if email_regex().is_match(email) {
        Ok(())
    } else {
        Err(FormError::InvalidEmail)
    }
}

pub fn validate_login(email: &str, password: &str) -> Result<(), FormError> {
    require_all(&[email, password])?;
    require_email(email)
}

pub fn validate_registration(
    name: &str,
    email: &str,
    phone_number: &str,
    company_name: &str,
    password: &str,
) -> Result<(), FormError> {
    require_all(&[name, email, phone_number, company_name, password])?;
    require_email(email)?;
    if !phone_regex().is_match(phone_number) {
        return Err(FormError::InvalidPhone);
    }
    Ok(())
}

pub fn validate_new_bot(bot_name: &str, description: &str) -> Result<(), FormError> {
    require_all(&[bot_name, description])
}
