use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::{CoreError, CoreResult, FieldError};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Parses an ISO 8601 instant: RFC 3339, a zone-less date-time (read as UTC)
/// or a bare date (midnight UTC).
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Lower-cased address when it has one `@` with something on both sides.
pub fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();
    let (local, domain) = email.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
        return None;
    }
    if email.chars().any(char::is_whitespace) {
        return None;
    }
    Some(email)
}

pub fn is_http_url(raw: &str) -> bool {
    let rest = raw
        .strip_prefix("https://")
        .or_else(|| raw.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.starts_with('/') && !host.contains(char::is_whitespace))
}

/// Collects every failed check of a request before reporting them together.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn check(&mut self, ok: bool, field: &str, message: &str) -> bool {
        if !ok {
            self.error(field, message);
        }
        ok
    }

    /// Non-blank string, trimmed.
    pub fn required<'a>(&mut self, field: &str, value: Option<&'a str>, message: &str) -> Option<&'a str> {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Some(v),
            _ => {
                self.error(field, message);
                None
            }
        }
    }

    pub fn present<T>(&mut self, field: &str, value: Option<T>, message: &str) -> Option<T> {
        if value.is_none() {
            self.error(field, message);
        }
        value
    }

    pub fn instant(&mut self, field: &str, value: Option<&str>, message: &str) -> Option<DateTime<Utc>> {
        match value.and_then(parse_instant) {
            Some(dt) => Some(dt),
            None => {
                self.error(field, message);
                None
            }
        }
    }

    /// Strictly after `now`. Skipped when the date already failed to parse.
    pub fn future(&mut self, field: &str, value: Option<DateTime<Utc>>, now: DateTime<Utc>) {
        if let Some(dt) = value {
            self.check(dt > now, field, &format!("{} must be in future", field));
        }
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        match value.and_then(normalize_email) {
            Some(email) => Some(email),
            None => {
                self.error(field, "Email not valid");
                None
            }
        }
    }

    pub fn password(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        match value {
            Some(pw) if pw.chars().count() >= MIN_PASSWORD_LEN => Some(pw.to_string()),
            _ => {
                self.error(
                    field,
                    &format!("The password length must be of at least {} characters", MIN_PASSWORD_LEN),
                );
                None
            }
        }
    }

    /// Star rating in 1..=5.
    pub fn rating(&mut self, field: &str, value: Option<i64>) -> Option<u8> {
        let v = value?;
        if (1..=5).contains(&v) {
            Some(v as u8)
        } else {
            self.error(field, "The rating must be between 1 and 5");
            None
        }
    }

    pub fn finish(self) -> CoreResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(CoreError::ValidationError(self.errors))
        }
    }
}
