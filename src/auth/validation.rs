use lazy_static::lazy_static;
use regex::Regex;

use crate::error::AppError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Absent and empty are reported differently, the way Joi does.
pub(crate) fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, AppError> {
    match value {
        None => Err(AppError::Validation(format!("\"{field}\" is required"))),
        Some("") => Err(AppError::Validation(format!(
            "\"{field}\" is not allowed to be empty"
        ))),
        Some(v) => Ok(v),
    }
}

pub(crate) fn min_len<'a>(
    field: &str,
    value: Option<&'a str>,
    min: usize,
) -> Result<&'a str, AppError> {
    let value = required(field, value)?;
    if value.chars().count() < min {
        return Err(AppError::Validation(format!(
            "\"{field}\" length must be at least {min} characters long"
        )));
    }
    Ok(value)
}

pub(crate) fn email(value: Option<&str>) -> Result<&str, AppError> {
    let value = required("email", value)?;
    if !is_valid_email(value) {
        return Err(AppError::Validation("\"email\" must be a valid email".into()));
    }
    min_len("email", Some(value), 6)
}

pub(crate) fn password(value: Option<&str>) -> Result<&str, AppError> {
    min_len("password", value, 8)
}
