//! Per-field request validation.
//!
//! Each field yields at most one error; errors are reported in the order the
//! fields are checked, which handlers keep equal to the wire declaration order.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// One entry of a 400 response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub message: String,
}

impl FieldError {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn required(field: &str) -> Self {
        Self::message(format!("\"{field}\" is required"))
    }

    pub fn blank(field: &str) -> Self {
        Self::message(format!("\"{field}\" is not allowed to be empty"))
    }

    pub fn invalid(field: &str) -> Self {
        Self::message(format!("\"{field}\" is not valid"))
    }

    pub fn too_short(field: &str, min: usize) -> Self {
        Self::message(format!(
            "\"{field}\" length must be at least {min} characters long"
        ))
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Converts a raw JSON value into trimmed text. Numbers are accepted as text.
fn as_text(name: &str, raw: Value) -> Result<String, FieldError> {
    match raw {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Err(FieldError::required(name)),
        _ => Err(FieldError::invalid(name)),
    }
}

/// A required text field moving through its checks.
#[derive(Debug)]
pub struct Field {
    name: &'static str,
    value: Result<String, FieldError>,
}

/// Starts checking a required text field.
pub fn field(name: &'static str, raw: Option<Value>) -> Field {
    let value = raw
        .ok_or_else(|| FieldError::required(name))
        .and_then(|v| as_text(name, v));
    Field { name, value }
}

impl Field {
    pub fn non_blank(mut self) -> Self {
        let name = self.name;
        self.value = self.value.and_then(|s| {
            if s.is_empty() {
                Err(FieldError::blank(name))
            } else {
                Ok(s)
            }
        });
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        let name = self.name;
        self.value = self.value.and_then(|s| {
            if s.chars().count() < min {
                Err(FieldError::too_short(name, min))
            } else {
                Ok(s)
            }
        });
        self
    }

    pub fn email(mut self) -> Self {
        let name = self.name;
        self.value = self.value.and_then(|s| {
            if is_valid_email(&s) {
                Ok(s)
            } else {
                Err(FieldError::invalid(name))
            }
        });
        self
    }

    pub fn into_result(self) -> Result<String, FieldError> {
        self.value
    }
}

/// Optional text field: absent or null means `None`.
pub fn optional(name: &'static str, raw: Option<Value>) -> Result<Option<String>, FieldError> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(v) => as_text(name, v).map(|s| Some(s).filter(|s| !s.is_empty())),
    }
}

/// Accumulates field errors across a payload.
#[derive(Debug, Default)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Records the error, if any, and hands back the value (or a default
    /// placeholder that is never used once `finish` fails).
    pub fn take<T: Default>(&mut self, checked: Result<T, FieldError>) -> T {
        checked.unwrap_or_else(|e| {
            self.0.push(e);
            T::default()
        })
    }

    pub fn finish(self) -> ApiResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.0))
        }
    }
}
