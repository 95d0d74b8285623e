//! Form field checks shared by the auth and catalog actions.
//!
//! Actions validate fields in a fixed order and stop at the first failure, so
//! a rejected submission carries exactly one message.

use std::collections::BTreeMap;

use email_address::EmailAddress;
use serde::Serialize;
use utoipa::ToSchema;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.to_string(), message.into());
        Self(errors)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Trimmed value of an optional form field; blank counts as absent.
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn validate_email(email: &str) -> bool {
    email.len() > 3 && EmailAddress::is_valid(email)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Checkbox semantics: only an explicit truthy value counts as checked.
pub fn checkbox(value: &Option<String>) -> bool {
    matches!(
        value.as_deref().map(str::trim),
        Some("on" | "true" | "1" | "yes")
    )
}

/// Password and confirmation rules in submission order.
pub fn check_new_password(
    password: &Option<String>,
    confirm: &Option<String>,
) -> Result<String, FieldErrors> {
    let (Some(password), Some(confirm)) = (password, confirm) else {
        return Err(FieldErrors::single("password", "Password is required"));
    };
    if password.len() < MIN_PASSWORD_LEN || confirm.len() < MIN_PASSWORD_LEN {
        return Err(FieldErrors::single("password", "Password is too short"));
    }
    if password != confirm {
        return Err(FieldErrors::single("password", "Passwords do not match"));
    }
    Ok(password.clone())
}
