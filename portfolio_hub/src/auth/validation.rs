//! Client-side form validation.
//!
//! Every check runs before any request is sent. Failures are collected per
//! field, one message each, mirroring the shape of server validation errors.

use super::models::{RegisterRequest, ResetPasswordRequest};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Minimum username length accepted at registration
pub const MIN_USERNAME_LEN: usize = 3;

/// Minimum password length accepted at registration and reset
pub const MIN_PASSWORD_LEN: usize = 8;

/// Validation messages keyed by form field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`, keeping the first one
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Map a server validation body (`{"field": ["msg", ...]}`).
    ///
    /// Lists contribute their first message; plain strings are taken as-is.
    /// Anything that is not an object yields no errors.
    pub fn from_body(body: &Value) -> Self {
        let mut errors = Self::new();
        if let Some(fields) = body.as_object() {
            for (field, value) in fields {
                let message = match value {
                    Value::String(message) => Some(message.as_str()),
                    Value::Array(messages) => messages.first().and_then(Value::as_str),
                    _ => None,
                };
                if let Some(message) = message {
                    errors.add(field, message);
                }
            }
        }
        errors
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

/// Check the sign-in form
pub fn validate_login(username: &str, password: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if username.trim().is_empty() {
        errors.add("username", "Username is required");
    }
    if password.trim().is_empty() {
        errors.add("password", "Password is required");
    }
    errors.into_result()
}

/// Check the registration form
pub fn validate_registration(form: &RegisterRequest) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    let username = form.username.trim();
    if username.is_empty() {
        errors.add("username", "Username is required");
    } else if form.username.chars().count() < MIN_USERNAME_LEN {
        errors.add("username", "Must be at least 3 characters");
    } else if !form
        .username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        errors.add("username", "Only letters, numbers, hyphens, underscores");
    }

    if form.email.trim().is_empty() {
        errors.add("email", "Email is required");
    }
    if form.full_name.trim().is_empty() {
        errors.add("full_name", "Full name is required");
    }

    if form.password.is_empty() {
        errors.add("password", "Password is required");
    } else if form.password.chars().count() < MIN_PASSWORD_LEN {
        errors.add("password", "Must be at least 8 characters");
    }
    if form.password != form.password_confirm {
        errors.add("password_confirm", "Passwords do not match");
    }

    errors.into_result()
}

/// Check the forgot-password form
pub fn validate_email(email: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if email.trim().is_empty() {
        errors.add("email", "Please enter your email address");
    }
    errors.into_result()
}

/// Check a reset form; `confirmation` is the repeated password
pub fn validate_password_reset(
    request: &ResetPasswordRequest,
    confirmation: &str,
) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if request.new_password.chars().count() < MIN_PASSWORD_LEN {
        errors.add("new_password", "Password must be at least 8 characters");
    } else if request.new_password != confirmation {
        errors.add("new_password", "Passwords do not match");
    }
    errors.into_result()
}

/// Check the change-password form
pub fn validate_password_change(old_password: &str, new_password: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if old_password.is_empty() {
        errors.add("old_password", "Current password is required");
    }
    if new_password.chars().count() < MIN_PASSWORD_LEN {
        errors.add("new_password", "Password must be at least 8 characters");
    }
    errors.into_result()
}

/// Password strength from 0 to 4: length, mixed case, digit, symbol
pub fn password_strength(password: &str) -> u8 {
    if password.is_empty() {
        return 0;
    }

    let mut score = 0;
    if password.chars().count() >= MIN_PASSWORD_LEN {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
    {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        score += 1;
    }
    if password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        score += 1;
    }
    score
}
