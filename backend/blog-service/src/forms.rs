//! Request forms and their validation rules.
//!
//! Forms are deserialized from JSON bodies, normalized (whitespace stripped)
//! and validated with `validator`. Failures become [`FieldErrors`], a
//! field → messages map that is sent back to the client.

use crate::error::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const INVALID_CHOICE_MESSAGE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

pub const USERNAME_MAX_LEN: usize = 150;
pub const SLUG_MAX_LEN: usize = 50;

// Hardcoded patterns; a failure to compile is a source bug
static USERNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("hardcoded username regex is invalid"));

static SLUG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("hardcoded slug regex is invalid"));

// =====================================================================
// Field errors
// =====================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn single(field: &str, message: &str) -> Self {
        let mut fields = Self::default();
        fields.add(field, message);
        fields
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

impl From<&ValidationErrors> for FieldErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut fields = FieldErrors::default();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                fields.add(&field, &message);
            }
        }
        fields
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        write!(f, "{}", rendered.join("; "))
    }
}

// =====================================================================
// Post form
// =====================================================================

/// Create/edit payload for a post
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct PostForm {
    #[serde(default)]
    #[validate(custom(function = "validate_required"))]
    pub text: String,
    /// Group id; empty string and null both mean "no group"
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub group: Option<Uuid>,
}

impl PostForm {
    /// Strip surrounding whitespace and run field validation.
    ///
    /// Whether `group` refers to an existing group is checked by the caller,
    /// which has repository access.
    pub fn clean(self) -> Result<Self> {
        let cleaned = Self {
            text: self.text.trim().to_string(),
            group: self.group,
        };
        cleaned.validate()?;
        Ok(cleaned)
    }
}

// =====================================================================
// Account forms
// =====================================================================

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SignupForm {
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    #[validate(
        length(min = 8, message = "This password is too short. It must contain at least 8 characters."),
        custom(function = "validate_not_numeric")
    )]
    pub password: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
}

impl SignupForm {
    pub fn clean(self) -> Result<Self> {
        let cleaned = Self {
            username: self.username.trim().to_string(),
            password: self.password,
            email: self.email.map(|e| e.trim().to_string()),
            first_name: non_blank(self.first_name),
            last_name: non_blank(self.last_name),
        };
        cleaned.validate()?;
        Ok(cleaned)
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(custom(function = "validate_required"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub password: String,
}

impl LoginForm {
    pub fn clean(self) -> Result<Self> {
        let cleaned = Self {
            username: self.username.trim().to_string(),
            password: self.password,
        };
        cleaned.validate()?;
        Ok(cleaned)
    }
}

// =====================================================================
// Group form
// =====================================================================

/// Operator input for a new group
#[derive(Debug, Clone, Validate)]
pub struct GroupForm {
    #[validate(custom(function = "validate_slug"))]
    pub slug: String,
    #[validate(
        custom(function = "validate_required"),
        length(max = 200, message = "Ensure this value has at most 200 characters.")
    )]
    pub title: String,
    pub description: String,
}

impl GroupForm {
    pub fn clean(self) -> Result<Self> {
        let cleaned = Self {
            slug: self.slug.trim().to_string(),
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
        };
        cleaned.validate()?;
        Ok(cleaned)
    }
}

// =====================================================================
// Validators
// =====================================================================

fn error_with_message(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn validate_required(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error_with_message("required", REQUIRED_MESSAGE));
    }
    Ok(())
}

fn validate_username(value: &str) -> std::result::Result<(), ValidationError> {
    validate_required(value)?;

    if value.chars().count() > USERNAME_MAX_LEN {
        return Err(error_with_message(
            "max_length",
            "Ensure this value has at most 150 characters.",
        ));
    }

    if !USERNAME_REGEX.is_match(value) {
        return Err(error_with_message(
            "invalid_username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        ));
    }
    Ok(())
}

fn validate_slug(value: &str) -> std::result::Result<(), ValidationError> {
    validate_required(value)?;

    if value.len() > SLUG_MAX_LEN {
        return Err(error_with_message(
            "max_length",
            "Ensure this value has at most 50 characters.",
        ));
    }
    if !SLUG_REGEX.is_match(value) {
        return Err(error_with_message(
            "invalid_slug",
            "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
        ));
    }
    Ok(())
}

fn validate_not_numeric(value: &str) -> std::result::Result<(), ValidationError> {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        return Err(error_with_message(
            "password_entirely_numeric",
            "This password is entirely numeric.",
        ));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// HTML-style forms submit "" for an unselected choice.
fn empty_string_as_none<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
