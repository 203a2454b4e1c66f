//! Core error types for the backoffice admin.
//!
//! This module provides the [`AdminError`] enum covering every failure the
//! request pipeline can surface, and [`ValidationErrors`], the structured
//! per-attribute error list a store reports when it rejects a mutation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::inflector;

/// The attribute name used for errors that concern the record as a whole.
pub const BASE: &str = "base";

/// A single attribute-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeError {
    /// The attribute the error belongs to, or [`BASE`].
    pub attribute: String,
    /// The message, without the attribute prefix (e.g. "can't be blank").
    pub message: String,
}

/// Validation errors attached to a resource after a failed save or destroy.
///
/// Errors keep their insertion order so that rendered forms list them in the
/// order the validations ran.
///
/// # Examples
///
/// ```
/// use backoffice_core::error::ValidationErrors;
///
/// let mut errors = ValidationErrors::new();
/// errors.add("first_name", "can't be blank");
/// errors.add_base("Cannot delete record because dependent orders exist");
///
/// assert_eq!(
///     errors.full_messages(),
///     vec![
///         "First name can't be blank".to_string(),
///         "Cannot delete record because dependent orders exist".to_string(),
///     ]
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    errors: Vec<AttributeError>,
}

impl ValidationErrors {
    /// Creates an empty error list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error for the given attribute.
    pub fn add(&mut self, attribute: impl Into<String>, message: impl Into<String>) {
        self.errors.push(AttributeError {
            attribute: attribute.into(),
            message: message.into(),
        });
    }

    /// Adds an error that applies to the whole record.
    pub fn add_base(&mut self, message: impl Into<String>) {
        self.add(BASE, message);
    }

    /// Returns `true` if no errors have been recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of recorded errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Removes every recorded error.
    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Returns the raw messages recorded for one attribute.
    pub fn on(&self, attribute: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.attribute == attribute)
            .map(|e| e.message.as_str())
            .collect()
    }

    /// Iterates over all recorded errors in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &AttributeError> {
        self.errors.iter()
    }

    /// Returns the messages prefixed with the humanized attribute name.
    ///
    /// Base errors are returned unprefixed.
    pub fn full_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|e| {
                if e.attribute == BASE {
                    e.message.clone()
                } else {
                    format!("{} {}", inflector::humanize(&e.attribute), e.message)
                }
            })
            .collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_messages().join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// The primary error type for the backoffice admin.
///
/// Each variant maps to an HTTP status code via [`AdminError::status_code`].
/// `ValidationFailed` is normally recovered by the controller (the form is
/// re-rendered); the others fail the request.
#[derive(Error, Debug)]
pub enum AdminError {
    // ── Request errors ───────────────────────────────────────────────

    /// The requested resource or resource type does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The store rejected a mutation because the resource is invalid.
    #[error("Validation failed: {0}")]
    ValidationFailed(ValidationErrors),

    /// A nested attribute payload had a shape the admin does not accept.
    #[error("Unrecognised param data: {0}")]
    UnrecognizedParameterShape(String),

    /// The authorization hook rejected the access.
    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    /// The request was malformed in some other way.
    #[error("Bad request: {0}")]
    BadRequest(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── Persistence ──────────────────────────────────────────────────

    /// The store failed for a reason other than validation.
    #[error("Store error: {0}")]
    StoreError(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AdminError {
    /// Returns the HTTP status code associated with this error.
    ///
    /// - `BadRequest`, `UnrecognizedParameterShape` -> 400
    /// - `AuthorizationDenied` -> 403
    /// - `NotFound` -> 404
    /// - `ValidationFailed` -> 422
    /// - Everything else -> 500
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::UnrecognizedParameterShape(_) => 400,
            Self::AuthorizationDenied(_) => 403,
            Self::NotFound(_) => 404,
            Self::ValidationFailed(_) => 422,
            Self::ConfigurationError(_)
            | Self::StoreError(_)
            | Self::SerializationError(_)
            | Self::IoError(_) => 500,
        }
    }
}

impl From<serde_json::Error> for AdminError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// A convenience type alias for `Result<T, AdminError>`.
pub type AdminResult<T> = Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_full_messages() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "can't be blank");
        errors.add("email_address", "is invalid");
        assert_eq!(
            errors.full_messages(),
            vec!["Name can't be blank", "Email address is invalid"]
        );
    }

    #[test]
    fn test_validation_errors_foreign_key_humanized() {
        let mut errors = ValidationErrors::new();
        errors.add("customer_id", "must exist");
        assert_eq!(errors.full_messages(), vec!["Customer must exist"]);
    }

    #[test]
    fn test_validation_errors_base_unprefixed() {
        let mut errors = ValidationErrors::new();
        errors.add_base("Cannot delete record");
        assert_eq!(errors.full_messages(), vec!["Cannot delete record"]);
    }

    #[test]
    fn test_validation_errors_on() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "can't be blank");
        errors.add("name", "is too short");
        errors.add("email", "is invalid");
        assert_eq!(errors.on("name"), vec!["can't be blank", "is too short"]);
        assert!(errors.on("kind").is_empty());
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_validation_errors_display() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "can't be blank");
        errors.add_base("Something else");
        assert_eq!(errors.to_string(), "Name can't be blank; Something else");
    }

    #[test]
    fn test_admin_error_status_codes() {
        assert_eq!(AdminError::NotFound("x".into()).status_code(), 404);
        assert_eq!(
            AdminError::ValidationFailed(ValidationErrors::new()).status_code(),
            422
        );
        assert_eq!(
            AdminError::UnrecognizedParameterShape("x".into()).status_code(),
            400
        );
        assert_eq!(AdminError::AuthorizationDenied("x".into()).status_code(), 403);
        assert_eq!(AdminError::BadRequest("x".into()).status_code(), 400);
        assert_eq!(AdminError::ConfigurationError("x".into()).status_code(), 500);
        assert_eq!(AdminError::StoreError("x".into()).status_code(), 500);
    }

    #[test]
    fn test_admin_error_display() {
        let err = AdminError::NotFound("customer 7".into());
        assert_eq!(err.to_string(), "Not found: customer 7");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: AdminError = io_err.into();
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("file missing"));
    }
}
