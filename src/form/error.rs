//! Form engine error types

use thiserror::Error;

use super::path::PropertyPath;
use super::schema::SchemaError;

/// Errors raised by form operations.
///
/// Only [`FormError::Schema`] is fatal; every other variant leaves the form
/// state untouched and can be reported to the user as-is.
#[derive(Debug, Error)]
pub enum FormError {
    /// Malformed field definitions
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Lookup of a list item, list, or configuration entry failed
    #[error("Not found: {entity} '{identifier}'")]
    NotFound { entity: String, identifier: String },

    /// The path does not address a rendered primitive field
    #[error("Unknown field: '{0}'")]
    UnknownField(PropertyPath),

    /// A value of the wrong kind was bound to a field
    #[error("Type mismatch at '{path}': expected {expected}, got {actual}")]
    TypeMismatch {
        path: PropertyPath,
        expected: String,
        actual: String,
    },

    /// The configuration map has not finished loading
    #[error("Configuration is still loading")]
    ConfigurationPending,

    /// The configuration map failed to load
    #[error("Configuration unavailable: {0}")]
    ConfigurationUnavailable(String),

    /// A dispatch is already pending for this form
    #[error("A submission is already in flight")]
    SubmissionInFlight,

    /// A newer configuration load was started after this one
    #[error("Configuration load was superseded by a newer one")]
    StaleLoad,

    /// The form was closed; late results are discarded
    #[error("Form session is closed")]
    SessionClosed,
}

impl FormError {
    pub fn not_found(entity: &str, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            identifier: identifier.to_string(),
        }
    }
}
