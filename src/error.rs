//! Error types surfaced by [`process`](crate::process) and the [`Loader`](crate::Loader).

use crate::coerce::CoerceError;
use thiserror::Error;

/// Errors that can occur while populating a specification.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The loader was handed no specification to populate.
    #[error("specification must be a mutable reference to a structure")]
    InvalidSpecification,

    /// A default or environment value could not be converted to the field's type.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A string could not be converted to the type required by a field.
///
/// `key` is only present for values read from the environment; failures of
/// the default pass leave it empty.
#[derive(Debug, Error)]
#[error(
    "confstack: assigning {} to {field}: converting '{value}' to type {type_name}. details: {source}",
    .key.as_deref().unwrap_or("default")
)]
pub struct ParseError {
    /// Environment variable the value was read from.
    pub key: Option<String>,
    /// Field name, or its override when one is declared.
    pub field: String,
    /// Rust type of the destination.
    pub type_name: String,
    /// The raw string that failed to convert.
    pub value: String,
    /// Underlying conversion failure.
    pub source: CoerceError,
}

impl ParseError {
    /// Create a parse error for a value read from the environment.
    pub fn environment(
        key: impl Into<String>,
        field: impl Into<String>,
        type_name: impl Into<String>,
        value: impl Into<String>,
        source: CoerceError,
    ) -> Self {
        Self {
            key: Some(key.into()),
            field: field.into(),
            type_name: type_name.into(),
            value: value.into(),
            source,
        }
    }

    /// Create a parse error for a declared default.
    pub fn default_value(
        field: impl Into<String>,
        type_name: impl Into<String>,
        value: impl Into<String>,
        source: CoerceError,
    ) -> Self {
        Self {
            key: None,
            field: field.into(),
            type_name: type_name.into(),
            value: value.into(),
            source,
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
