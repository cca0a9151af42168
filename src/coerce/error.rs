//! Conversion failures raised by the coercion engine.

use thiserror::Error;

/// Boxed error returned by custom conversion capabilities.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while converting a string into a field value.
#[derive(Debug, Error)]
pub enum CoerceError {
    /// The input is not a valid literal for the target type.
    #[error("parsing {input:?}: invalid syntax")]
    Syntax { input: String },

    /// The literal is well formed but does not fit the target type.
    #[error("parsing {input:?}: value out of range")]
    Range { input: String },

    /// The input is not a valid duration literal.
    #[error("parsing duration {input:?}: {reason}")]
    Duration { input: String, reason: &'static str },

    /// One element of a comma separated list failed to convert.
    #[error("element {index}: {source}")]
    Element {
        index: usize,
        #[source]
        source: Box<CoerceError>,
    },

    /// A `Decoder`, `Setter` or `TextUnmarshaler` implementation failed.
    #[error("{0}")]
    Custom(BoxError),
}

impl CoerceError {
    /// Create a syntax error for the given input.
    pub fn syntax(input: impl Into<String>) -> Self {
        Self::Syntax {
            input: input.into(),
        }
    }

    /// Create a range error for the given input.
    pub fn range(input: impl Into<String>) -> Self {
        Self::Range {
            input: input.into(),
        }
    }

    /// Create a duration error for the given input.
    pub fn duration(input: impl Into<String>, reason: &'static str) -> Self {
        Self::Duration {
            input: input.into(),
            reason,
        }
    }

    /// Wrap an element failure with its position in the list.
    pub fn element(index: usize, source: CoerceError) -> Self {
        Self::Element {
            index,
            source: Box::new(source),
        }
    }
}
