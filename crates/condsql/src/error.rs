//! Error types for condsql

use thiserror::Error;

/// Result type alias for condsql operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Errors raised while assembling a statement.
///
/// Type coercion inside [`ConditionHash`](crate::ConditionHash) never produces
/// one of these: failed coercions degrade to the caller's default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlError {
    /// The builder call sequence cannot produce a statement
    /// (missing table, INSERT without values, UPDATE without SET, ...).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A required argument was missing or empty.
    #[error("Precondition violated: {0}")]
    Precondition(String),

    /// A value could not be serialized into named parameters.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SqlError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a precondition error
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    /// Check if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Check if this is a precondition error
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }
}

impl From<serde_json::Error> for SqlError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
