//! Error types for sqlpig.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for sqlpig operations.
#[derive(Debug, Error)]
pub enum PigError {
    /// The query text does not match the grammar.
    #[error("Syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    /// A referenced field is outside the permitted whitelist.
    #[error("Field '{0}' is not allowed")]
    Field(String),

    /// A clause that parses but has no translation rule.
    #[error("Unsupported construct: {0}")]
    Unsupported(String),

    /// The relation symbol protocol was violated.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A file could not be read.
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl PigError {
    /// Create a syntax error at the given position.
    pub fn syntax(position: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            message: message.into(),
        }
    }

    /// Create an unsupported-construct error.
    pub fn unsupported(construct: impl Into<String>) -> Self {
        Self::Unsupported(construct.into())
    }
}

/// Result type alias for sqlpig operations.
pub type PigResult<T> = Result<T, PigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PigError::syntax(7, "expected result column near 'from where'");
        assert_eq!(
            err.to_string(),
            "Syntax error at position 7: expected result column near 'from where'"
        );
    }

    #[test]
    fn test_field_error_names_field() {
        let err = PigError::Field("unknownField".to_string());
        assert_eq!(err.to_string(), "Field 'unknownField' is not allowed");
    }
}
