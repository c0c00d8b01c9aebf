use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading and validating a desired-state schema.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Schema file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Failed to read schema file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid schema JSON: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Invalid schema at {location}: {message}")]
    Validation { location: String, message: String },
}

impl CoreError {
    /// Create a new FileNotFound error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a new Validation error
    pub fn validation(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Returns `true` when the input itself was malformed, as opposed to unreadable.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::ConfigParse(_) | Self::Validation { .. })
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FileNotFound { .. } | Self::Io { .. } => ErrorCategory::Input,
            Self::ConfigParse(_) => ErrorCategory::Syntax,
            Self::Validation { .. } => ErrorCategory::Validation,
        }
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Syntax,
    Validation,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input => write!(f, "input"),
            Self::Syntax => write!(f, "syntax"),
            Self::Validation => write!(f, "validation"),
        }
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
