//! Error types for resource client operations.

use std::fmt;

/// Errors that can occur while talking to a document-database account.
///
/// A missing resource on lookup is not an error: `get_*` methods return
/// `Ok(None)`. `NotFound` is only raised by operations that require the
/// resource to exist, such as replacing a stored procedure.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The resource targeted by a mutating call does not exist.
    #[error("Resource not found: {path}")]
    NotFound {
        /// Resource path, e.g. `dbs/D1/colls/C1`.
        path: String,
    },

    /// Attempted to create a resource that already exists.
    #[error("Resource already exists: {path}")]
    AlreadyExists {
        /// Resource path of the existing resource.
        path: String,
    },

    /// The account rejected the resource definition.
    #[error("Invalid resource {path}: {message}")]
    InvalidResource {
        /// Resource path of the rejected definition.
        path: String,
        /// Description of why the definition is invalid.
        message: String,
    },

    /// Credentials were missing or rejected.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Description returned by the account.
        message: String,
    },

    /// The account could not be reached.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of the connection failure.
        message: String,
    },

    /// The account answered with an unexpected status.
    #[error("Remote error (HTTP {status}): {message}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Response body or diagnostic message.
        message: String,
    },

    /// An internal client error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl ClientError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Creates a new `AlreadyExists` error.
    #[must_use]
    pub fn already_exists(path: impl Into<String>) -> Self {
        Self::AlreadyExists { path: path.into() }
    }

    /// Creates a new `InvalidResource` error.
    #[must_use]
    pub fn invalid_resource(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResource {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `Unauthorized` error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates a new `Connection` error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a new `Remote` error.
    #[must_use]
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is an already exists error.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::AlreadyExists { .. } => ErrorCategory::Conflict,
            Self::InvalidResource { .. } => ErrorCategory::Validation,
            Self::Unauthorized { .. } => ErrorCategory::Auth,
            Self::Connection { .. } => ErrorCategory::Transport,
            Self::Remote { .. } => ErrorCategory::Transport,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of client errors for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Resource not found.
    NotFound,
    /// Resource already exists.
    Conflict,
    /// Definition rejected.
    Validation,
    /// Authentication or authorization failure.
    Auth,
    /// Network or unexpected remote response.
    Transport,
    /// Internal error.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Validation => write!(f, "validation"),
            Self::Auth => write!(f, "auth"),
            Self::Transport => write!(f, "transport"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
