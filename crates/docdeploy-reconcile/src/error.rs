use std::path::PathBuf;

use docdeploy_client::ClientError;
use thiserror::Error;

/// Errors raised while resolving a stored procedure body by name.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("No source matching \"{name}\" found in {searched}")]
    ContentNotFound { name: String, searched: String },

    #[error("{} sources match \"{name}\": {}", .matches.len(), join_paths(.matches))]
    AmbiguousContent { name: String, matches: Vec<PathBuf> },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Fatal reconciliation errors. Each names the resource path and the step that failed.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Account {account} not found")]
    AccountNotFound { account: String },

    #[error("Lookup of {path} failed: {source}")]
    Lookup {
        path: String,
        #[source]
        source: ClientError,
    },

    #[error("Create of {path} failed: {source}")]
    Create {
        path: String,
        #[source]
        source: ClientError,
    },

    #[error("Update of {path} failed: {source}")]
    Update {
        path: String,
        #[source]
        source: ClientError,
    },

    #[error("Resolving body of {path} failed: {source}")]
    Resolve {
        path: String,
        #[source]
        source: ResolveError,
    },
}

impl ReconcileError {
    pub fn lookup(path: impl Into<String>, source: ClientError) -> Self {
        Self::Lookup {
            path: path.into(),
            source,
        }
    }

    pub fn create(path: impl Into<String>, source: ClientError) -> Self {
        Self::Create {
            path: path.into(),
            source,
        }
    }

    pub fn update(path: impl Into<String>, source: ClientError) -> Self {
        Self::Update {
            path: path.into(),
            source,
        }
    }

    pub fn resolve(path: impl Into<String>, source: ResolveError) -> Self {
        Self::Resolve {
            path: path.into(),
            source,
        }
    }

    /// Resource path the failure is about, if it concerns a single resource.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::AccountNotFound { .. } => None,
            Self::Lookup { path, .. }
            | Self::Create { path, .. }
            | Self::Update { path, .. }
            | Self::Resolve { path, .. } => Some(path),
        }
    }
}

/// Convenience result type for reconcile operations
pub type Result<T> = std::result::Result<T, ReconcileError>;
