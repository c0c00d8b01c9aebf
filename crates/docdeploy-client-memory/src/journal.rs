//! Record of every call made against an [`InMemoryClient`](crate::InMemoryClient).

use docdeploy_client::{CollectionSpec, StoredProcedureSpec};
use serde::Serialize;

/// The operation a call performs, without its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientOperation {
    GetAccount,
    GetDatabase,
    CreateDatabase,
    GetCollection,
    CreateCollection,
    GetStoredProcedure,
    CreateStoredProcedure,
    UpdateStoredProcedure,
}

impl ClientOperation {
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::CreateDatabase
                | Self::CreateCollection
                | Self::CreateStoredProcedure
                | Self::UpdateStoredProcedure
        )
    }
}

/// One recorded call, with the arguments needed to assert on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ClientCall {
    GetAccount,
    GetDatabase {
        database: String,
    },
    CreateDatabase {
        database: String,
    },
    GetCollection {
        database: String,
        collection: String,
    },
    CreateCollection {
        database: String,
        spec: CollectionSpec,
    },
    GetStoredProcedure {
        database: String,
        collection: String,
        procedure: String,
    },
    CreateStoredProcedure {
        database: String,
        collection: String,
        spec: StoredProcedureSpec,
    },
    UpdateStoredProcedure {
        database: String,
        collection: String,
        spec: StoredProcedureSpec,
    },
}

impl ClientCall {
    pub fn operation(&self) -> ClientOperation {
        match self {
            Self::GetAccount => ClientOperation::GetAccount,
            Self::GetDatabase { .. } => ClientOperation::GetDatabase,
            Self::CreateDatabase { .. } => ClientOperation::CreateDatabase,
            Self::GetCollection { .. } => ClientOperation::GetCollection,
            Self::CreateCollection { .. } => ClientOperation::CreateCollection,
            Self::GetStoredProcedure { .. } => ClientOperation::GetStoredProcedure,
            Self::CreateStoredProcedure { .. } => ClientOperation::CreateStoredProcedure,
            Self::UpdateStoredProcedure { .. } => ClientOperation::UpdateStoredProcedure,
        }
    }

    pub fn is_mutating(&self) -> bool {
        self.operation().is_mutating()
    }

    /// Name of the database the call targets, if any.
    pub fn database(&self) -> Option<&str> {
        match self {
            Self::GetAccount => None,
            Self::GetDatabase { database }
            | Self::CreateDatabase { database }
            | Self::GetCollection { database, .. }
            | Self::CreateCollection { database, .. }
            | Self::GetStoredProcedure { database, .. }
            | Self::CreateStoredProcedure { database, .. }
            | Self::UpdateStoredProcedure { database, .. } => Some(database),
        }
    }
}
