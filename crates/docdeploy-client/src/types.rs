//! Resource and request types exchanged with a [`ResourceClient`](crate::ResourceClient).
//!
//! Field names follow the account's JSON wire format so the same types serve
//! the REST adapter and the in-memory adapter.

use std::fmt;

use docdeploy_core::{DataType, IndexKind, IndexingMode};
use serde::{Deserialize, Serialize};

/// Identifies the externally provisioned account a client is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountRef {
    pub name: String,
    pub resource_group: String,
}

impl AccountRef {
    #[must_use]
    pub fn new(name: impl Into<String>, resource_group: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource_group: resource_group.into(),
        }
    }
}

impl fmt::Display for AccountRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource_group, self.name)
    }
}

/// Resource path of a database, e.g. `dbs/D1`.
#[must_use]
pub fn database_path(database: &str) -> String {
    format!("dbs/{database}")
}

/// Resource path of a collection, e.g. `dbs/D1/colls/C1`.
#[must_use]
pub fn collection_path(database: &str, collection: &str) -> String {
    format!("dbs/{database}/colls/{collection}")
}

/// Resource path of a stored procedure, e.g. `dbs/D1/colls/C1/sprocs/SP1`.
#[must_use]
pub fn stored_procedure_path(database: &str, collection: &str, procedure: &str) -> String {
    format!("dbs/{database}/colls/{collection}/sprocs/{procedure}")
}

/// The account as reported by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountResource {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_endpoint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseResource {
    pub id: String,
    #[serde(rename = "_rid", default, skip_serializing_if = "Option::is_none")]
    pub rid: Option<String>,
    #[serde(rename = "_etag", default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

/// Partitioning scheme of a collection. Only hash partitioning is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PartitionKind {
    #[default]
    Hash,
    Range,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionKeyDefinition {
    pub paths: Vec<String>,
    #[serde(default)]
    pub kind: PartitionKind,
}

impl PartitionKeyDefinition {
    /// Hash partition on a single path.
    #[must_use]
    pub fn hash(path: impl Into<String>) -> Self {
        Self {
            paths: vec![path.into()],
            kind: PartitionKind::Hash,
        }
    }

    /// Returns `true` when this definition partitions on exactly `path`.
    #[must_use]
    pub fn is_single_path(&self, path: &str) -> bool {
        self.paths.len() == 1 && self.paths[0] == path
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDescriptor {
    pub kind: IndexKind,
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludedPathDescriptor {
    pub path: String,
    #[serde(default)]
    pub indexes: Vec<IndexDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedPathDescriptor {
    pub path: String,
}

/// Indexing policy in the account's native representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexingPolicyDescriptor {
    pub automatic: bool,
    pub indexing_mode: IndexingMode,
    #[serde(default)]
    pub included_paths: Vec<IncludedPathDescriptor>,
    #[serde(default)]
    pub excluded_paths: Vec<ExcludedPathDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionResource {
    pub id: String,
    pub partition_key: PartitionKeyDefinition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexing_policy: Option<IndexingPolicyDescriptor>,
    #[serde(rename = "_etag", default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProcedureResource {
    pub id: String,
    pub body: String,
    #[serde(rename = "_etag", default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

/// Request body for creating a database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSpec {
    pub id: String,
}

/// Request for creating a collection.
///
/// Throughput travels out of band (a request header on the REST adapter), so
/// it is not part of the serialized body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSpec {
    pub id: String,
    pub partition_key: PartitionKeyDefinition,
    pub indexing_policy: IndexingPolicyDescriptor,
    #[serde(skip)]
    pub offer_throughput: u32,
}

/// Request body for creating or replacing a stored procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProcedureSpec {
    pub id: String,
    pub body: String,
}
