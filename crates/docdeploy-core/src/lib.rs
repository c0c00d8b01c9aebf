//! # docdeploy-core
//!
//! Typed desired-state model for a document-database account and the loader
//! that turns a JSON document into it.
//!
//! ```ignore
//! use docdeploy_core::{SchemaSource, load_schema};
//!
//! let schema = load_schema(&SchemaSource::File("schema.json".into()))?;
//! for database in &schema.databases {
//!     println!("{} has {} collections", database.name, database.collections.len());
//! }
//! ```

pub mod error;
pub mod indexing;
pub mod loader;
pub mod schema;

pub use error::{CoreError, ErrorCategory, Result};
pub use indexing::{
    DataType, ExcludedPath, IncludedPath, Index, IndexKind, IndexingMode, IndexingPolicy,
    MAX_PRECISION,
};
pub use loader::{SchemaSource, load_schema};
pub use schema::{Collection, Database, Schema, StoredProcedure};
