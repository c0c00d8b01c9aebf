//! # docdeploy-client
//!
//! Boundary between the reconciler and a live document-database account.
//!
//! This crate defines the [`ResourceClient`] trait and the resource types it
//! exchanges. It does not contain any implementations; the in-memory adapter
//! lives in `docdeploy-client-memory` and the REST adapter in `docdeploy-cli`.
//!
//! ## Lookup semantics
//!
//! Every `get_*` method returns `Ok(Some(_))` when the resource exists,
//! `Ok(None)` when the account reports it absent, and `Err(_)` for anything
//! else. Transport failures are never folded into "absent".

mod error;
mod traits;
mod types;

pub use error::{ClientError, ErrorCategory};
pub use traits::ResourceClient;
pub use types::{
    AccountRef, AccountResource, CollectionResource, CollectionSpec, DatabaseResource,
    DatabaseSpec, ExcludedPathDescriptor, IncludedPathDescriptor, IndexDescriptor,
    IndexingPolicyDescriptor, PartitionKeyDefinition, PartitionKind, StoredProcedureResource,
    StoredProcedureSpec, collection_path, database_path, stored_procedure_path,
};

/// Type alias for a client result.
pub type ClientResult<T> = Result<T, ClientError>;

/// Type alias for a shareable client trait object.
pub type DynClient = std::sync::Arc<dyn ResourceClient>;
