//! The contract every account adapter implements.

use async_trait::async_trait;

use crate::error::ClientError;
use crate::types::{
    AccountRef, AccountResource, CollectionResource, CollectionSpec, DatabaseResource, DatabaseSpec,
    StoredProcedureResource, StoredProcedureSpec,
};

/// Get/create/update primitives against one document-database account.
///
/// An implementation is bound to a single account at construction. Lookups
/// distinguish a missing resource (`Ok(None)`) from a failed query (`Err`);
/// callers must never treat an `Err` from a lookup as "absent".
/// Implementations must be thread-safe (`Send + Sync`).
///
/// # Example
///
/// ```ignore
/// use docdeploy_client::{ResourceClient, ClientError, DatabaseSpec};
///
/// async fn ensure_database(client: &dyn ResourceClient, name: &str) -> Result<(), ClientError> {
///     if client.get_database(name).await?.is_none() {
///         client.create_database(&DatabaseSpec { id: name.to_string() }).await?;
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait ResourceClient: Send + Sync {
    // ==================== Account ====================

    /// Looks up the account this client is bound to.
    ///
    /// # Errors
    ///
    /// Returns an error only for transport or authorization failures.
    async fn account(&self) -> Result<Option<AccountResource>, ClientError>;

    // ==================== Databases ====================

    /// Reads a database by name. Returns `None` if it does not exist.
    async fn get_database(&self, database: &str) -> Result<Option<DatabaseResource>, ClientError>;

    /// Creates a database.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::AlreadyExists` on a name conflict.
    async fn create_database(&self, spec: &DatabaseSpec) -> Result<DatabaseResource, ClientError>;

    // ==================== Collections ====================

    /// Reads a collection. Returns `None` if it does not exist.
    async fn get_collection(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<Option<CollectionResource>, ClientError>;

    /// Creates a collection with its partition key, throughput and indexing policy.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::AlreadyExists` on a name conflict and
    /// `ClientError::NotFound` if the parent database is missing.
    async fn create_collection(
        &self,
        database: &str,
        spec: &CollectionSpec,
    ) -> Result<CollectionResource, ClientError>;

    // ==================== Stored procedures ====================

    /// Reads a stored procedure. Returns `None` if it does not exist.
    async fn get_stored_procedure(
        &self,
        database: &str,
        collection: &str,
        procedure: &str,
    ) -> Result<Option<StoredProcedureResource>, ClientError>;

    /// Creates a stored procedure.
    async fn create_stored_procedure(
        &self,
        database: &str,
        collection: &str,
        spec: &StoredProcedureSpec,
    ) -> Result<StoredProcedureResource, ClientError>;

    /// Replaces the body of an existing stored procedure.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the procedure does not exist.
    async fn update_stored_procedure(
        &self,
        database: &str,
        collection: &str,
        spec: &StoredProcedureSpec,
    ) -> Result<StoredProcedureResource, ClientError>;

    // ==================== Metadata ====================

    /// The account this client is bound to.
    fn account_ref(&self) -> &AccountRef;

    /// Returns the name of this adapter for logging.
    fn backend_name(&self) -> &'static str;
}
