use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use docdeploy_client::{
    AccountRef, AccountResource, ClientError, CollectionResource, DatabaseResource,
    PartitionKeyDefinition, StoredProcedureResource, collection_path, database_path,
    stored_procedure_path,
};
use papaya::HashMap as PapayaHashMap;
use tokio::sync::RwLock;

use crate::journal::{ClientCall, ClientOperation};

pub type StorageKey = String; // Resource path, e.g. "dbs/D1/colls/C1"

/// A stored collection together with the throughput it was provisioned with.
#[derive(Debug, Clone)]
pub struct CollectionEntry {
    pub resource: CollectionResource,
    pub offer_throughput: Option<u32>,
}

/// In-memory document-database account backed by papaya lock-free maps.
///
/// This client provides:
/// - the full [`ResourceClient`](docdeploy_client::ResourceClient) contract
/// - a journal of every call, in order, for asserting on reconcile behavior
/// - injected failures per operation and resource path
#[derive(Debug)]
pub struct InMemoryClient {
    pub(crate) account_ref: AccountRef,
    pub(crate) account: Option<AccountResource>,
    pub(crate) databases: Arc<PapayaHashMap<StorageKey, DatabaseResource>>,
    pub(crate) collections: Arc<PapayaHashMap<StorageKey, CollectionEntry>>,
    pub(crate) procedures: Arc<PapayaHashMap<StorageKey, StoredProcedureResource>>,
    /// Injected failures: (operation, resource path) -> message
    pub(crate) failures: Arc<PapayaHashMap<(ClientOperation, StorageKey), String>>,
    pub(crate) journal: Arc<RwLock<Vec<ClientCall>>>,
    /// Atomic counter for generating etags
    pub(crate) etag_counter: AtomicU64,
}

impl Default for InMemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryClient {
    /// Creates an empty account named `local` in resource group `local`.
    pub fn new() -> Self {
        Self::for_account(AccountRef::new("local", "local"))
    }

    /// Creates an empty, existing account.
    pub fn for_account(account_ref: AccountRef) -> Self {
        let account = AccountResource {
            name: account_ref.name.clone(),
            document_endpoint: None,
        };
        Self {
            account_ref,
            account: Some(account),
            databases: Arc::new(PapayaHashMap::new()),
            collections: Arc::new(PapayaHashMap::new()),
            procedures: Arc::new(PapayaHashMap::new()),
            failures: Arc::new(PapayaHashMap::new()),
            journal: Arc::new(RwLock::new(Vec::new())),
            etag_counter: AtomicU64::new(1),
        }
    }

    /// Creates a client whose account lookup reports "not found".
    pub fn without_account() -> Self {
        Self {
            account: None,
            ..Self::new()
        }
    }

    /// Generates the next etag.
    pub(crate) fn next_etag(&self) -> String {
        format!(
            "\"{:08x}\"",
            self.etag_counter.fetch_add(1, Ordering::SeqCst)
        )
    }

    // ==================== Seeding ====================

    /// Inserts a database directly, bypassing the journal.
    pub fn seed_database(&self, database: &str) {
        let resource = DatabaseResource {
            id: database.to_string(),
            rid: None,
            etag: Some(self.next_etag()),
        };
        self.databases.pin().insert(database_path(database), resource);
    }

    /// Inserts a collection directly, bypassing the journal.
    pub fn seed_collection(&self, database: &str, collection: &str, partition_key: &str) {
        let entry = CollectionEntry {
            resource: CollectionResource {
                id: collection.to_string(),
                partition_key: PartitionKeyDefinition::hash(partition_key),
                indexing_policy: None,
                etag: Some(self.next_etag()),
            },
            offer_throughput: None,
        };
        self.collections
            .pin()
            .insert(collection_path(database, collection), entry);
    }

    /// Inserts a stored procedure directly, bypassing the journal.
    pub fn seed_stored_procedure(
        &self,
        database: &str,
        collection: &str,
        procedure: &str,
        body: &str,
    ) {
        let resource = StoredProcedureResource {
            id: procedure.to_string(),
            body: body.to_string(),
            etag: Some(self.next_etag()),
        };
        self.procedures
            .pin()
            .insert(stored_procedure_path(database, collection, procedure), resource);
    }

    /// Makes the given operation on the given resource path fail with a
    /// connection error. Account lookups use the account name as path.
    pub fn fail_on(&self, operation: ClientOperation, path: impl Into<String>) {
        self.failures.pin().insert(
            (operation, path.into()),
            format!("injected {operation:?} failure"),
        );
    }

    // ==================== Inspection ====================

    pub fn has_database(&self, database: &str) -> bool {
        self.databases.pin().contains_key(&database_path(database))
    }

    pub fn collection(&self, database: &str, collection: &str) -> Option<CollectionEntry> {
        self.collections
            .pin()
            .get(&collection_path(database, collection))
            .cloned()
    }

    pub fn stored_procedure_body(
        &self,
        database: &str,
        collection: &str,
        procedure: &str,
    ) -> Option<String> {
        self.procedures
            .pin()
            .get(&stored_procedure_path(database, collection, procedure))
            .map(|p| p.body.clone())
    }

    /// All recorded calls, oldest first.
    pub async fn calls(&self) -> Vec<ClientCall> {
        self.journal.read().await.clone()
    }

    /// Recorded calls that create or update a resource.
    pub async fn mutating_calls(&self) -> Vec<ClientCall> {
        self.journal
            .read()
            .await
            .iter()
            .filter(|c| c.is_mutating())
            .cloned()
            .collect()
    }

    pub async fn clear_calls(&self) {
        self.journal.write().await.clear();
    }

    // ==================== Internals ====================

    /// Records the call, then returns the injected failure for it, if any.
    pub(crate) async fn record(&self, call: ClientCall, path: &str) -> Result<(), ClientError> {
        let operation = call.operation();
        self.journal.write().await.push(call);
        let failures = self.failures.pin();
        match failures.get(&(operation, path.to_string())) {
            Some(message) => Err(ClientError::connection(message.clone())),
            None => Ok(()),
        }
    }
}
