//! Walks the schema tree and brings the account in line with it.
//!
//! Traversal is depth-first in document order: each database, then its
//! collections, then each collection's stored procedures. Every node is looked
//! up, compared and, if needed, created (or for stored procedures, replaced).
//! The first failure aborts the run; whatever was applied before it stays.

use std::sync::Arc;
use std::time::Instant;

use docdeploy_client::{
    DatabaseSpec, DynClient, StoredProcedureSpec, collection_path, database_path,
    stored_procedure_path,
};
use docdeploy_core::{Collection, Database, Schema, StoredProcedure};
use tracing::{debug, info, instrument, warn};

use crate::error::{ReconcileError, Result};
use crate::report::{Decision, ReconcileMode, ReconcileReport, ResourceKind};
use crate::resolver::ContentResolver;
use crate::translate::collection_spec;

/// Applies a [`Schema`] to the account behind a resource client.
pub struct Reconciler {
    client: DynClient,
    resolver: Arc<dyn ContentResolver>,
    mode: ReconcileMode,
}

impl Reconciler {
    pub fn new(client: DynClient, resolver: Arc<dyn ContentResolver>) -> Self {
        Self {
            client,
            resolver,
            mode: ReconcileMode::Apply,
        }
    }

    pub fn with_mode(mut self, mode: ReconcileMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> ReconcileMode {
        self.mode
    }

    /// Reconcile the whole schema.
    ///
    /// The account is checked first; a missing account aborts before any
    /// database is touched.
    pub async fn reconcile(&self, schema: &Schema) -> Result<ReconcileReport> {
        let started = Instant::now();
        info!(
            backend = self.client.backend_name(),
            account = %self.client.account_ref(),
            mode = %self.mode,
            resources = schema.resource_count(),
            "starting reconciliation"
        );

        self.verify_account().await?;

        let mut report = ReconcileReport::new(self.mode);
        for database in &schema.databases {
            self.reconcile_database(database, &mut report).await?;
        }

        info!(
            created = report.created(),
            updated = report.updated(),
            unchanged = report.unchanged(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "reconciliation complete"
        );
        Ok(report)
    }

    async fn verify_account(&self) -> Result<()> {
        match self.client.account().await {
            Ok(Some(account)) => {
                debug!(account = %account.name, "account found");
                Ok(())
            }
            Ok(None) => Err(ReconcileError::AccountNotFound {
                account: self.account_label(),
            }),
            Err(source) => Err(ReconcileError::lookup(self.account_label(), source)),
        }
    }

    fn account_label(&self) -> String {
        self.client.account_ref().to_string()
    }

    #[instrument(skip_all, fields(database = %database.name))]
    async fn reconcile_database(
        &self,
        database: &Database,
        report: &mut ReconcileReport,
    ) -> Result<()> {
        let path = database_path(&database.name);
        let existing = self
            .client
            .get_database(&database.name)
            .await
            .map_err(|source| ReconcileError::lookup(&path, source))?;

        let exists = existing.is_some();
        if exists {
            debug!(%path, "database exists");
            report.push(ResourceKind::Database, path, Decision::Unchanged);
        } else {
            if !self.mode.is_dry_run() {
                let spec = DatabaseSpec {
                    id: database.name.clone(),
                };
                self.client
                    .create_database(&spec)
                    .await
                    .map_err(|source| ReconcileError::create(&path, source))?;
            }
            info!(%path, mode = %self.mode, "created database");
            report.push(ResourceKind::Database, path, Decision::Create);
        }

        let parent_pending = !exists && self.mode.is_dry_run();
        for collection in &database.collections {
            self.reconcile_collection(&database.name, collection, parent_pending, report)
                .await?;
        }
        Ok(())
    }

    /// `parent_pending` is set in dry-run mode when the parent database does
    /// not exist yet; the lookup is skipped since the answer is known.
    #[instrument(skip_all, fields(collection = %collection.name))]
    async fn reconcile_collection(
        &self,
        database: &str,
        collection: &Collection,
        parent_pending: bool,
        report: &mut ReconcileReport,
    ) -> Result<()> {
        let path = collection_path(database, &collection.name);
        let existing = if parent_pending {
            None
        } else {
            self.client
                .get_collection(database, &collection.name)
                .await
                .map_err(|source| ReconcileError::lookup(&path, source))?
        };

        let exists = existing.is_some();
        match existing {
            Some(current) => {
                // Existing collections are never modified.
                if !current.partition_key.is_single_path(&collection.partition_key) {
                    warn!(
                        %path,
                        desired = %collection.partition_key,
                        actual = ?current.partition_key.paths,
                        "partition key differs from schema; existing collections are not modified"
                    );
                }
                debug!(%path, "collection exists");
                report.push(ResourceKind::Collection, path, Decision::Unchanged);
            }
            None => {
                if !self.mode.is_dry_run() {
                    let spec = collection_spec(collection);
                    self.client
                        .create_collection(database, &spec)
                        .await
                        .map_err(|source| ReconcileError::create(&path, source))?;
                }
                info!(
                    %path,
                    partition_key = %collection.partition_key,
                    throughput = collection.offer_throughput,
                    mode = %self.mode,
                    "created collection"
                );
                report.push(ResourceKind::Collection, path, Decision::Create);
            }
        }

        let parent_pending = !exists && self.mode.is_dry_run();
        for procedure in &collection.stored_procedures {
            self.reconcile_stored_procedure(
                database,
                &collection.name,
                procedure,
                parent_pending,
                report,
            )
            .await?;
        }
        Ok(())
    }

    #[instrument(skip_all, fields(procedure = %procedure.name))]
    async fn reconcile_stored_procedure(
        &self,
        database: &str,
        collection: &str,
        procedure: &StoredProcedure,
        parent_pending: bool,
        report: &mut ReconcileReport,
    ) -> Result<()> {
        let path = stored_procedure_path(database, collection, &procedure.name);
        let body = self
            .resolver
            .resolve(&procedure.name)
            .await
            .map_err(|source| ReconcileError::resolve(&path, source))?;

        let existing = if parent_pending {
            None
        } else {
            self.client
                .get_stored_procedure(database, collection, &procedure.name)
                .await
                .map_err(|source| ReconcileError::lookup(&path, source))?
        };

        let spec = StoredProcedureSpec {
            id: procedure.name.clone(),
            body,
        };
        let decision = match existing {
            None => {
                if !self.mode.is_dry_run() {
                    self.client
                        .create_stored_procedure(database, collection, &spec)
                        .await
                        .map_err(|source| ReconcileError::create(&path, source))?;
                }
                info!(%path, mode = %self.mode, "created stored procedure");
                Decision::Create
            }
            Some(current) if bodies_match(&current.body, &spec.body) => {
                debug!(%path, "stored procedure body unchanged");
                Decision::Unchanged
            }
            Some(_) => {
                if !self.mode.is_dry_run() {
                    self.client
                        .update_stored_procedure(database, collection, &spec)
                        .await
                        .map_err(|source| ReconcileError::update(&path, source))?;
                }
                info!(%path, mode = %self.mode, "updated stored procedure");
                Decision::Update
            }
        };
        report.push(ResourceKind::StoredProcedure, path, decision);
        Ok(())
    }
}

/// Compares two bodies byte for byte after folding CRLF into LF.
pub fn bodies_match(existing: &str, desired: &str) -> bool {
    normalize_line_endings(existing) == normalize_line_endings(desired)
}

pub fn normalize_line_endings(text: &str) -> std::borrow::Cow<'_, str> {
    if text.contains("\r\n") {
        std::borrow::Cow::Owned(text.replace("\r\n", "\n"))
    } else {
        std::borrow::Cow::Borrowed(text)
    }
}
