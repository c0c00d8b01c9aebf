//! # docdeploy-reconcile
//!
//! Reconciliation engine: reads live state through a
//! [`ResourceClient`](docdeploy_client::ResourceClient), compares it with a
//! [`Schema`](docdeploy_core::Schema) and issues the minimal create/update
//! calls. Resources are never deleted, and existing databases and collections
//! are never modified; only stored procedure bodies are replaced in place.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use docdeploy_reconcile::{FsContentResolver, Reconciler};
//!
//! let reconciler = Reconciler::new(client, Arc::new(FsContentResolver::new("./db")));
//! let report = reconciler.reconcile(&schema).await?;
//! println!("{} created, {} updated", report.created(), report.updated());
//! ```

pub mod error;
pub mod reconciler;
pub mod report;
pub mod resolver;
pub mod translate;

pub use error::{ReconcileError, ResolveError, Result};
pub use reconciler::{Reconciler, bodies_match, normalize_line_endings};
pub use report::{Action, Decision, ReconcileMode, ReconcileReport, ResourceKind};
pub use resolver::{ContentResolver, FsContentResolver, StaticContentResolver};
pub use translate::{collection_spec, indexing_policy_descriptor};
