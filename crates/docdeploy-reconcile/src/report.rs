//! Outcome of a reconciliation run.

use std::fmt;

use serde::Serialize;

/// Whether a run mutates the account or only reports what it would do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileMode {
    #[default]
    Apply,
    DryRun,
}

impl ReconcileMode {
    pub fn is_dry_run(&self) -> bool {
        matches!(self, Self::DryRun)
    }
}

impl fmt::Display for ReconcileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Apply => write!(f, "apply"),
            Self::DryRun => write!(f, "dry-run"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Database,
    Collection,
    StoredProcedure,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database => write!(f, "database"),
            Self::Collection => write!(f, "collection"),
            Self::StoredProcedure => write!(f, "stored procedure"),
        }
    }
}

/// Diff decision for one node of the schema tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Absent remotely.
    Create,
    /// Present with a different body. Stored procedures only.
    Update,
    /// Present and left as is.
    Unchanged,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Unchanged => write!(f, "unchanged"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    pub kind: ResourceKind,
    pub path: String,
    pub decision: Decision,
}

/// Decisions taken during a run, in traversal order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ReconcileReport {
    pub mode: ReconcileMode,
    pub actions: Vec<Action>,
}

impl ReconcileReport {
    pub fn new(mode: ReconcileMode) -> Self {
        Self {
            mode,
            actions: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, kind: ResourceKind, path: String, decision: Decision) {
        self.actions.push(Action {
            kind,
            path,
            decision,
        });
    }

    pub fn count(&self, decision: Decision) -> usize {
        self.actions
            .iter()
            .filter(|a| a.decision == decision)
            .count()
    }

    pub fn created(&self) -> usize {
        self.count(Decision::Create)
    }

    pub fn updated(&self) -> usize {
        self.count(Decision::Update)
    }

    pub fn unchanged(&self) -> usize {
        self.count(Decision::Unchanged)
    }

    /// `true` when the run changed (or would change) nothing.
    pub fn is_noop(&self) -> bool {
        self.created() == 0 && self.updated() == 0
    }

    /// Actions that change (or would change) the account.
    pub fn changes(&self) -> impl Iterator<Item = &Action> {
        self.actions
            .iter()
            .filter(|a| a.decision != Decision::Unchanged)
    }
}
