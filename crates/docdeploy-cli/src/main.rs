mod cli;
mod observability;
mod output;
mod rest;

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::debug;

use docdeploy_core::load_schema;
use docdeploy_reconcile::{FsContentResolver, ReconcileMode, Reconciler};

use cli::Cli;
use output::print_error;
use rest::RestClient;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    observability::init_tracing(&cli.log_level);

    let source = cli.schema_source()?;
    let schema = load_schema(&source)
        .with_context(|| format!("Failed to load schema from {}", source.describe()))?;
    debug!(resources = schema.resource_count(), "schema loaded");

    if !cli.project_root.is_dir() {
        bail!(
            "Project root {} is not a directory",
            cli.project_root.display()
        );
    }

    let client = RestClient::new(
        &cli.endpoint,
        cli.account_ref(),
        cli.auth_token.clone(),
        cli.timeout(),
    )
    .context("Failed to set up REST client")?;
    let resolver = FsContentResolver::new(&cli.project_root);
    let mode = if cli.dry_run {
        ReconcileMode::DryRun
    } else {
        ReconcileMode::Apply
    };

    let reconciler = Reconciler::new(Arc::new(client), Arc::new(resolver)).with_mode(mode);
    let report = reconciler
        .reconcile(&schema)
        .await
        .with_context(|| format!("Reconcile of account {} failed", cli.account_ref()))?;

    output::print_report(&report, cli.format)
}
