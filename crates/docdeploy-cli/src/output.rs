use anyhow::Result;
use colored::Colorize;
use docdeploy_reconcile::{Decision, ReconcileMode, ReconcileReport};
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

pub fn print_report(report: &ReconcileReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Text => print_text(report),
    }
    Ok(())
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

fn print_text(report: &ReconcileReport) {
    if report.actions.is_empty() {
        println!("Schema declares no resources.");
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(["Kind", "Path", "Decision"]);
    for action in &report.actions {
        builder.push_record([
            action.kind.to_string(),
            action.path.clone(),
            decision_label(action.decision, report.mode),
        ]);
    }
    println!("{}", builder.build().with(Style::rounded()));

    let summary = format!(
        "{} created, {} updated, {} unchanged",
        report.created(),
        report.updated(),
        report.unchanged()
    );
    match report.mode {
        ReconcileMode::DryRun => println!("{} {summary} (dry run)", "•".yellow()),
        ReconcileMode::Apply if report.is_noop() => print_success("Account already up to date"),
        ReconcileMode::Apply => print_success(&summary),
    }
}

fn decision_label(decision: Decision, mode: ReconcileMode) -> String {
    let label = match (decision, mode) {
        (Decision::Create, ReconcileMode::DryRun) => "would create",
        (Decision::Update, ReconcileMode::DryRun) => "would update",
        (Decision::Create, ReconcileMode::Apply) => "created",
        (Decision::Update, ReconcileMode::Apply) => "updated",
        (Decision::Unchanged, _) => "unchanged",
    };
    match decision {
        Decision::Create => label.green().to_string(),
        Decision::Update => label.yellow().to_string(),
        Decision::Unchanged => label.dimmed().to_string(),
    }
}
