use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::{ArgGroup, Parser, ValueEnum};
use docdeploy_client::AccountRef;
use docdeploy_core::SchemaSource;

#[derive(Parser, Debug)]
#[command(name = "docdeploy")]
#[command(about = "Bring a document-database account in line with a JSON schema")]
#[command(version)]
#[command(group(
    ArgGroup::new("schema")
        .required(true)
        .args(["config_text", "config_file"]),
))]
pub struct Cli {
    /// Account name
    #[arg(long, env = "DOCDEPLOY_ACCOUNT")]
    pub account: String,

    /// Resource group that owns the account
    #[arg(long, env = "DOCDEPLOY_RESOURCE_GROUP")]
    pub resource_group: String,

    /// Inline JSON schema
    #[arg(long)]
    pub config_text: Option<String>,

    /// Path to a JSON schema file
    #[arg(long)]
    pub config_file: Option<PathBuf>,

    /// Directory searched for stored procedure sources
    #[arg(long, env = "DOCDEPLOY_PROJECT_ROOT")]
    pub project_root: PathBuf,

    /// REST endpoint of the management API
    #[arg(long, env = "DOCDEPLOY_ENDPOINT")]
    pub endpoint: String,

    /// Value sent as the Authorization header
    #[arg(long, env = "DOCDEPLOY_AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Compute and print decisions without creating or updating anything
    #[arg(long)]
    pub dry_run: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "DOCDEPLOY_LOG", default_value = "info")]
    pub log_level: String,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Cli {
    /// The schema source picked on the command line.
    ///
    /// Parsing already enforces exactly one of the two flags; a `Cli` built
    /// any other way gets an error rather than an empty schema.
    pub fn schema_source(&self) -> Result<SchemaSource> {
        match (&self.config_text, &self.config_file) {
            (Some(text), None) => Ok(SchemaSource::Text(text.clone())),
            (None, Some(path)) => Ok(SchemaSource::File(path.clone())),
            (Some(_), Some(_)) => bail!("--config-text and --config-file are mutually exclusive"),
            (None, None) => bail!("one of --config-text or --config-file is required"),
        }
    }

    pub fn account_ref(&self) -> AccountRef {
        AccountRef::new(&self.account, &self.resource_group)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
