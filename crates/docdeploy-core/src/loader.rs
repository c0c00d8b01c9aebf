//! Loads a [`Schema`] from inline JSON text or a JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::CoreError;
use crate::schema::Schema;

/// Where the desired-state document comes from. Exactly one source per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    Text(String),
    File(PathBuf),
}

impl SchemaSource {
    /// Short description used in log lines; never includes inline text.
    pub fn describe(&self) -> String {
        match self {
            SchemaSource::Text(text) => format!("inline ({} bytes)", text.len()),
            SchemaSource::File(path) => path.display().to_string(),
        }
    }
}

/// Parse and validate a schema from the given source.
///
/// Fails on a missing file, invalid JSON, a document that does not match the
/// schema shape, or a shape that breaks a schema invariant.
pub fn load_schema(source: &SchemaSource) -> crate::Result<Schema> {
    debug!(source = %source.describe(), "loading schema");
    match source {
        SchemaSource::Text(text) => Schema::from_json_str(text),
        SchemaSource::File(path) => Schema::from_file(path),
    }
}

impl Schema {
    pub fn from_json_str(text: &str) -> crate::Result<Self> {
        let schema: Schema = serde_json::from_str(text)?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn from_file(path: &Path) -> crate::Result<Self> {
        if !path.is_file() {
            return Err(CoreError::file_not_found(path));
        }
        let text = fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}
