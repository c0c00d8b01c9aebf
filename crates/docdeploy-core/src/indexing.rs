//! Indexing policy value objects embedded in a collection definition.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Precision value meaning "maximum precision for the data type".
pub const MAX_PRECISION: i32 = -1;

/// How the account keeps indexes in step with writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexingMode {
    #[default]
    #[serde(alias = "Consistent")]
    Consistent,
    #[serde(alias = "Lazy")]
    Lazy,
    #[serde(alias = "None")]
    None,
}

impl fmt::Display for IndexingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexingMode::Consistent => write!(f, "consistent"),
            IndexingMode::Lazy => write!(f, "lazy"),
            IndexingMode::None => write!(f, "none"),
        }
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexKind {
    Range,
    Hash,
    Spatial,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::Range => write!(f, "Range"),
            IndexKind::Hash => write!(f, "Hash"),
            IndexKind::Spatial => write!(f, "Spatial"),
        }
    }
}


/// Data type an index descriptor applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    String,
    Number,
    Point,
    Polygon,
    LineString,
    MultiPolygon,
}

impl DataType {
    /// Geometry types can only be indexed by a `Spatial` index.
    pub fn is_spatial(&self) -> bool {
        matches!(
            self,
            DataType::Point | DataType::Polygon | DataType::LineString | DataType::MultiPolygon
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::String => write!(f, "String"),
            DataType::Number => write!(f, "Number"),
            DataType::Point => write!(f, "Point"),
            DataType::Polygon => write!(f, "Polygon"),
            DataType::LineString => write!(f, "LineString"),
            DataType::MultiPolygon => write!(f, "MultiPolygon"),
        }
    }
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Index {
    pub kind: IndexKind,
    pub data_type: DataType,
    /// `-1` requests maximum precision. Spatial indexes usually omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IncludedPath {
    pub path: String,
    #[serde(default)]
    pub indexes: Vec<Index>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExcludedPath {
    pub path: String,
}

/// Which document paths a collection indexes, and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IndexingPolicy {
    #[serde(default = "default_automatic")]
    pub automatic: bool,
    #[serde(default)]
    pub indexing_mode: IndexingMode,
    #[serde(default)]
    pub included_paths: Vec<IncludedPath>,
    #[serde(default)]
    pub excluded_paths: Vec<ExcludedPath>,
}

fn default_automatic() -> bool {
    true
}

impl Default for IndexingPolicy {
    fn default() -> Self {
        Self {
            automatic: true,
            indexing_mode: IndexingMode::Consistent,
            included_paths: Vec::new(),
            excluded_paths: Vec::new(),
        }
    }
}

impl IndexingPolicy {
    pub(crate) fn validate(&self, location: &str) -> crate::Result<()> {
        for (i, included) in self.included_paths.iter().enumerate() {
            let at = format!("{location}.includedPaths[{i}]");
            validate_path(&included.path, &format!("{at}.path"))?;
            for (j, index) in included.indexes.iter().enumerate() {
                index.validate(&format!("{at}.indexes[{j}]"))?;
            }
        }
        for (i, excluded) in self.excluded_paths.iter().enumerate() {
            validate_path(&excluded.path, &format!("{location}.excludedPaths[{i}].path"))?;
        }
        Ok(())
    }
}

impl Index {
    fn validate(&self, location: &str) -> crate::Result<()> {
        match (self.kind, self.data_type.is_spatial()) {
            (IndexKind::Spatial, false) => {
                return Err(CoreError::validation(
                    location,
                    format!("Spatial index cannot cover data type {}", self.data_type),
                ));
            }
            (IndexKind::Range | IndexKind::Hash, true) => {
                return Err(CoreError::validation(
                    location,
                    format!("{} index cannot cover data type {}", self.kind, self.data_type),
                ));
            }
            _ => {}
        }
        if let Some(precision) = self.precision
            && precision != MAX_PRECISION
            && precision <= 0
        {
            return Err(CoreError::validation(
                format!("{location}.precision"),
                format!("precision must be -1 or positive, got {precision}"),
            ));
        }
        Ok(())
    }
}

fn validate_path(path: &str, location: &str) -> crate::Result<()> {
    if !path.starts_with('/') {
        return Err(CoreError::validation(
            location,
            format!("path must start with '/', got \"{path}\""),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexing_mode_accepts_both_casings() {
        let mode: IndexingMode = serde_json::from_str(r#""consistent""#).unwrap();
        assert_eq!(mode, IndexingMode::Consistent);
        let mode: IndexingMode = serde_json::from_str(r#""Lazy""#).unwrap();
        assert_eq!(mode, IndexingMode::Lazy);
        assert!(serde_json::from_str::<IndexingMode>(r#""eventual""#).is_err());
    }

    #[test]
    fn test_unknown_index_kind_rejected() {
        let err = serde_json::from_str::<Index>(r#"{"kind": "Btree", "dataType": "String"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("unknown variant `Btree`"));
    }

    #[test]
    fn test_policy_defaults_when_fields_missing() {
        let policy: IndexingPolicy = serde_json::from_str("{}").unwrap();
        assert!(policy.automatic);
        assert_eq!(policy.indexing_mode, IndexingMode::Consistent);
        assert!(policy.included_paths.is_empty());
    }

    #[test]
    fn test_policy_deserializes_wire_shape() {
        let policy: IndexingPolicy = serde_json::from_str(
            r#"{
                "automatic": false,
                "indexingMode": "lazy",
                "includedPaths": [
                    {"path": "/*", "indexes": [
                        {"kind": "Range", "dataType": "Number", "precision": -1},
                        {"kind": "Hash", "dataType": "String", "precision": 3}
                    ]}
                ],
                "excludedPaths": [{"path": "/\"_etag\"/?"}]
            }"#,
        )
        .unwrap();
        assert!(!policy.automatic);
        assert_eq!(policy.indexing_mode, IndexingMode::Lazy);
        assert_eq!(policy.included_paths[0].indexes[1].kind, IndexKind::Hash);
        assert_eq!(policy.included_paths[0].indexes[0].precision, Some(MAX_PRECISION));
        assert!(policy.validate("IndexingPolicy").is_ok());
    }

    #[test]
    fn test_spatial_kind_mismatch_rejected() {
        let index = Index {
            kind: IndexKind::Spatial,
            data_type: DataType::Number,
            precision: None,
        };
        let err = index.validate("x").unwrap_err();
        assert!(err.to_string().contains("Spatial index cannot cover"));

        let index = Index {
            kind: IndexKind::Range,
            data_type: DataType::Point,
            precision: None,
        };
        assert!(index.validate("x").is_err());
    }

    #[test]
    fn test_zero_precision_rejected() {
        let index = Index {
            kind: IndexKind::Range,
            data_type: DataType::String,
            precision: Some(0),
        };
        let err = index.validate("p").unwrap_err();
        assert!(err.to_string().contains("p.precision"));
    }

    #[test]
    fn test_relative_path_rejected() {
        let policy = IndexingPolicy {
            excluded_paths: vec![ExcludedPath {
                path: "name/?".into(),
            }],
            ..Default::default()
        };
        let err = policy.validate("IndexingPolicy").unwrap_err();
        assert!(err.to_string().contains("IndexingPolicy.excludedPaths[0].path"));
    }
}
