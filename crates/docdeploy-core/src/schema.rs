//! Desired-state tree: databases own collections, collections own stored procedures.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::indexing::IndexingPolicy;

/// Root of the desired state for one account.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Schema {
    #[serde(rename = "Databases", default)]
    pub databases: Vec<Database>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Database {
    #[serde(rename = "DatabaseName")]
    pub name: String,
    #[serde(rename = "Collections", default)]
    pub collections: Vec<Collection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Collection {
    #[serde(rename = "CollectionName")]
    pub name: String,
    /// Partition key path, e.g. `/tenantId`.
    #[serde(rename = "PartitionKey")]
    pub partition_key: String,
    /// Provisioned request units per second.
    #[serde(rename = "OfferThroughput")]
    pub offer_throughput: u32,
    #[serde(rename = "IndexingPolicy", default)]
    pub indexing_policy: IndexingPolicy,
    #[serde(rename = "StoredProcedures", default)]
    pub stored_procedures: Vec<StoredProcedure>,
}

/// A stored procedure is declared by name only; its body is resolved at reconcile time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoredProcedure {
    #[serde(rename = "StoredProcedureName")]
    pub name: String,
}

impl Schema {
    /// Checks every invariant that serde cannot express.
    ///
    /// Names must be non-empty and unique among siblings, throughput positive,
    /// and every path absolute.
    pub fn validate(&self) -> crate::Result<()> {
        let mut seen = HashSet::new();
        for (i, database) in self.databases.iter().enumerate() {
            let at = format!("Databases[{i}]");
            validate_name(&database.name, &format!("{at}.DatabaseName"), &mut seen)?;
            database.validate(&at)?;
        }
        Ok(())
    }

    /// Total number of nodes in the tree, for logging.
    pub fn resource_count(&self) -> usize {
        self.databases
            .iter()
            .map(|d| {
                1 + d
                    .collections
                    .iter()
                    .map(|c| 1 + c.stored_procedures.len())
                    .sum::<usize>()
            })
            .sum()
    }
}

impl Database {
    fn validate(&self, location: &str) -> crate::Result<()> {
        let mut seen = HashSet::new();
        for (i, collection) in self.collections.iter().enumerate() {
            let at = format!("{location}.Collections[{i}]");
            validate_name(&collection.name, &format!("{at}.CollectionName"), &mut seen)?;
            collection.validate(&at)?;
        }
        Ok(())
    }
}

impl Collection {
    fn validate(&self, location: &str) -> crate::Result<()> {
        if !self.partition_key.starts_with('/') || self.partition_key.len() < 2 {
            return Err(CoreError::validation(
                format!("{location}.PartitionKey"),
                format!(
                    "partition key must be a path such as \"/id\", got \"{}\"",
                    self.partition_key
                ),
            ));
        }
        if self.offer_throughput == 0 {
            return Err(CoreError::validation(
                format!("{location}.OfferThroughput"),
                "throughput must be a positive integer",
            ));
        }
        self.indexing_policy
            .validate(&format!("{location}.IndexingPolicy"))?;

        let mut seen = HashSet::new();
        for (i, procedure) in self.stored_procedures.iter().enumerate() {
            validate_name(
                &procedure.name,
                &format!("{location}.StoredProcedures[{i}].StoredProcedureName"),
                &mut seen,
            )?;
        }
        Ok(())
    }
}

/// Characters the account rejects in resource ids.
const RESERVED_NAME_CHARS: [char; 4] = ['/', '\\', '#', '?'];

fn validate_name<'a>(
    name: &'a str,
    location: &str,
    seen: &mut HashSet<&'a str>,
) -> crate::Result<()> {
    if name.trim().is_empty() {
        return Err(CoreError::validation(location, "name must not be empty"));
    }
    if let Some(c) = name.chars().find(|c| RESERVED_NAME_CHARS.contains(c)) {
        return Err(CoreError::validation(
            location,
            format!("name \"{name}\" must not contain '{c}'"),
        ));
    }
    if name.ends_with(char::is_whitespace) {
        return Err(CoreError::validation(
            location,
            format!("name \"{name}\" must not end with whitespace"),
        ));
    }
    if !seen.insert(name) {
        return Err(CoreError::validation(
            location,
            format!("duplicate name \"{name}\""),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(name: &str) -> Collection {
        Collection {
            name: name.to_string(),
            partition_key: "/pk".to_string(),
            offer_throughput: 400,
            indexing_policy: IndexingPolicy::default(),
            stored_procedures: Vec::new(),
        }
    }

    #[test]
    fn test_valid_schema_passes() {
        let schema = Schema {
            databases: vec![Database {
                name: "D1".into(),
                collections: vec![collection("C1"), collection("C2")],
            }],
        };
        assert!(schema.validate().is_ok());
        assert_eq!(schema.resource_count(), 3);
    }

    #[test]
    fn test_duplicate_collection_rejected() {
        let schema = Schema {
            databases: vec![Database {
                name: "D1".into(),
                collections: vec![collection("C1"), collection("C1")],
            }],
        };
        let err = schema.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid schema at Databases[0].Collections[1].CollectionName: duplicate name \"C1\""
        );
    }

    #[test]
    fn test_same_name_in_different_parents_is_allowed() {
        let schema = Schema {
            databases: vec![
                Database {
                    name: "D1".into(),
                    collections: vec![collection("C1")],
                },
                Database {
                    name: "D2".into(),
                    collections: vec![collection("C1")],
                },
            ],
        };
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_zero_throughput_rejected() {
        let mut c = collection("C1");
        c.offer_throughput = 0;
        let schema = Schema {
            databases: vec![Database {
                name: "D1".into(),
                collections: vec![c],
            }],
        };
        let err = schema.validate().unwrap_err();
        assert!(err.to_string().contains("OfferThroughput"));
    }

    #[test]
    fn test_partition_key_must_be_path() {
        let mut c = collection("C1");
        c.partition_key = "pk".into();
        let schema = Schema {
            databases: vec![Database {
                name: "D1".into(),
                collections: vec![c],
            }],
        };
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_duplicate_stored_procedure_rejected() {
        let mut c = collection("C1");
        c.stored_procedures = vec![
            StoredProcedure { name: "SP1".into() },
            StoredProcedure { name: "SP1".into() },
        ];
        let schema = Schema {
            databases: vec![Database {
                name: "D1".into(),
                collections: vec![c],
            }],
        };
        let err = schema.validate().unwrap_err();
        assert!(err.to_string().contains("StoredProcedures[1]"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let schema = Schema {
            databases: vec![Database {
                name: "  ".into(),
                collections: vec![],
            }],
        };
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_names_with_url_delimiters_rejected() {
        for name in ["orders#v2", "orders?v2", "orders\\v2", "orders/v2", "orders "] {
            let schema = Schema {
                databases: vec![Database {
                    name: name.into(),
                    collections: vec![],
                }],
            };
            let err = schema.validate().unwrap_err();
            assert!(
                err.to_string()
                    .starts_with("Invalid schema at Databases[0].DatabaseName"),
                "{name:?} accepted: {err}"
            );
        }

        let err = Schema::from_json_str(r#"{"Databases":[{"DatabaseName":"orders#v2"}]}"#)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid schema at Databases[0].DatabaseName: name \"orders#v2\" must not contain '#'"
        );
    }

    #[test]
    fn test_percent_and_inner_spaces_allowed() {
        let schema = Schema {
            databases: vec![Database {
                name: "sales 100%".into(),
                collections: vec![collection("C1")],
            }],
        };
        assert!(schema.validate().is_ok());
    }
}
