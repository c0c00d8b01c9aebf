//! In-memory resource client for docdeploy.
//!
//! This crate provides an in-memory implementation of the `ResourceClient`
//! trait from `docdeploy-client`. It backs the reconciler's tests and local
//! experiments: state lives in papaya lock-free maps and every call is
//! journaled so callers can assert exactly which operations were issued.
//!
//! # Example
//!
//! ```ignore
//! use docdeploy_client_memory::InMemoryClient;
//! use docdeploy_client::ResourceClient;
//!
//! let client = InMemoryClient::new();
//! client.seed_database("D1");
//! assert!(client.get_database("D1").await?.is_some());
//! assert_eq!(client.mutating_calls().await.len(), 0);
//! ```

mod client_impl;
pub mod journal;
pub mod storage;

pub use docdeploy_client::{ClientError, ResourceClient};

pub use journal::{ClientCall, ClientOperation};
pub use storage::{CollectionEntry, InMemoryClient, StorageKey};
