//! Versioned JSON document store.
//!
//! This crate provides the persistence layer of the Eventbook server: named
//! collections of JSON documents with exact-match lookup and whole-record
//! replacement. It intentionally stays far simpler than a relational store:
//!
//! - every record is one JSON document keyed by its id
//! - lookups deserialize and filter; there are no secondary indexes
//! - every record carries a version stamp, and [`Collection::replace`]
//!   refuses to overwrite a record that changed since it was read
//!
//! The version check is what makes read-modify-write loops safe under
//! concurrent requests: callers re-read and retry on
//! [`StoreError::VersionConflict`] instead of silently losing updates.
//!
//! # Example
//! ```rust
//! use eventbook_store::{Document, DocStore};
//! use serde::{Deserialize, Serialize};
//! use uuid::Uuid;
//!
//! #[derive(Clone, Serialize, Deserialize)]
//! struct Task {
//!     id: Uuid,
//!     title: String,
//! }
//!
//! impl Document for Task {
//!     fn id(&self) -> Uuid {
//!         self.id
//!     }
//! }
//!
//! let store = DocStore::in_memory();
//! let tasks = store.collection::<Task>("tasks");
//! let task = Task { id: Uuid::new_v4(), title: "write docs".into() };
//! tasks.insert(&task).unwrap();
//! assert_eq!(tasks.find(|t| t.title == "write docs").unwrap().len(), 1);
//! ```

mod collection;
mod error;
mod store;

pub use collection::{Collection, Document, Versioned};
pub use error::StoreError;
pub use store::DocStore;
