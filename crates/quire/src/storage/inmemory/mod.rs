//! In-memory storage backend.
//!
//! Documents are kept as JSON values per collection, in insertion order,
//! behind `Arc<RwLock<_>>`. Data is not persisted and is lost when the last
//! handle to the store is dropped.
//!
//! # Example
//!
//! ```rust,ignore
//! use quire::storage::inmemory::InMemoryDocumentStore;
//! use quire_core::post::Post;
//!
//! let store = InMemoryDocumentStore::new();
//! let posts = store.collection::<Post>();
//! ```

mod repository;

pub use repository::{InMemoryDocumentStore, InMemoryRepository};
