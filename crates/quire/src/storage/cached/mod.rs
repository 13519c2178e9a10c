//! Cached repository decorator.
//!
//! The decorator implements the cache-aside pattern over any
//! `DocumentRepository`:
//!
//! - **Reads**: Check cache first, on miss fetch from the store and populate cache
//! - **Writes**: Persist to the store first, then bring the cache in line
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let store = InMemoryDocumentStore::new();
//! let repo = Arc::new(store.collection::<Post>());
//! let cache = Arc::new(MemoryCache::new(10_000));
//!
//! let cached_repo = CachedRepository::new(repo, cache, Duration::from_secs(60));
//! ```

mod document;

pub use document::CachedRepository;
