//! Storage backend implementations.
//!
//! This module provides concrete implementations of the repository traits
//! defined in `quire_core::storage`. The document store backend is selected
//! at compile time via feature flags; the cache-aside decorator in [`cached`]
//! wraps whichever backend is active.
//!
//! # Feature Flags
//!
//! - `inmemory` (default): Process-local document store
//! - `sqlite`: SQLite document store using `rusqlite` and `tokio-rusqlite`
//!
//! These features are mutually exclusive - only one storage backend can be
//! enabled at a time.
//!
//! # Examples
//!
//! Build with the in-memory store (default):
//! ```bash
//! cargo build -p quire
//! ```
//!
//! Build with SQLite:
//! ```bash
//! cargo build -p quire --no-default-features --features sqlite,memory
//! ```

// Compile-time checks for mutual exclusivity
#[cfg(all(feature = "inmemory", feature = "sqlite"))]
compile_error!(
    "Features 'inmemory' and 'sqlite' are mutually exclusive. \
    Enable only one storage backend at a time."
);

#[cfg(not(any(feature = "inmemory", feature = "sqlite")))]
compile_error!(
    "No storage backend selected. Enable 'inmemory' or 'sqlite' feature. \
    Example: cargo build -p quire --features sqlite"
);

pub mod cached;

// The in-memory store also backs service and handler tests regardless of the
// active feature.
#[cfg(any(feature = "inmemory", test))]
pub mod inmemory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use cached::CachedRepository;

#[cfg(any(feature = "inmemory", test))]
#[allow(unused_imports)]
pub use inmemory::{InMemoryDocumentStore, InMemoryRepository};

#[cfg(feature = "sqlite")]
#[allow(unused_imports)]
pub use sqlite::{SqliteDocumentStore, SqliteRepository};
