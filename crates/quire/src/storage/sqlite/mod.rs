//! SQLite storage backend implementation.
//!
//! Documents of every collection share one table and are stored as JSON
//! bodies. Access goes through `tokio-rusqlite`, which runs `rusqlite` calls
//! on a dedicated connection thread.

mod error;
mod repository;
mod schema;

pub use repository::{SqliteDocumentStore, SqliteRepository};
