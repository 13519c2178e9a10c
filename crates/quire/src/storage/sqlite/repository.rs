//! SQLite document store implementation.
//!
//! Implements `DocumentRepository<T>` from `quire_core::storage` using SQLite.

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use tokio_rusqlite::Connection;

use quire_core::document::matches_optional;
use quire_core::storage::{DocumentRepository, RepositoryError, Result};
use quire_core::{stamped_for_update, Document, Predicate};

use super::error::map_tokio_rusqlite_error;
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// SQLite-backed document store holding every collection.
///
/// Cloning shares the underlying connection.
#[derive(Clone)]
pub struct SqliteDocumentStore {
    conn: Connection,
}

impl SqliteDocumentStore {
    /// Opens a store backed by a database file.
    ///
    /// The database file will be created if it doesn't exist.
    /// Schema tables are created automatically.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Opens a store backed by an in-memory database.
    ///
    /// Useful for testing - data is lost when the connection is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Returns a repository over the collection named by `T::COLLECTION`.
    pub fn collection<T: Document>(&self) -> SqliteRepository<T> {
        SqliteRepository {
            conn: self.conn.clone(),
            _marker: PhantomData,
        }
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES)
                .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }
}

/// Repository over a single collection of a [`SqliteDocumentStore`].
pub struct SqliteRepository<T> {
    conn: Connection,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Document> SqliteRepository<T> {
    /// Loads every document of the collection in store order.
    async fn load_all(&self) -> Result<Vec<(String, T)>> {
        let rows = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(schema::SELECT_DOCUMENTS).map_err(wrap_err)?;
                let rows = stmt
                    .query_map([T::COLLECTION], |row| {
                        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                    })
                    .map_err(wrap_err)?
                    .collect::<rusqlite::Result<Vec<_>>>()
                    .map_err(wrap_err)?;
                Ok(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, T::COLLECTION, ""))?;

        rows.into_iter()
            .map(|(id, body)| {
                let document = serde_json::from_str::<T>(&body)
                    .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
                Ok((id, document))
            })
            .collect()
    }
}

#[async_trait]
impl<T: Document> DocumentRepository<T> for SqliteRepository<T> {
    async fn insert_one(&self, document: &T) -> Result<()> {
        let id = document.id().to_string();
        let body = serde_json::to_string(document)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let created_at = document.created_at().to_rfc3339();
        let updated_at = document.updated_at().map(|at| at.to_rfc3339());
        let document_id = id.clone();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_DOCUMENT,
                    rusqlite::params![T::COLLECTION, id, body, created_at, updated_at],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, T::COLLECTION, document_id))
    }

    async fn get_all(&self, predicate: Option<&Predicate<T>>) -> Result<Vec<T>> {
        Ok(self
            .load_all()
            .await?
            .into_iter()
            .map(|(_, document)| document)
            .filter(|document| matches_optional(predicate, document))
            .collect())
    }

    async fn delete_one(&self, predicate: &Predicate<T>) -> Result<()> {
        let Some(id) = self
            .load_all()
            .await?
            .into_iter()
            .find(|(_, document)| predicate.matches(document))
            .map(|(id, _)| id)
        else {
            return Ok(());
        };
        let document_id = id.clone();

        self.conn
            .call(move |conn| {
                conn.execute(schema::DELETE_DOCUMENT, rusqlite::params![T::COLLECTION, id])
                    .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, T::COLLECTION, document_id))
    }

    async fn update(&self, document: &T) -> Result<T> {
        let updated = stamped_for_update(document, Utc::now());
        let id = updated.id().to_string();
        let body = serde_json::to_string(&updated)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let updated_at = updated.updated_at().map(|at| at.to_rfc3339());
        let document_id = id.clone();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(
                        schema::UPDATE_DOCUMENT,
                        rusqlite::params![T::COLLECTION, id, body, updated_at],
                    )
                    .map_err(wrap_err)?;
                if rows == 0 {
                    Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
                } else {
                    Ok(())
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, T::COLLECTION, document_id))?;

        Ok(updated)
    }
}
