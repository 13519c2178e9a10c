//! SQLite schema definitions and SQL query constants.
//!
//! Pure data, no I/O.

/// SQL statement to create all tables.
///
/// `seq` preserves insertion order, which is the store's native order.
pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    body TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT,
    UNIQUE (collection, id)
);

CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection, seq);
"#;

pub const INSERT_DOCUMENT: &str = r#"
INSERT INTO documents (collection, id, body, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5)
"#;

/// Columns: id, body
pub const SELECT_DOCUMENTS: &str = r#"
SELECT id, body FROM documents
WHERE collection = ?1
ORDER BY seq
"#;

pub const UPDATE_DOCUMENT: &str = r#"
UPDATE documents SET body = ?3, updated_at = ?4
WHERE collection = ?1 AND id = ?2
"#;

pub const DELETE_DOCUMENT: &str = r#"
DELETE FROM documents WHERE collection = ?1 AND id = ?2
"#;
