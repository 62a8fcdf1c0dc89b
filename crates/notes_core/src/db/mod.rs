//! SQLite-backed document store: connection bootstrap, schema and readiness.
//!
//! Every collection shares one `documents` table. A document is a JSON
//! object stored as text in `body`, addressed by `(collection, id)`.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - Nothing reads or writes documents on a connection that fails
//!   [`ensure_document_store`].

use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

/// Table holding every stored document, keyed by `(collection, id)`.
pub const DOCUMENTS_TABLE: &str = "documents";

const DOCUMENTS_COLUMNS: &[&str] = &["collection", "id", "body"];

pub type DbResult<T> = Result<T, DbError>;

/// Failures opening, migrating or validating the document store.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer binary.
    UnsupportedSchemaVersion { db_version: u32, latest_supported: u32 },
    /// The connection has not been brought to the current schema.
    SchemaNotMigrated { expected: u32, actual: u32 },
    MissingTable(&'static str),
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "document store schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::SchemaNotMigrated { expected, actual } => write!(
                f,
                "document store is at schema version {actual}, expected {expected}"
            ),
            Self::MissingTable(table) => write!(f, "document store table `{table}` is missing"),
            Self::MissingColumn { table, column } => {
                write!(f, "document store column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Checks that `conn` is fully migrated and exposes the `documents` shape.
///
/// Used by repositories that accept caller-provided connections.
pub fn ensure_document_store(conn: &Connection) -> DbResult<()> {
    let expected = migrations::latest_version();
    let actual = migrations::current_version(conn)?;
    if actual != expected {
        return Err(DbError::SchemaNotMigrated { expected, actual });
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({DOCUMENTS_TABLE});"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;
    if columns.is_empty() {
        return Err(DbError::MissingTable(DOCUMENTS_TABLE));
    }

    match DOCUMENTS_COLUMNS
        .iter()
        .find(|&&column| !columns.iter().any(|name| name == column))
    {
        Some(&column) => Err(DbError::MissingColumn {
            table: DOCUMENTS_TABLE,
            column,
        }),
        None => Ok(()),
    }
}
