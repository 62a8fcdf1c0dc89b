//! Note repository contract and SQLite document-store implementation.
//!
//! # Responsibility
//! - Provide single-record CRUD over the notes collection.
//! - Keep SQL and JSON document details inside the persistence boundary.
//!
//! # Invariants
//! - Reads, lists and deletes filter on both document id and `userId`.
//! - Upserts never overwrite a document owned by another user.
//! - Read paths reject undecodable documents instead of masking them.

use crate::db::{ensure_document_store, DbError};
use crate::model::document::{Document, DocumentError};
use crate::model::note::Note;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};

/// Collection holding note documents.
pub const NOTES_COLLECTION: &str = "notes";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// A stored document does not decode into a note.
    InvalidData(DocumentError),
    /// Upsert target exists but belongs to a different user.
    OwnershipConflict(String),
    /// A previous holder of the connection panicked mid-operation.
    ConnectionPoisoned,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(err) => write!(f, "invalid persisted note data: {err}"),
            Self::OwnershipConflict(id) => {
                write!(f, "note `{id}` belongs to another user")
            }
            Self::ConnectionPoisoned => write!(f, "database connection lock is poisoned"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<DocumentError> for RepoError {
    fn from(value: DocumentError) -> Self {
        Self::InvalidData(value)
    }
}

/// Repository interface for user-scoped note operations.
pub trait NoteRepository: Send + Sync {
    /// Inserts a new note document. Fails when the id already exists.
    fn insert_note(&self, note: &Note) -> RepoResult<()>;
    /// Gets one note owned by `user_id`.
    fn find_note(&self, user_id: &str, note_id: &str) -> RepoResult<Option<Note>>;
    /// Lists all notes owned by `user_id` in insertion order.
    fn list_notes(&self, user_id: &str) -> RepoResult<Vec<Note>>;
    /// Replaces the note document with the same id, inserting it if absent.
    fn upsert_note(&self, note: &Note) -> RepoResult<()>;
    /// Deletes one note owned by `user_id`. Returns whether a row was removed.
    fn delete_note(&self, user_id: &str, note_id: &str) -> RepoResult<bool>;
}

/// SQLite-backed note repository over the `documents` table.
///
/// Cloning shares the underlying connection.
#[derive(Clone)]
pub struct SqliteNoteRepository {
    conn: Arc<Mutex<Connection>>,
    collection: String,
}

impl SqliteNoteRepository {
    /// Constructs a repository over a migrated connection.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        Self::try_with_collection(conn, NOTES_COLLECTION)
    }

    /// Same as [`Self::try_new`] with a custom collection name.
    pub fn try_with_collection(
        conn: Connection,
        collection: impl Into<String>,
    ) -> RepoResult<Self> {
        ensure_document_store(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            collection: collection.into(),
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| RepoError::ConnectionPoisoned)
    }
}

impl NoteRepository for SqliteNoteRepository {
    fn insert_note(&self, note: &Note) -> RepoResult<()> {
        let body = note.to_document().to_json()?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3);",
            params![self.collection, note.id, body],
        )?;
        Ok(())
    }

    fn find_note(&self, user_id: &str, note_id: &str) -> RepoResult<Option<Note>> {
        let conn = self.lock()?;
        let body = conn
            .query_row(
                "SELECT body
                 FROM documents
                 WHERE collection = ?1
                   AND id = ?2
                   AND json_extract(body, '$.userId') = ?3;",
                params![self.collection, note_id, user_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        body.as_deref().map(parse_note_body).transpose()
    }

    fn list_notes(&self, user_id: &str) -> RepoResult<Vec<Note>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT body
             FROM documents
             WHERE collection = ?1
               AND json_extract(body, '$.userId') = ?2
             ORDER BY rowid ASC;",
        )?;

        let mut rows = stmt.query(params![self.collection, user_id])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }

        Ok(notes)
    }

    fn upsert_note(&self, note: &Note) -> RepoResult<()> {
        let body = note.to_document().to_json()?;
        let conn = self.lock()?;
        let changed = conn.execute(
            "INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3)
             ON CONFLICT (collection, id) DO UPDATE
             SET body = excluded.body
             WHERE json_extract(documents.body, '$.userId')
                 = json_extract(excluded.body, '$.userId');",
            params![self.collection, note.id, body],
        )?;

        if changed == 0 {
            return Err(RepoError::OwnershipConflict(note.id.clone()));
        }

        Ok(())
    }

    fn delete_note(&self, user_id: &str, note_id: &str) -> RepoResult<bool> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "DELETE FROM documents
             WHERE collection = ?1
               AND id = ?2
               AND json_extract(body, '$.userId') = ?3;",
            params![self.collection, note_id, user_id],
        )?;
        Ok(changed > 0)
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let body: String = row.get("body")?;
    parse_note_body(&body)
}

fn parse_note_body(body: &str) -> RepoResult<Note> {
    let document = Document::from_json(body)?;
    Ok(Note::from_document(&document)?)
}
