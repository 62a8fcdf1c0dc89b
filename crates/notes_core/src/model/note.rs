//! Note domain model.
//!
//! # Responsibility
//! - Define the note record owned by one user.
//! - Map notes to and from their stored document shape.
//!
//! # Invariants
//! - Document keys are `_id`, `title`, `content` and `userId`.
//! - Decoding never yields a partially-filled note.

use crate::model::document::{Document, DocumentError};
use crate::routes::NOTE_DEFAULT_ID;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ID_FIELD: &str = "_id";
pub const TITLE_FIELD: &str = "title";
pub const CONTENT_FIELD: &str = "content";
pub const USER_ID_FIELD: &str = "userId";

/// A single note as seen by the app.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub content: String,
    /// Owner of the note. Serialized as `userId` to match stored documents.
    #[serde(rename = "userId")]
    pub user_id: String,
}

impl Note {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            user_id: user_id.into(),
        }
    }

    /// Creates an unsaved draft. The store assigns the id on create.
    pub fn draft(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(String::new(), title, content, String::new())
    }

    /// Whether this note still needs a store-assigned id.
    ///
    /// Both an empty id and the navigation placeholder count as unassigned.
    pub fn has_unassigned_id(&self) -> bool {
        let id = self.id.trim();
        id.is_empty() || id == NOTE_DEFAULT_ID
    }

    /// Returns a generated id suitable for a new note.
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn to_document(&self) -> Document {
        let mut document = Document::new();
        document.insert(ID_FIELD, self.id.as_str());
        document.insert(TITLE_FIELD, self.title.as_str());
        document.insert(CONTENT_FIELD, self.content.as_str());
        document.insert(USER_ID_FIELD, self.user_id.as_str());
        document
    }

    pub fn from_document(document: &Document) -> Result<Self, DocumentError> {
        Ok(Self {
            id: document.require_str(ID_FIELD)?.to_string(),
            title: document.require_str(TITLE_FIELD)?.to_string(),
            content: document.require_str(CONTENT_FIELD)?.to_string(),
            user_id: document.require_str(USER_ID_FIELD)?.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Note, USER_ID_FIELD};
    use crate::model::document::{Document, DocumentError};

    #[test]
    fn document_mapping_uses_stored_key_names() {
        let note = Note::new("n-1", "Groceries", "milk", "user-a");
        let document = note.to_document();

        assert_eq!(document.require_str("_id").unwrap(), "n-1");
        assert_eq!(document.require_str(USER_ID_FIELD).unwrap(), "user-a");
        assert_eq!(Note::from_document(&document).unwrap(), note);
    }

    #[test]
    fn serde_shape_matches_document_mapping() {
        let note = Note::new("n-2", "t", "c", "u");
        let via_serde: Document =
            serde_json::from_value(serde_json::to_value(&note).unwrap()).unwrap();
        assert_eq!(via_serde, note.to_document());
    }

    #[test]
    fn decode_rejects_partial_documents() {
        let mut document = Note::new("n-3", "t", "c", "u").to_document();
        document.insert("content", serde_json::Value::Null);

        let err = Note::from_document(&document).unwrap_err();
        assert!(matches!(
            err,
            DocumentError::UnexpectedType {
                field: "content",
                ..
            }
        ));
    }

    #[test]
    fn placeholder_and_blank_ids_are_unassigned() {
        assert!(Note::draft("t", "c").has_unassigned_id());
        assert!(Note::new("-1", "t", "c", "u").has_unassigned_id());
        assert!(!Note::new("abc", "t", "c", "u").has_unassigned_id());
        assert_ne!(Note::generate_id(), Note::generate_id());
    }
}
