//! Domain model for notes and their stored document shape.
//!
//! # Responsibility
//! - Define the `Note` record handled by the storage service.
//! - Map notes to and from schema-flexible documents.
//!
//! # Invariants
//! - A note is identified by a string id that is unique within its collection.
//! - Ownership is carried by `user_id`; the model itself does not enforce it.

pub mod document;
pub mod note;
