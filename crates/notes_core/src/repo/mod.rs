//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite and document-encoding details from the service layer.
//!
//! # Invariants
//! - Every note query binds a user id; no API reads across users.
//! - Repository APIs return semantic errors in addition to DB transport errors.

pub mod note_repo;
