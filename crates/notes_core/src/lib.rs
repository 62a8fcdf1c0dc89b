//! Core data access and navigation for the notes app.
//! This crate is the single source of truth for note ownership rules.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod routes;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::document::{Document, DocumentError};
pub use model::note::Note;
pub use repo::note_repo::{
    NoteRepository, RepoError, RepoResult, SqliteNoteRepository, NOTES_COLLECTION,
};
pub use routes::Screen;
pub use service::account_service::{AccountService, SessionAccount, User};
pub use service::storage_service::{NotesFeed, StorageError, StorageResult, StorageService};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
