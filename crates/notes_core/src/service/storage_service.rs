//! Note storage use-case service.
//!
//! # Responsibility
//! - Provide create/read/update/delete for the current user's notes.
//! - Publish a live feed of the current user's note list.
//!
//! # Invariants
//! - Every write is stamped with the current user's id.
//! - Reads and deletes never reach documents owned by other users.
//! - The feed re-queries on user change and after each write.

use crate::model::note::Note;
use crate::repo::note_repo::{NoteRepository, RepoError, RepoResult};
use crate::service::account_service::{AccountService, User};
use futures::Stream;
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Service error for note storage use-cases.
#[derive(Debug)]
pub enum StorageError {
    /// No authenticated user to scope the operation to.
    NotSignedIn,
    /// Operation requires a stored note id.
    InvalidNoteId(String),
    /// Persistence-layer failure, propagated unchanged.
    Repo(RepoError),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotSignedIn => write!(f, "no authenticated user"),
            Self::InvalidNoteId(id) => write!(f, "invalid note id: `{id}`"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for StorageError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// User-scoped note storage over a repository implementation.
pub struct StorageService<A: AccountService, R: NoteRepository> {
    account: Arc<A>,
    repo: Arc<R>,
    revision_tx: watch::Sender<u64>,
}

impl<A: AccountService, R: NoteRepository> StorageService<A, R> {
    pub fn new(account: Arc<A>, repo: R) -> Self {
        let (revision_tx, _revision_rx) = watch::channel(0);
        Self {
            account,
            repo: Arc::new(repo),
            revision_tx,
        }
    }

    /// Subscribes to the current user's note list.
    ///
    /// The feed yields the current list on first poll, then again whenever
    /// the user identity changes or a write goes through this service. It
    /// ends once the account or this service is dropped.
    pub fn notes(&self) -> NotesFeed<R> {
        NotesFeed {
            repo: Arc::clone(&self.repo),
            user_rx: self.account.current_user(),
            revision_rx: self.revision_tx.subscribe(),
            primed: false,
        }
    }

    /// Inserts a new note for the current user and returns its stored id.
    ///
    /// A blank or placeholder id is replaced by a generated one.
    pub async fn create_note(&self, note: &Note) -> StorageResult<String> {
        let started_at = Instant::now();
        let mut stored = note.clone();
        stored.user_id = self.require_user_id()?;
        if stored.has_unassigned_id() {
            stored.id = Note::generate_id();
        }

        self.repo
            .insert_note(&stored)
            .map_err(|err| log_failure("note_create", started_at, err))?;
        self.bump_revision();
        info!(
            "event=note_create module=service status=ok note_id={} duration_ms={}",
            stored.id,
            started_at.elapsed().as_millis()
        );
        Ok(stored.id)
    }

    /// Gets one of the current user's notes, or `None` when absent.
    pub async fn read_note(&self, note_id: &str) -> StorageResult<Option<Note>> {
        let user_id = self.require_user_id()?;
        let note = self.repo.find_note(&user_id, note_id)?;
        debug!(
            "event=note_read module=service status=ok note_id={note_id} found={}",
            note.is_some()
        );
        Ok(note)
    }

    /// Replaces the note with the same id, inserting it when absent.
    pub async fn update_note(&self, note: &Note) -> StorageResult<()> {
        let started_at = Instant::now();
        let user_id = self.require_user_id()?;
        if note.has_unassigned_id() {
            return Err(StorageError::InvalidNoteId(note.id.clone()));
        }

        let mut stored = note.clone();
        stored.user_id = user_id;
        self.repo
            .upsert_note(&stored)
            .map_err(|err| log_failure("note_update", started_at, err))?;
        self.bump_revision();
        info!(
            "event=note_update module=service status=ok note_id={} duration_ms={}",
            stored.id,
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Deletes one of the current user's notes. Absent ids are not an error.
    pub async fn delete_note(&self, note_id: &str) -> StorageResult<()> {
        let started_at = Instant::now();
        let user_id = self.require_user_id()?;
        let removed = self
            .repo
            .delete_note(&user_id, note_id)
            .map_err(|err| log_failure("note_delete", started_at, err))?;
        if removed {
            self.bump_revision();
        }
        info!(
            "event=note_delete module=service status=ok note_id={note_id} removed={removed} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    fn require_user_id(&self) -> StorageResult<String> {
        self.account
            .current_user_id()
            .ok_or(StorageError::NotSignedIn)
    }

    fn bump_revision(&self) {
        self.revision_tx
            .send_modify(|revision| *revision = revision.wrapping_add(1));
    }
}

fn log_failure(event: &str, started_at: Instant, err: RepoError) -> RepoError {
    error!(
        "event={event} module=service status=error duration_ms={} error={}",
        started_at.elapsed().as_millis(),
        err
    );
    err
}

/// Live sequence of the current user's note list.
pub struct NotesFeed<R: NoteRepository> {
    repo: Arc<R>,
    user_rx: watch::Receiver<Option<User>>,
    revision_rx: watch::Receiver<u64>,
    primed: bool,
}

impl<R: NoteRepository> NotesFeed<R> {
    /// Waits for the next list snapshot.
    ///
    /// Returns `None` once the subscription is cancelled upstream.
    pub async fn next(&mut self) -> Option<RepoResult<Vec<Note>>> {
        if self.primed {
            let upstream_open = tokio::select! {
                changed = self.user_rx.changed() => changed.is_ok(),
                changed = self.revision_rx.changed() => changed.is_ok(),
            };
            if !upstream_open {
                return None;
            }
        }
        self.primed = true;

        let _ = self.revision_rx.borrow_and_update();
        let user_id = self
            .user_rx
            .borrow_and_update()
            .as_ref()
            .map(|user| user.id.clone());

        Some(match user_id {
            Some(user_id) => self.repo.list_notes(&user_id),
            None => Ok(Vec::new()),
        })
    }

    /// Adapts the feed into a `Stream` of list snapshots.
    pub fn into_stream(self) -> impl Stream<Item = RepoResult<Vec<Note>>>
    where
        R: 'static,
    {
        futures::stream::unfold(self, |mut feed| async move {
            let snapshot = feed.next().await?;
            Some((snapshot, feed))
        })
    }
}
