//! Account collaborator contract and in-process session.
//!
//! # Responsibility
//! - Expose the authenticated user as an observable value.
//! - Provide a session holder for hosts that authenticate elsewhere.
//!
//! # Invariants
//! - Subscribers are notified only when the user identity changes.

use log::info;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Authenticated user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Source of the currently authenticated user.
pub trait AccountService: Send + Sync {
    /// Subscribes to the current user; `None` while signed out.
    fn current_user(&self) -> watch::Receiver<Option<User>>;

    fn current_user_id(&self) -> Option<String> {
        self.current_user()
            .borrow()
            .as_ref()
            .map(|user| user.id.clone())
    }
}

/// In-process account session backed by a watch channel.
#[derive(Debug)]
pub struct SessionAccount {
    user_tx: watch::Sender<Option<User>>,
}

impl Default for SessionAccount {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionAccount {
    /// Creates a signed-out session.
    pub fn new() -> Self {
        let (user_tx, _user_rx) = watch::channel(None);
        Self { user_tx }
    }

    pub fn signed_in(user: User) -> Self {
        let session = Self::new();
        session.sign_in(user);
        session
    }

    /// Replaces the session user. Re-signing the same id is a no-op.
    pub fn sign_in(&self, user: User) {
        let changed = self.user_tx.send_if_modified(|current| {
            if current.as_ref().map(|existing| &existing.id) == Some(&user.id) {
                return false;
            }
            *current = Some(user);
            true
        });
        if changed {
            info!("event=account_sign_in module=service status=ok");
        }
    }

    pub fn sign_out(&self) {
        let changed = self.user_tx.send_if_modified(|current| current.take().is_some());
        if changed {
            info!("event=account_sign_out module=service status=ok");
        }
    }
}

impl AccountService for SessionAccount {
    fn current_user(&self) -> watch::Receiver<Option<User>> {
        self.user_tx.subscribe()
    }
}
