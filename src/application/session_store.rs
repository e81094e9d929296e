use super::registry::Registry;
use crate::domain::UserId;
use crate::domain::session::{Session, Stage};
use tokio::sync::OwnedMutexGuard;

/// Per-user dialogue sessions.
///
/// Holding the guard returned by [`SessionStore::acquire`] is the user's turn:
/// the bot keeps it for the whole handling of one event.
#[derive(Default)]
pub struct SessionStore {
    sessions: Registry<Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, user: UserId) -> OwnedMutexGuard<Session> {
        self.sessions.lock(user).await
    }

    /// Copy of the user's session (a fresh idle one if the user was never seen).
    pub async fn snapshot(&self, user: UserId) -> Session {
        match self.sessions.get(user).await {
            Some(slot) => slot.lock().await.clone(),
            None => Session::default(),
        }
    }

    pub async fn stage(&self, user: UserId) -> Stage {
        self.snapshot(user).await.stage
    }

    pub async fn active_users(&self) -> usize {
        self.sessions.len().await
    }
}
