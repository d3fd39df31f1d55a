//! In-process session store.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::StoreError;
use crate::session::Session;
use crate::traits::CredentialStore;

/// A [`CredentialStore`] that keeps the session in memory.
///
/// Clones share the same slot, so a test can hand one clone to a
/// [`SessionManager`](crate::SessionManager) and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<Session>>>,
    saves: Arc<Mutex<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `session`.
    pub fn with_session(session: Session) -> Self {
        let store = Self::new();
        *store.lock_slot() = Some(session);
        store
    }

    /// The stored session, without going through the async trait.
    pub fn snapshot(&self) -> Option<Session> {
        self.lock_slot().clone()
    }

    /// How many times `save` has been called.
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_slot(&self) -> std::sync::MutexGuard<'_, Option<Session>> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn load(&self) -> Result<Option<Session>, StoreError> {
        Ok(self.snapshot())
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        *self.lock_slot() = Some(session.clone());
        *self.saves.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.lock_slot() = None;
        Ok(())
    }
}
