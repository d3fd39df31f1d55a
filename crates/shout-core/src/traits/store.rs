//! Session persistence and credential supply traits.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::{Credentials, Session};

/// Where the current session is persisted between invocations.
///
/// There is a single account, so the store holds at most one session. An
/// empty store is a normal state meaning "never logged in". Concurrent
/// writers are not coordinated: the last `save` wins.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load the stored session, if there is one.
    async fn load(&self) -> Result<Option<Session>, StoreError>;

    /// Persist `session`, replacing whatever was stored.
    async fn save(&self, session: &Session) -> Result<(), StoreError>;

    /// Forget the stored session. Clearing an empty store succeeds.
    async fn clear(&self) -> Result<(), StoreError>;
}

/// Supplies login credentials when no session is available.
///
/// Usually an interactive prompt. Returning `None` means no credentials can
/// be obtained.
pub trait CredentialSource: Send + Sync {
    fn credentials(&self) -> Option<Credentials>;
}

/// A source that never has credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialSource for NoCredentials {
    fn credentials(&self) -> Option<Credentials> {
        None
    }
}

impl CredentialSource for Credentials {
    fn credentials(&self) -> Option<Credentials> {
        Some(self.clone())
    }
}
