//! Session lifecycle: reuse, login and refresh.

use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::credentials::Credentials;
use crate::error::{AuthError, ClientError};
use crate::session::Session;
use crate::traits::{CredentialSource, CredentialStore, SessionClient};

/// Owns the current session and keeps the store in step with it.
///
/// The session is held behind a single async mutex that stays locked for the
/// whole exchange-then-persist sequence of a login or refresh. A refresh
/// therefore never interleaves with another one: the PDS invalidates the old
/// refresh token on every refresh, and two racing refreshes would leave one
/// caller holding a dead token.
///
/// Expiry is never predicted. A session is considered expired only after the
/// PDS rejects its access token; see [`Publisher`](crate::Publisher).
pub struct SessionManager<C, S> {
    client: C,
    store: S,
    session: Mutex<Option<Session>>,
}

impl<C, S> SessionManager<C, S>
where
    C: SessionClient,
    S: CredentialStore,
{
    pub fn new(client: C, store: S) -> Self {
        Self {
            client,
            store,
            session: Mutex::new(None),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The session currently held in memory, if any.
    pub async fn current(&self) -> Option<Session> {
        self.session.lock().await.clone()
    }

    /// Return a usable session, logging in only if none is known.
    ///
    /// A session already in memory or in the store is returned without any
    /// network I/O. Otherwise `source` is asked for credentials and a login is
    /// performed.
    ///
    /// # Errors
    ///
    /// [`AuthError::MissingCredentials`] when nothing is stored and `source`
    /// has nothing to offer, or any error from [`Self::authenticate`].
    #[instrument(skip_all)]
    pub async fn ensure_session(
        &self,
        source: &dyn CredentialSource,
    ) -> Result<Session, AuthError> {
        let mut slot = self.session.lock().await;

        if let Some(session) = slot.as_ref() {
            return Ok(session.clone());
        }

        if let Some(stored) = self.store.load().await? {
            debug!(did = %stored.did(), "Using stored session");
            *slot = Some(stored.clone());
            return Ok(stored);
        }

        info!("No stored session; credentials required");
        let credentials = source
            .credentials()
            .filter(|c| !c.is_incomplete())
            .ok_or(AuthError::MissingCredentials)?;

        self.authenticate_locked(&mut slot, credentials).await
    }

    /// Log in with `credentials`, replacing any existing session.
    ///
    /// The handle of the new session is the one declared by the PDS; the
    /// identifier is used only when the PDS does not return one. The session
    /// is persisted before it is adopted. On any failure the stored session is
    /// left as it was.
    ///
    /// # Errors
    ///
    /// [`AuthError::RemoteRejected`] with the status and body of a non-success
    /// response, [`AuthError::Transport`] if the exchange did not complete, or
    /// [`AuthError::Store`] if the new session could not be persisted.
    pub async fn authenticate(&self, credentials: Credentials) -> Result<Session, AuthError> {
        let mut slot = self.session.lock().await;
        self.authenticate_locked(&mut slot, credentials).await
    }

    #[instrument(skip_all, fields(identifier = %credentials.identifier()))]
    async fn authenticate_locked(
        &self,
        slot: &mut Option<Session>,
        credentials: Credentials,
    ) -> Result<Session, AuthError> {
        info!("Creating new session");

        let created = self
            .client
            .create_session(&credentials)
            .await
            .map_err(|err| match err {
                ClientError::Rejected(err) => AuthError::RemoteRejected {
                    status: err.status,
                    body: err.body,
                },
                ClientError::Transport(err) => AuthError::Transport(err),
            })?;

        let handle = created
            .handle
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| credentials.identifier().to_string());
        drop(credentials);

        if handle.is_empty() {
            return Err(AuthError::InvalidSession {
                reason: "no handle declared and no identifier given".to_string(),
            });
        }

        let session = Session::new(
            created.did,
            handle,
            created.access_token,
            created.refresh_token,
        );

        self.store.save(&session).await?;
        *slot = Some(session.clone());

        info!(did = %session.did(), handle = session.handle(), "Session created");
        Ok(session)
    }

    /// Refresh the current session unconditionally.
    ///
    /// Uses the in-memory session, or the stored one if nothing is in memory.
    ///
    /// # Errors
    ///
    /// [`AuthError::NoSession`] if there is nothing to refresh,
    /// [`AuthError::RefreshFailed`] if the exchange fails for any reason, or
    /// [`AuthError::Store`] if the store cannot be read or written.
    pub async fn refresh(&self) -> Result<Session, AuthError> {
        let mut slot = self.session.lock().await;
        if slot.is_none() {
            *slot = self.store.load().await?;
        }
        self.refresh_locked(&mut slot).await
    }

    /// Refresh on behalf of a caller whose access token was just rejected.
    ///
    /// If another caller already replaced `stale`'s tokens while this one was
    /// waiting for the lock, the newer session is returned and no exchange is
    /// made. Concurrent callers holding the same stale session thus cause at
    /// most one refresh.
    pub async fn refresh_stale(&self, stale: &Session) -> Result<Session, AuthError> {
        let mut slot = self.session.lock().await;

        if let Some(current) = slot.as_ref() {
            if current.access_token() != stale.access_token() {
                debug!(did = %current.did(), "Session already refreshed by another caller");
                return Ok(current.clone());
            }
        } else {
            *slot = Some(stale.clone());
        }

        self.refresh_locked(&mut slot).await
    }

    #[instrument(skip_all)]
    async fn refresh_locked(&self, slot: &mut Option<Session>) -> Result<Session, AuthError> {
        let current = slot.as_ref().ok_or(AuthError::NoSession)?;
        info!(did = %current.did(), "Refreshing session");

        let refreshed = self
            .client
            .refresh_session(current.refresh_token())
            .await
            .map_err(|err| {
                warn!(error = %err, "Refresh exchange failed");
                AuthError::RefreshFailed {
                    reason: err.to_string(),
                }
            })?;

        if let Some(did) = &refreshed.did
            && did != current.did()
        {
            return Err(AuthError::RefreshFailed {
                reason: format!("PDS returned tokens for {}, expected {}", did, current.did()),
            });
        }

        let mut updated = current.with_tokens(refreshed.access_token, refreshed.refresh_token);
        if let Some(handle) = refreshed.handle.filter(|h| !h.trim().is_empty()) {
            updated = updated.with_handle(handle);
        }

        // The previous refresh token is already spent server-side, so memory
        // takes the new pair even if persisting it fails below.
        *slot = Some(updated.clone());
        self.store.save(&updated).await?;

        debug!("Session refreshed");
        Ok(updated)
    }
}

impl<C, S> std::fmt::Debug for SessionManager<C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager").finish_non_exhaustive()
    }
}
