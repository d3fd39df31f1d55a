//! Posting with a single refresh-and-retry on token expiry.

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::error::{AuthError, ClientError, PostError};
use crate::manager::SessionManager;
use crate::post::{PostReceipt, PostRecord, PostText};
use crate::session::Session;
use crate::traits::{CredentialStore, SessionClient};

/// Most submissions a single [`Publisher::post`] makes: the first attempt
/// and one retry after a refresh.
const MAX_ATTEMPTS: usize = 2;

/// Publishes posts through a [`SessionManager`].
pub struct Publisher<'a, C, S> {
    manager: &'a SessionManager<C, S>,
}

impl<'a, C, S> Publisher<'a, C, S>
where
    C: SessionClient,
    S: CredentialStore,
{
    pub fn new(manager: &'a SessionManager<C, S>) -> Self {
        Self { manager }
    }

    /// Post `message` to the repository owned by `session`.
    ///
    /// The length check runs first and fails without touching the network.
    /// If the PDS rejects the access token as expired, the session is
    /// refreshed once and the same record is submitted once more; whatever
    /// that second submission returns is final.
    ///
    /// # Errors
    ///
    /// - [`PostError::TooLong`] if the text is over the limit.
    /// - [`PostError::AuthExpired`] if the token expired and refresh failed.
    /// - [`PostError::RemoteRejected`] for any other non-success response,
    ///   including an expiry rejection of the retried submission.
    /// - [`PostError::Transport`] if a submission did not complete.
    /// - [`PostError::Store`] if the refreshed session could not be saved.
    #[instrument(skip_all, fields(did = %session.did()))]
    pub async fn post(&self, message: &str, session: Session) -> Result<PostReceipt, PostError> {
        let text = PostText::new(message)?;
        let record = PostRecord::new(&text, Utc::now());
        let client = self.manager.client();

        let mut session = session;
        let mut attempt = 1;
        loop {
            debug!(attempt, chars = text.as_str().chars().count(), "Submitting post");

            let err = match client
                .create_record(session.did(), session.access_token(), &record)
                .await
            {
                Ok(receipt) => {
                    info!(uri = %receipt.uri, "Post created");
                    return Ok(receipt);
                }
                Err(err) => err,
            };

            if !err.is_expired_token() || attempt == MAX_ATTEMPTS {
                return Err(submission_error(err));
            }

            warn!("Access token rejected; refreshing session");
            session = self
                .manager
                .refresh_stale(&session)
                .await
                .map_err(refresh_error)?;
            attempt += 1;
        }
    }
}

fn submission_error(err: ClientError) -> PostError {
    match err {
        ClientError::Rejected(err) => PostError::RemoteRejected {
            status: err.status,
            body: err.body,
        },
        ClientError::Transport(err) => PostError::Transport(err),
    }
}

fn refresh_error(err: AuthError) -> PostError {
    match err {
        AuthError::Store(err) => PostError::Store(err),
        err => {
            debug!(error = %err, "Refresh could not recover the session");
            PostError::AuthExpired
        }
    }
}
