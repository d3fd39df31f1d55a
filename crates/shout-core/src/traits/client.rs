//! Network exchange trait.

use async_trait::async_trait;

use crate::credentials::Credentials;
use crate::error::ClientError;
use crate::post::{PostReceipt, PostRecord};
use crate::tokens::{AccessToken, RefreshToken};
use crate::types::Did;

/// A successful login exchange.
#[derive(Debug, Clone)]
pub struct CreatedSession {
    pub did: Did,
    /// Handle declared by the PDS, if it returned one.
    pub handle: Option<String>,
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
}

/// A successful refresh exchange.
#[derive(Debug, Clone)]
pub struct RefreshedSession {
    /// DID the PDS says the tokens belong to, if it returned one.
    pub did: Option<Did>,
    pub handle: Option<String>,
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
}

/// The three request/response exchanges the session core needs.
///
/// Implementations hold no session state and never retry: every call is a
/// single request that either succeeds or reports the status and body it got.
#[async_trait]
pub trait SessionClient: Send + Sync {
    /// Exchange an identifier and secret for a new session.
    async fn create_session(
        &self,
        credentials: &Credentials,
    ) -> Result<CreatedSession, ClientError>;

    /// Exchange a refresh token for a new token pair.
    async fn refresh_session(
        &self,
        refresh_token: &RefreshToken,
    ) -> Result<RefreshedSession, ClientError>;

    /// Create a post record in the repository owned by `repo`.
    async fn create_record(
        &self,
        repo: &Did,
        token: &AccessToken,
        record: &PostRecord,
    ) -> Result<PostReceipt, ClientError>;
}
