//! Error types for shout.
//!
//! Each component reports its own failure type: [`ClientError`] for the
//! network exchanges, [`StoreError`] for session persistence, [`AuthError`]
//! for the session lifecycle and [`PostError`] for publishing. [`Error`] is
//! the union used by callers that do not care which layer failed.

use std::fmt;
use thiserror::Error;

/// The unified error type for shout operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Session lifecycle errors (login, refresh).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Publishing errors.
    #[error("post failed: {0}")]
    Post(#[from] PostError),

    /// Non-success responses from the PDS.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Session store errors.
    #[error("session store error: {0}")]
    Store(#[from] StoreError),

    /// Input validation errors (invalid DID, PDS URL, token).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// A success response whose body could not be understood.
    #[error("invalid response: {message}")]
    Decode { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// A non-success response from the PDS.
#[derive(Debug, Clone)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body, kept for diagnostics.
    pub body: String,
    /// XRPC error code (if the body carried one).
    pub error: Option<String>,
    /// Error message from the server.
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref error) = self.error {
            write!(f, " [{}]", error)?;
        }
        match self.message {
            Some(ref message) => write!(f, ": {}", message),
            None if !self.body.is_empty() => write!(f, ": {}", self.body),
            None => Ok(()),
        }
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(
        status: u16,
        body: impl Into<String>,
        error: Option<String>,
        message: Option<String>,
    ) -> Self {
        Self {
            status,
            body: body.into(),
            error,
            message,
        }
    }

    /// Check if the PDS rejected the bearer token as expired.
    ///
    /// A 401 always counts. Some PDS implementations answer an expired
    /// access token with 400 and the `ExpiredToken` code instead.
    pub fn is_expired_token(&self) -> bool {
        self.status == 401 || self.error.as_deref() == Some("ExpiredToken")
    }
}

/// Failure of a single [`SessionClient`](crate::SessionClient) exchange.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The PDS answered with a non-success status.
    #[error(transparent)]
    Rejected(#[from] ProtocolError),

    /// The exchange did not complete.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ClientError {
    /// Check if this is an expired-token rejection.
    pub fn is_expired_token(&self) -> bool {
        matches!(self, ClientError::Rejected(err) if err.is_expired_token())
    }
}

impl From<ClientError> for Error {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Rejected(err) => Error::Protocol(err),
            ClientError::Transport(err) => Error::Transport(err),
        }
    }
}

/// Session store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing storage failed.
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    /// The stored record exists but does not describe a valid session.
    #[error("corrupt session record: {reason}")]
    Corrupt { reason: String },

    /// No storage location could be determined.
    #[error("session storage unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Session lifecycle errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No session is stored and no credentials could be obtained.
    #[error("no credentials available")]
    MissingCredentials,

    /// The PDS rejected the login exchange.
    #[error("login rejected with HTTP {status}: {body}")]
    RemoteRejected { status: u16, body: String },

    /// The PDS accepted the login but returned an unusable session.
    #[error("login returned an invalid session: {reason}")]
    InvalidSession { reason: String },

    /// The refresh exchange failed; a fresh login is required.
    #[error("session refresh failed: {reason}")]
    RefreshFailed { reason: String },

    /// There is no session to refresh.
    #[error("no active session")]
    NoSession,

    /// The login exchange did not complete.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The session could not be loaded or persisted.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Publishing errors.
#[derive(Debug, Error)]
pub enum PostError {
    /// The text exceeds the post length limit. Nothing was sent.
    #[error("post is {excess} character(s) over the limit")]
    TooLong { excess: usize },

    /// The access token was rejected and the session could not be refreshed.
    #[error("session expired and could not be refreshed; log in again")]
    AuthExpired,

    /// The PDS rejected the post.
    #[error("post rejected with HTTP {status}: {body}")]
    RemoteRejected { status: u16, body: String },

    /// The submission did not complete.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The refreshed session could not be persisted.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid DID format.
    #[error("invalid DID '{value}': {reason}")]
    Did { value: String, reason: String },

    /// Invalid PDS URL format.
    #[error("invalid PDS URL '{value}': {reason}")]
    PdsUrl { value: String, reason: String },

    /// Missing or malformed token.
    #[error("invalid {kind}: {reason}")]
    Token { kind: &'static str, reason: String },
}
