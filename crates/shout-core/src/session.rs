//! The authenticated session value.

use std::fmt;

use crate::error::InvalidInputError;
use crate::tokens::{AccessToken, RefreshToken};
use crate::types::Did;

/// An authenticated identity on the PDS.
///
/// A `Session` always holds both tokens; the token types reject empty values,
/// so a half-authenticated session cannot be built, stored or restored.
/// Tokens are replaced as a pair by [`Session::with_tokens`]; the DID never
/// changes for the lifetime of a session.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    did: Did,
    handle: String,
    access_token: AccessToken,
    refresh_token: RefreshToken,
}

impl Session {
    pub fn new(
        did: Did,
        handle: impl Into<String>,
        access_token: AccessToken,
        refresh_token: RefreshToken,
    ) -> Self {
        Self {
            did,
            handle: handle.into(),
            access_token,
            refresh_token,
        }
    }

    /// Rebuild a session from raw persisted parts.
    pub fn from_parts(
        did: &str,
        handle: &str,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<Self, InvalidInputError> {
        Ok(Self::new(
            Did::new(did)?,
            handle,
            AccessToken::new(access_token)?,
            RefreshToken::new(refresh_token)?,
        ))
    }

    /// Returns the DID that owns this session's repository.
    pub fn did(&self) -> &Did {
        &self.did
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    pub fn refresh_token(&self) -> &RefreshToken {
        &self.refresh_token
    }

    /// Returns a copy of this session with a fresh token pair.
    pub fn with_tokens(&self, access_token: AccessToken, refresh_token: RefreshToken) -> Self {
        Self {
            did: self.did.clone(),
            handle: self.handle.clone(),
            access_token,
            refresh_token,
        }
    }

    /// Replace the display handle, keeping identity and tokens.
    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = handle.into();
        self
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("did", &self.did)
            .field("handle", &self.handle)
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
