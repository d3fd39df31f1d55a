//! Login credentials type.

use std::fmt;

/// An identifier and secret used to mint a session.
///
/// The identifier is a handle or DID; a leading `@` is dropped so that
/// `@alice.bsky.social` and `alice.bsky.social` log in the same account.
/// The secret is an account password or app password. It is never shown in
/// `Debug` output and is never persisted.
///
/// ```
/// use shout_core::Credentials;
///
/// let creds = Credentials::new(" @alice.bsky.social ", "app-password");
/// assert_eq!(creds.identifier(), "alice.bsky.social");
/// ```
#[derive(Clone)]
pub struct Credentials {
    identifier: String,
    password: String,
}

impl Credentials {
    pub fn new(identifier: impl AsRef<str>, password: impl Into<String>) -> Self {
        Self {
            identifier: normalize_identifier(identifier.as_ref()),
            password: password.into(),
        }
    }

    /// Returns the normalized identifier (handle or DID).
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the secret. Use only to build the login request.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// True when either half is blank and a login attempt would be pointless.
    pub fn is_incomplete(&self) -> bool {
        self.identifier.is_empty() || self.password.is_empty()
    }
}

fn normalize_identifier(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_prefix('@').unwrap_or(trimmed).to_string()
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
