//! Decentralized Identifier (DID) type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::InvalidInputError;

/// The account identifier that owns a repository.
///
/// Sessions carry the DID returned by the PDS at login; posts are created in
/// the repository named by it.
///
/// ```
/// use shout_core::Did;
///
/// let did = Did::new("did:plc:z72i7hdynmk6r22z27h6tvur").unwrap();
/// assert_eq!(did.method(), "plc");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Did(String);

impl Did {
    /// Parse a DID of the form `did:<method>:<identifier>`.
    pub fn new(s: impl Into<String>) -> Result<Self, InvalidInputError> {
        let s = s.into();
        let (method, identifier) = s
            .strip_prefix("did:")
            .and_then(|rest| rest.split_once(':'))
            .ok_or_else(|| invalid(&s, "must have format 'did:<method>:<identifier>'"))?;

        if method.is_empty() || !method.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(invalid(&s, "method must be non-empty lowercase letters"));
        }
        if identifier.is_empty() {
            return Err(invalid(&s, "identifier must be non-empty"));
        }
        if identifier.chars().any(char::is_whitespace) {
            return Err(invalid(&s, "identifier must not contain whitespace"));
        }

        Ok(Self(s))
    }

    /// Returns the DID method (e.g. "plc" for "did:plc:...").
    pub fn method(&self) -> &str {
        self.0[4..].split(':').next().unwrap_or_default()
    }

    /// Returns the full DID string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn invalid(value: &str, reason: &str) -> InvalidInputError {
    InvalidInputError::Did {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Did {
    type Err = InvalidInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Did {
    type Error = InvalidInputError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Did> for String {
    fn from(did: Did) -> Self {
        did.0
    }
}
