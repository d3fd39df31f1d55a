//! PDS URL type.

use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::InvalidInputError;

/// The PDS used when none is configured.
pub const DEFAULT_PDS: &str = "https://bsky.social";

/// A validated PDS (Personal Data Server) base URL.
///
/// Must use HTTPS; plain HTTP is accepted only for loopback hosts so that a
/// local test server can stand in for the real PDS.
///
/// ```
/// use shout_core::PdsUrl;
///
/// let pds = PdsUrl::new("https://bsky.social/").unwrap();
/// assert_eq!(pds.xrpc_url("com.atproto.server.createSession"),
///            "https://bsky.social/xrpc/com.atproto.server.createSession");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PdsUrl(Url);

impl PdsUrl {
    /// Parse and validate a PDS URL.
    pub fn new(s: impl AsRef<str>) -> Result<Self, InvalidInputError> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| invalid(s, &e.to_string()))?;

        if url.cannot_be_a_base() {
            return Err(invalid(s, "must be an absolute URL"));
        }

        let Some(host) = url.host_str() else {
            return Err(invalid(s, "must have a host"));
        };
        let loopback = matches!(host, "localhost" | "127.0.0.1" | "[::1]");

        match url.scheme() {
            "https" => {}
            "http" if loopback => {}
            _ => return Err(invalid(s, "must use HTTPS (HTTP allowed only for localhost)")),
        }

        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid(s, "must not carry a query or fragment"));
        }

        Ok(Self(url))
    }

    /// Returns the XRPC endpoint URL for a given method.
    pub fn xrpc_url(&self, method: &str) -> String {
        let base = self.0.as_str().trim_end_matches('/');
        format!("{}/xrpc/{}", base, method)
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }
}

impl Default for PdsUrl {
    fn default() -> Self {
        Self(Url::parse(DEFAULT_PDS).expect("default PDS URL is valid"))
    }
}

fn invalid(value: &str, reason: &str) -> InvalidInputError {
    InvalidInputError::PdsUrl {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

impl fmt::Display for PdsUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PdsUrl {
    type Err = InvalidInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
