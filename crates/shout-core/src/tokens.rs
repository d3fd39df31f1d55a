//! Bearer token types.

use std::fmt;

use crate::error::InvalidInputError;

macro_rules! bearer_token {
    ($(#[$doc:meta])* $name:ident, $kind:literal) => {
        $(#[$doc])*
        ///
        /// The value is opaque and never shown in `Debug` output.
        #[derive(Clone, PartialEq, Eq)]
        pub struct $name(String);

        impl $name {
            /// Wrap a token value, rejecting empty or whitespace-only input.
            pub fn new(token: impl Into<String>) -> Result<Self, InvalidInputError> {
                let token = token.into();
                if token.trim().is_empty() {
                    return Err(InvalidInputError::Token {
                        kind: $kind,
                        reason: "must not be empty".to_string(),
                    });
                }
                Ok(Self(token))
            }

            /// Returns the token value for use in an `Authorization` header
            /// or for persistence. Never log it.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&"[REDACTED]").finish()
            }
        }
    };
}

bearer_token!(
    /// Short-lived token authorizing ordinary requests.
    AccessToken,
    "access token"
);

bearer_token!(
    /// Longer-lived token used only to mint a new token pair.
    RefreshToken,
    "refresh token"
);
