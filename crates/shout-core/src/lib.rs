//! shout-core - session lifecycle and resilient posting for an AT Protocol PDS.
//!
//! A [`SessionManager`] owns the current [`Session`]: it reuses a stored one,
//! logs in when there is none, and refreshes on request. A [`Publisher`]
//! posts with that session and, when the PDS rejects the access token,
//! refreshes once and retries once.
//!
//! Network exchanges and persistence sit behind the [`SessionClient`] and
//! [`CredentialStore`] traits.
//!
//! ```no_run
//! use shout_core::{Credentials, MemoryStore, Publisher, SessionClient, SessionManager};
//!
//! # async fn example(client: impl SessionClient) -> Result<(), shout_core::Error> {
//! let manager = SessionManager::new(client, MemoryStore::new());
//! let login = Credentials::new("alice.bsky.social", "app-password");
//! let session = manager.ensure_session(&login).await?;
//!
//! let receipt = Publisher::new(&manager).post("hello", session).await?;
//! println!("{}", receipt.uri);
//! # Ok(())
//! # }
//! ```

pub mod credentials;
pub mod error;
pub mod manager;
pub mod memory;
pub mod post;
pub mod publisher;
pub mod session;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::Credentials;
pub use error::{AuthError, ClientError, Error, PostError, ProtocolError, StoreError};
pub use manager::SessionManager;
pub use memory::MemoryStore;
pub use post::{MAX_POST_CHARS, POST_COLLECTION, PostReceipt, PostRecord, PostText};
pub use publisher::Publisher;
pub use session::Session;
pub use tokens::{AccessToken, RefreshToken};
pub use traits::{
    CreatedSession, CredentialSource, CredentialStore, NoCredentials, RefreshedSession,
    SessionClient,
};
pub use types::{DEFAULT_PDS, Did, PdsUrl};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
