//! Seams between the session core and its collaborators.

mod client;
mod store;

pub use client::{CreatedSession, RefreshedSession, SessionClient};
pub use store::{CredentialSource, CredentialStore, NoCredentials};
