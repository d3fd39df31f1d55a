//! shout-xrpc - XRPC-backed session client.
//!
//! Implements [`shout_core::SessionClient`] over HTTPS against a PDS using
//! the `com.atproto.server.*` and `com.atproto.repo.*` procedures.

mod client;
mod xrpc;

pub use client::XrpcSessionClient;
