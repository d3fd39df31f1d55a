//! Validated identifier types.
//!
//! Both types check their format at construction, so a [`Did`] or
//! [`PdsUrl`] held by a session is always usable in a request.

mod did;
mod pds_url;

pub use did::Did;
pub use pds_url::{DEFAULT_PDS, PdsUrl};
