//! shout-file - Filesystem-backed session store.

mod store;

pub use store::{FileStore, SESSION_FILE};
