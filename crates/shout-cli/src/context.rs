//! Wiring of the network client and session store from global options.

use std::time::Duration;

use anyhow::{Context, Result};

use shout_core::{PdsUrl, SessionManager};
use shout_file::FileStore;
use shout_xrpc::XrpcSessionClient;

use crate::cli::GlobalArgs;

pub type Manager = SessionManager<XrpcSessionClient, FileStore>;

/// Open the session store named by `--session-file`, or the per-user default.
pub fn store(global: &GlobalArgs) -> Result<FileStore> {
    match &global.session_file {
        Some(path) => Ok(FileStore::new(path)),
        None => FileStore::default_location().context("Failed to locate the session file"),
    }
}

/// Build a session manager for the configured PDS.
pub fn manager(global: &GlobalArgs) -> Result<Manager> {
    let pds = PdsUrl::new(&global.pds).context("Invalid PDS URL")?;
    let client = if global.timeout == 0 {
        XrpcSessionClient::new(pds)
    } else {
        XrpcSessionClient::with_timeout(pds, Duration::from_secs(global.timeout))
    }
    .context("Failed to create HTTP client")?;

    Ok(SessionManager::new(client, store(global)?))
}
