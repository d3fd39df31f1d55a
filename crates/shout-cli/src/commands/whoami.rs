//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use shout_core::{AuthError, CredentialStore};

use crate::cli::GlobalArgs;
use crate::{context, output};

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Print the session identity as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: WhoamiArgs, global: &GlobalArgs) -> Result<()> {
    let store = context::store(global)?;
    let session = store
        .load()
        .await
        .context("Failed to load session")?
        .ok_or(AuthError::NoSession)?;

    if args.json {
        output::json(&json!({
            "did": session.did().as_str(),
            "handle": session.handle(),
            "pds": global.pds,
        }))?;
    } else {
        output::field("Handle", session.handle());
        output::field("DID", session.did().as_str());
        output::field("PDS", &global.pds);
        output::field("Session file", &store.path().display().to_string());
    }

    Ok(())
}
