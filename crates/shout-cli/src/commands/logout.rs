//! Logout command implementation.

use anyhow::{Context, Result};
use clap::Args;

use shout_core::CredentialStore;

use crate::cli::GlobalArgs;
use crate::{context, output};

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(_args: LogoutArgs, global: &GlobalArgs) -> Result<()> {
    let store = context::store(global)?;
    store.clear().await.context("Failed to remove session")?;

    output::success("Logged out");
    Ok(())
}
