//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;

use shout_core::{AuthError, CredentialSource};

use crate::cli::GlobalArgs;
use crate::prompt::Prompt;
use crate::{context, output};

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Handle or DID to authenticate with (prompted if omitted)
    #[arg(long)]
    pub identifier: Option<String>,

    /// Account password or app password (prompted if omitted)
    #[arg(long, env = "SHOUT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

pub async fn run(args: LoginArgs, global: &GlobalArgs) -> Result<()> {
    let manager = context::manager(global)?;
    let credentials = Prompt::new(args.identifier, args.password)
        .credentials()
        .filter(|c| !c.is_incomplete())
        .ok_or(AuthError::MissingCredentials)?;

    output::status("Logging in...");

    let session = manager
        .authenticate(credentials)
        .await
        .context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    output::field("Handle", session.handle());
    output::field("DID", session.did().as_str());
    output::field("PDS", &global.pds);

    Ok(())
}
