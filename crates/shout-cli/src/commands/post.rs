//! Post command implementation.

use anyhow::{Context, Result};
use clap::Args;

use shout_core::{PostText, Publisher};

use crate::cli::GlobalArgs;
use crate::prompt::Prompt;
use crate::{context, output};

#[derive(Args, Debug)]
pub struct PostArgs {
    /// Text to publish (at most 300 characters)
    pub message: String,

    /// Print the receipt as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: PostArgs, global: &GlobalArgs) -> Result<()> {
    // Reject over-long text before prompting or loading a session.
    PostText::new(args.message.as_str()).context("Failed to post")?;

    let manager = context::manager(global)?;
    let session = manager
        .ensure_session(&Prompt::default())
        .await
        .context("No usable session")?;

    let receipt = Publisher::new(&manager)
        .post(&args.message, session)
        .await
        .context("Failed to post")?;

    if args.json {
        output::json(&receipt)?;
    } else {
        output::success("Posted");
        output::field("URI", &receipt.uri);
        output::field("CID", &receipt.cid);
    }

    Ok(())
}
