//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands::{login, logout, post, refresh, whoami};

/// Post to Bluesky from the command line.
#[derive(Parser, Debug)]
#[command(name = "shout")]
#[command(author, version = env!("SHOUT_VERSION"), about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// PDS base URL
    #[arg(long, env = "SHOUT_PDS", default_value = shout_core::DEFAULT_PDS, global = true)]
    pub pds: String,

    /// Session file location (defaults to the user config directory)
    #[arg(long, env = "SHOUT_SESSION_FILE", global = true)]
    pub session_file: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30, global = true)]
    pub timeout: u64,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and store a new session
    Login(login::LoginArgs),

    /// Publish a post
    Post(post::PostArgs),

    /// Exchange the stored refresh token for new tokens
    Refresh(refresh::RefreshArgs),

    /// Display the stored session
    Whoami(whoami::WhoamiArgs),

    /// Delete the stored session
    Logout(logout::LogoutArgs),
}
