//! shout - post to Bluesky from the command line.
//!
//! A thin wrapper over `shout-core`: it wires the XRPC client and the file
//! store into a session manager and dispatches one command per invocation.

mod cli;
mod commands;
mod context;
mod output;
mod prompt;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use shout_core::{AuthError, PostError};

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.json_logs);

    match commands::handle(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(&format!("{:#}", err));
            if needs_login(&err) {
                output::hint("Run 'shout login' to sign in.");
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so command output on stdout stays parseable.
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

/// Whether the failure can only be fixed by signing in again.
fn needs_login(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(cause.downcast_ref::<PostError>(), Some(PostError::AuthExpired))
            || matches!(
                cause.downcast_ref::<AuthError>(),
                Some(
                    AuthError::MissingCredentials
                        | AuthError::NoSession
                        | AuthError::RefreshFailed { .. }
                )
            )
    })
}
