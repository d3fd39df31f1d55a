//! Interactive credential prompt.

use std::io::{self, BufRead, Write};

use shout_core::{CredentialSource, Credentials};
use tracing::debug;

/// Asks the terminal for whatever part of the credentials was not given.
///
/// The password is read without echo. When nothing can be read (stdin
/// closed, no terminal) no credentials are produced.
#[derive(Debug, Default)]
pub struct Prompt {
    identifier: Option<String>,
    password: Option<String>,
}

impl Prompt {
    pub fn new(identifier: Option<String>, password: Option<String>) -> Self {
        Self {
            identifier,
            password,
        }
    }

    fn identifier(&self) -> Option<String> {
        if let Some(identifier) = &self.identifier {
            return Some(identifier.clone());
        }

        eprint!("Handle: ");
        io::stderr().flush().ok()?;

        let mut input = String::new();
        let read = io::stdin().lock().read_line(&mut input).ok()?;
        if read == 0 {
            debug!("stdin closed before a handle was entered");
            return None;
        }
        Some(input.trim().to_string())
    }

    fn password(&self) -> Option<String> {
        if let Some(password) = &self.password {
            return Some(password.clone());
        }

        match rpassword::prompt_password("Password: ") {
            Ok(password) => Some(password),
            Err(err) => {
                debug!(error = %err, "could not read password");
                None
            }
        }
    }
}

impl CredentialSource for Prompt {
    fn credentials(&self) -> Option<Credentials> {
        let identifier = self.identifier()?;
        let password = self.password()?;
        Some(Credentials::new(identifier, password))
    }
}
