//! `passlock strength` — rate a password.  No vault needed.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::errors::{PasslockError, Result};
use crate::password;

/// Execute the `strength` command.
pub fn execute(candidate: Option<&str>) -> Result<()> {
    let candidate = if let Some(c) = candidate {
        output::warning("Password provided on command line, it may appear in shell history.");
        Zeroizing::new(c.to_string())
    } else if !io::stdin().is_terminal() {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = buf.trim_end().to_string();
        zeroize::Zeroize::zeroize(&mut buf);
        Zeroizing::new(trimmed)
    } else {
        Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt("Password to rate")
                .interact()
                .map_err(|e| PasslockError::CommandFailed(format!("password prompt: {e}")))?,
        )
    };

    output::print_strength(&password::score(&candidate));

    Ok(())
}
