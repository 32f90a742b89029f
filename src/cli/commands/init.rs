//! `passlock init` — create a new vault in the session directory.

use crate::cli::output;
use crate::cli::{audit, open_session, prompt_new_password, Cli};
use crate::errors::{PasslockError, Result};
use crate::password;

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let (dir, session) = open_session(cli)?;

    if session.check_exists() {
        output::tip("Use `passlock add` to store entries in the existing vault.");
        return Err(PasslockError::AlreadyExists);
    }

    let password = prompt_new_password()?;

    let report = password::score(&password);
    if report.score <= 2 {
        output::warning(&format!(
            "Master password is {}, consider a longer one.",
            report.strength
        ));
    }

    session.create_vault(&password, &password)?;
    audit(&dir, "init", None, None);

    output::success(&format!("Vault created in {}", dir.display()));
    output::tip("Add your first entry: passlock add --name <NAME> --username <USER>");

    Ok(())
}
