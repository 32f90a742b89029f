//! `passlock delete` — remove an entry and persist the vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{audit, unlock_session, Cli};
use crate::errors::{PasslockError, Result};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, id: &str, force: bool) -> Result<()> {
    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete entry '{id}'?"))
            .default(false)
            .interact()
            .map_err(|e| PasslockError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let (dir, session) = unlock_session(cli)?;
    let removed = session.delete(id)?;
    session.save()?;
    session.logout();

    audit(&dir, "delete", Some(id), None);
    output::success(&format!("Deleted '{}' ({id})", removed.name));

    Ok(())
}
