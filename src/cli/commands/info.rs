//! `passlock info` — show vault metadata without the master password.

use crate::cli::output;
use crate::cli::{open_session, Cli};
use crate::config::Settings;
use crate::errors::Result;

/// Execute the `info` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let (dir, session) = open_session(cli)?;
    let info = session.vault_info()?;

    let settings = Settings::load(&dir)?;
    output::print_vault_info(&settings.vault_path(&dir), &info);

    Ok(())
}
