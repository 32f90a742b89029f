//! `passlock show` — print one entry, optionally copying its password.

use crate::cli::output;
use crate::cli::{copy_to_clipboard, unlock_session, Cli};
use crate::errors::Result;

/// Execute the `show` command.
pub fn execute(cli: &Cli, id: &str, reveal: bool, copy: bool) -> Result<()> {
    let (_dir, session) = unlock_session(cli)?;
    let entry = session.get(id)?;
    session.logout();

    output::print_entry(&entry, reveal);

    if copy {
        copy_to_clipboard(&entry.password)?;
        output::success("Password copied to clipboard.");
    }

    Ok(())
}
