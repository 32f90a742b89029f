//! `passlock search` — case-insensitive match on name, username and url.

use crate::cli::output;
use crate::cli::{unlock_session, Cli};
use crate::errors::Result;

/// Execute the `search` command.
pub fn execute(cli: &Cli, query: &str) -> Result<()> {
    let (_dir, session) = unlock_session(cli)?;
    let entries = session.search(query)?;
    session.logout();

    output::info(&format!("{} match(es) for '{query}'", entries.len()));
    output::print_entries_table(&entries);

    Ok(())
}
