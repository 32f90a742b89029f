//! `passlock list` — display entries in a table.

use crate::cli::output;
use crate::cli::{unlock_session, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli, tag: Option<&str>) -> Result<()> {
    let (_dir, session) = unlock_session(cli)?;

    let entries = match tag {
        Some(tag) => session.filter_by_tag(tag)?,
        None => session.list()?,
    };
    session.logout();

    match tag {
        Some(tag) => output::info(&format!("{} entry(ies) tagged '{tag}'", entries.len())),
        None => output::info(&format!("{} entry(ies)", entries.len())),
    }
    output::print_entries_table(&entries);

    Ok(())
}
