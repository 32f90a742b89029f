//! `passlock add` — store a new entry and persist the vault.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{audit, unlock_session, Cli};
use crate::errors::{PasslockError, Result};
use crate::password;
use crate::vault::NewEntry;

/// Fields collected from the command line.
pub struct AddArgs<'a> {
    pub name: &'a str,
    pub username: &'a str,
    pub password: Option<&'a str>,
    pub generate: Option<i64>,
    pub url: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub tags: &'a [String],
}

/// Execute the `add` command.
pub fn execute(cli: &Cli, args: &AddArgs<'_>) -> Result<()> {
    // The entry password comes from one of four sources.
    let (entry_password, generated) = if let Some(length) = args.generate {
        (Zeroizing::new(password::generate(Some(length))), true)
    } else if let Some(p) = args.password {
        output::warning("Password provided on command line, it may appear in shell history.");
        (Zeroizing::new(p.to_string()), false)
    } else if !io::stdin().is_terminal() {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = buf.trim_end().to_string();
        zeroize::Zeroize::zeroize(&mut buf);
        (Zeroizing::new(trimmed), false)
    } else {
        let p = dialoguer::Password::new()
            .with_prompt(format!("Password for {}", args.name))
            .interact()
            .map_err(|e| PasslockError::CommandFailed(format!("password prompt: {e}")))?;
        (Zeroizing::new(p), false)
    };

    let mut fields = NewEntry::new(args.name, args.username, &entry_password);
    if let Some(url) = args.url {
        fields = fields.url(url);
    }
    if let Some(notes) = args.notes {
        fields = fields.notes(notes);
    }
    for tag in args.tags {
        fields = fields.tag(tag);
    }

    let (dir, session) = unlock_session(cli)?;
    let entry = session.add(&fields)?;
    session.save()?;
    session.logout();

    audit(&dir, "add", Some(&entry.id), None);
    output::success(&format!("Added '{}' ({})", entry.name, entry.id));

    if generated {
        output::info(&format!("Generated password: {}", entry.password));
    } else {
        let report = password::score(&entry_password);
        if report.score <= 2 {
            output::warning(&format!("This password is {}.", report.strength));
        }
    }

    Ok(())
}
