//! `passlock shell` — keep one session unlocked across many commands.
//!
//! Mutations (`add`, `delete`) only touch the in-memory vault until `save`.
//! `quit` refuses to leave with unsaved changes; `quit!` discards them.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{audit, copy_to_clipboard, unlock_session, Cli};
use crate::errors::{PasslockError, Result};
use crate::session::SessionManager;
use crate::vault::NewEntry;

const HELP: &str = "\
Commands:
  list                 list all entries
  tag <tag>            list entries with a tag
  search <text>        search name, username and url
  show <id>            show an entry (password masked)
  reveal <id>          show an entry with its password
  copy <id>            copy an entry's password to the clipboard
  add                  add an entry (prompts for fields)
  delete <id>          delete an entry
  save                 write changes to the vault
  generate [length]    print a random password
  strength             rate a password
  logout               lock the vault and leave
  quit | quit!         leave (quit! discards unsaved changes)";

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Empty,
    Help,
    List,
    Tag(String),
    Search(String),
    Show(String),
    Reveal(String),
    Copy(String),
    Add,
    Delete(String),
    Save,
    Generate(Option<i64>),
    Strength,
    Logout,
    Quit { force: bool },
    /// Recognised command with bad arguments, or an unknown command.
    Invalid(String),
}

/// Parse one input line.
pub fn parse_command(line: &str) -> ShellCommand {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let required = |usage: &str, build: fn(String) -> ShellCommand| {
        if rest.is_empty() {
            ShellCommand::Invalid(format!("usage: {usage}"))
        } else {
            build(rest.to_string())
        }
    };

    match word {
        "" => ShellCommand::Empty,
        "help" | "?" => ShellCommand::Help,
        "list" | "ls" => ShellCommand::List,
        "tag" => required("tag <tag>", ShellCommand::Tag),
        "search" | "find" => required("search <text>", ShellCommand::Search),
        "show" => required("show <id>", ShellCommand::Show),
        "reveal" => required("reveal <id>", ShellCommand::Reveal),
        "copy" => required("copy <id>", ShellCommand::Copy),
        "add" => ShellCommand::Add,
        "delete" | "rm" => required("delete <id>", ShellCommand::Delete),
        "save" => ShellCommand::Save,
        "generate" | "gen" if rest.is_empty() => ShellCommand::Generate(None),
        "generate" | "gen" => match rest.parse::<i64>() {
            Ok(n) => ShellCommand::Generate(Some(n)),
            Err(_) => ShellCommand::Invalid(format!("not a number: {rest}")),
        },
        "strength" => ShellCommand::Strength,
        "logout" | "lock" => ShellCommand::Logout,
        "quit" | "exit" => ShellCommand::Quit { force: false },
        "quit!" | "exit!" => ShellCommand::Quit { force: true },
        other => ShellCommand::Invalid(format!("unknown command '{other}', type `help`")),
    }
}

/// Execute the `shell` command on the real terminal.
pub fn execute(cli: &Cli) -> Result<()> {
    let (dir, session) = unlock_session(cli)?;
    output::success("Vault unlocked. Type `help` for commands.");

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut input = stdin.lock();
    run(&session, &dir, &mut input, interactive)
}

/// Drive an unlocked session from `input` until quit, logout or EOF.
///
/// Always leaves the session locked.
pub fn run<R: BufRead>(
    session: &SessionManager,
    dir: &Path,
    input: &mut R,
    interactive: bool,
) -> Result<()> {
    let mut console = LineSource { input, interactive };
    let mut dirty = false;

    loop {
        let Some(line) = console.line("passlock> ")? else {
            if dirty {
                output::warning("End of input: unsaved changes discarded.");
            }
            break;
        };

        match parse_command(&line) {
            ShellCommand::Empty => {}
            ShellCommand::Help => println!("{HELP}"),
            ShellCommand::List => report(session.list().map(|e| output::print_entries_table(&e))),
            ShellCommand::Tag(tag) => report(
                session
                    .filter_by_tag(&tag)
                    .map(|e| output::print_entries_table(&e)),
            ),
            ShellCommand::Search(query) => report(
                session
                    .search(&query)
                    .map(|e| output::print_entries_table(&e)),
            ),
            ShellCommand::Show(id) => report(session.get(&id).map(|e| output::print_entry(&e, false))),
            ShellCommand::Reveal(id) => report(session.get(&id).map(|e| output::print_entry(&e, true))),
            ShellCommand::Copy(id) => report(
                session
                    .get(&id)
                    .and_then(|e| copy_to_clipboard(&e.password))
                    .map(|()| output::success("Password copied to clipboard.")),
            ),
            ShellCommand::Add => match read_new_entry(&mut console)? {
                Some(fields) => match session.add(&fields) {
                    Ok(entry) => {
                        dirty = true;
                        audit(dir, "add", Some(&entry.id), None);
                        output::success(&format!("Added '{}' ({})", entry.name, entry.id));
                    }
                    Err(e) => output::error(&e.to_string()),
                },
                None => output::info("Cancelled."),
            },
            ShellCommand::Delete(id) => match session.delete(&id) {
                Ok(removed) => {
                    dirty = true;
                    audit(dir, "delete", Some(&id), None);
                    output::success(&format!("Deleted '{}' ({id})", removed.name));
                }
                Err(e) => output::error(&e.to_string()),
            },
            ShellCommand::Save => match session.save() {
                Ok(()) => {
                    dirty = false;
                    audit(dir, "save", None, None);
                    output::success("Vault saved.");
                }
                Err(e) => output::error(&e.to_string()),
            },
            ShellCommand::Generate(length) => println!("{}", session.generate_password(length)),
            ShellCommand::Strength => {
                if let Some(candidate) = console.secret("Password to rate")? {
                    output::print_strength(&session.score_strength(&candidate));
                }
            }
            ShellCommand::Logout | ShellCommand::Quit { force: false } if dirty => {
                output::warning("Unsaved changes. Run `save`, or `quit!` to discard them.");
            }
            ShellCommand::Logout | ShellCommand::Quit { .. } => break,
            ShellCommand::Invalid(msg) => output::error(&msg),
        }
    }

    session.logout();
    audit(dir, "logout", None, None);
    output::info("Vault locked.");
    Ok(())
}

fn report(result: Result<()>) {
    if let Err(e) = result {
        output::error(&e.to_string());
    }
}

/// Prompt for the fields of a new entry.  `None` if input ran out.
fn read_new_entry<R: BufRead>(console: &mut LineSource<'_, R>) -> Result<Option<NewEntry>> {
    let Some(name) = console.line("  name: ")? else {
        return Ok(None);
    };
    let Some(username) = console.line("  username: ")? else {
        return Ok(None);
    };
    let Some(mut password) = console.secret("  password (blank to generate)")? else {
        return Ok(None);
    };
    if password.is_empty() {
        password = Zeroizing::new(crate::password::generate(None));
        output::info(&format!("Generated password: {}", password.as_str()));
    }
    let url = console.line("  url (optional): ")?.unwrap_or_default();
    let notes = console.line("  notes (optional): ")?.unwrap_or_default();
    let tags = console
        .line("  tags (comma separated): ")?
        .unwrap_or_default();

    let mut fields = NewEntry::new(name.trim(), username.trim(), &password);
    if !url.trim().is_empty() {
        fields = fields.url(url.trim());
    }
    if !notes.trim().is_empty() {
        fields = fields.notes(notes.trim());
    }
    for tag in tags.split(',') {
        if !tag.trim().is_empty() {
            fields = fields.tag(tag);
        }
    }
    Ok(Some(fields))
}

/// Line-oriented input for the shell.  Secrets use a hidden prompt when
/// attached to a terminal and plain lines otherwise.
struct LineSource<'a, R> {
    input: &'a mut R,
    interactive: bool,
}

impl<R: BufRead> LineSource<'_, R> {
    fn line(&mut self, prompt: &str) -> Result<Option<String>> {
        if self.interactive {
            print!("{prompt}");
            io::stdout().flush()?;
        }

        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        let trimmed = buf.trim_end_matches(['\r', '\n']).to_string();
        zeroize::Zeroize::zeroize(&mut buf);
        Ok(Some(trimmed))
    }

    fn secret(&mut self, prompt: &str) -> Result<Option<Zeroizing<String>>> {
        if self.interactive {
            let value = dialoguer::Password::new()
                .with_prompt(prompt)
                .allow_empty_password(true)
                .interact()
                .map_err(|e| PasslockError::CommandFailed(format!("password prompt: {e}")))?;
            return Ok(Some(Zeroizing::new(value)));
        }
        Ok(self.line("")?.map(Zeroizing::new))
    }
}
