//! CLI module — Clap argument parser, output helpers, and command implementations.
//!
//! Each subcommand is a thin router over `SessionManager`: open the
//! session for `--dir`, unlock, do one thing, save if it mutated, log out.
//! `shell` keeps one session unlocked across many commands.

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::engine::client::MIN_PASSWORD_LEN;
use crate::errors::{PasslockError, Result};
use crate::session::SessionManager;

/// Environment variable consulted before prompting for the master password.
pub const PASSWORD_ENV_VAR: &str = "PASSLOCK_PASSWORD";

/// Environment variable holding the tracing filter (e.g. `passlock=debug`).
pub const LOG_ENV_VAR: &str = "PASSLOCK_LOG";

/// Install the stderr tracing subscriber used by both binaries.
///
/// Defaults to `warn` so normal command output stays clean.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Passlock CLI: local password vault.
#[derive(Parser)]
#[command(name = "passlock", about = "Local password vault", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the vault (default: current directory)
    #[arg(short, long, global = true)]
    pub dir: Option<PathBuf>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new vault
    Init,

    /// Show vault metadata without unlocking
    Info,

    /// List entries
    List {
        /// Only show entries with this tag
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Search entries by name, username, or url
    Search {
        /// Case-insensitive text to look for
        query: String,
    },

    /// Show one entry
    Show {
        /// Entry id
        id: String,
        /// Print the password in clear text
        #[arg(long)]
        reveal: bool,
        /// Copy the password to the clipboard
        #[arg(short, long)]
        copy: bool,
    },

    /// Add an entry
    Add {
        /// Display name (e.g. github)
        #[arg(short, long)]
        name: String,
        /// Account username
        #[arg(short, long)]
        username: String,
        /// Password (omit for prompt or piped stdin)
        #[arg(short, long, conflicts_with = "generate")]
        password: Option<String>,
        /// Generate a password of this length instead
        #[arg(short, long, num_args = 0..=1, default_missing_value = "16")]
        generate: Option<i64>,
        /// Site url
        #[arg(long)]
        url: Option<String>,
        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
        /// Tag (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Delete an entry
    Delete {
        /// Entry id
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Start an interactive session
    Shell,

    /// Generate a random password
    Generate {
        /// Length (clamped to 4..=64, default 16)
        #[arg(short, long, allow_negative_numbers = true)]
        length: Option<i64>,
    },

    /// Rate a password's strength
    Strength {
        /// Password to rate (omit for a hidden prompt)
        password: Option<String>,
    },

    /// View the audit log of vault operations
    Audit {
        /// Number of entries to show (default: 50)
        #[arg(long, default_value = "50")]
        last: usize,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// The session directory: `--dir` or the current directory.
pub fn session_dir(cli: &Cli) -> Result<PathBuf> {
    match &cli.dir {
        Some(dir) => Ok(dir.clone()),
        None => Ok(std::env::current_dir()?),
    }
}

/// Build a locked session for the CLI's directory.
pub fn open_session(cli: &Cli) -> Result<(PathBuf, SessionManager)> {
    let dir = session_dir(cli)?;
    let settings = Settings::load(&dir)?;
    let session = SessionManager::open_dir(&dir, &settings)?;
    Ok((dir, session))
}

/// Open the session and unlock it with the master password.
pub fn unlock_session(cli: &Cli) -> Result<(PathBuf, SessionManager)> {
    let (dir, session) = open_session(cli)?;
    if !session.check_exists() {
        return Err(PasslockError::VaultMissing);
    }

    let password = prompt_password()?;
    match session.unlock(&password) {
        Ok(()) => {
            audit(&dir, "unlock", None, None);
            Ok((dir, session))
        }
        Err(e) => {
            audit(&dir, "unlock", None, Some("failed"));
            Err(e)
        }
    }
}

/// Get the master password from `PASSLOCK_PASSWORD` or a hidden prompt.
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV_VAR) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Master password")
        .interact()
        .map_err(|e| PasslockError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new master password with confirmation (used by `init`).
///
/// Also respects `PASSLOCK_PASSWORD` for scripted usage.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV_VAR) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose master password")
            .with_confirmation(
                "Confirm master password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| PasslockError::CommandFailed(format!("password prompt: {e}")))?;

        if password.chars().count() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Record an audit event when the `audit-log` feature is enabled.
pub fn audit(dir: &Path, operation: &str, entry_id: Option<&str>, details: Option<&str>) {
    #[cfg(feature = "audit-log")]
    crate::audit::log_audit(dir, operation, entry_id, details);

    #[cfg(not(feature = "audit-log"))]
    let _ = (dir, operation, entry_id, details);
}

/// Put `text` on the system clipboard.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| PasslockError::ClipboardError(e.to_string()))?;
    clipboard
        .set_text(text.to_string())
        .map_err(|e| PasslockError::ClipboardError(e.to_string()))
}
