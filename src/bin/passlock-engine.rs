//! `passlock-engine` — the reference vault engine.
//!
//! Invoked by the session with the session directory as its working
//! directory:
//!
//! ```text
//! passlock-engine create <password> [confirmation]
//! passlock-engine unlock <password>
//! passlock-engine sync   <password>
//! ```
//!
//! Arguments are strictly positional: there are no flags, so any string
//! is a valid password.  Exit status 0 means the action was carried out;
//! anything else is a failure with the reason on stderr.

use std::ffi::OsString;

use zeroize::Zeroize;

use passlock::config::Settings;
use passlock::engine::{EngineAction, EngineBackend};
use passlock::errors::{PasslockError, Result};

fn main() {
    passlock::cli::init_tracing();

    match run(std::env::args_os().skip(1)) {
        Ok(action) => println!("\u{2713} {}", done_message(action)),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn run(args: impl Iterator<Item = OsString>) -> Result<EngineAction> {
    let mut args = args
        .map(|a| {
            a.into_string().map_err(|_| {
                PasslockError::InvalidInput("arguments must be valid UTF-8".into())
            })
        })
        .collect::<Result<Vec<String>>>()?;

    let dir = std::env::current_dir()?;
    let settings = Settings::load(&dir)?;
    let backend = EngineBackend::from_settings(&dir, &settings);

    let outcome = backend.run_args(&args);
    args.zeroize();
    outcome
}

fn done_message(action: EngineAction) -> &'static str {
    match action {
        EngineAction::Create => "Vault created",
        EngineAction::Unlock => "Vault unlocked",
        EngineAction::Sync => "Vault synced",
    }
}
