use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::Argon2Params;
use crate::errors::{PasslockError, Result};

/// Environment variable that overrides the engine program.
pub const ENGINE_ENV_VAR: &str = "PASSLOCK_ENGINE";

/// File name of the reference engine binary, looked up next to the
/// running executable when nothing else is configured.
const ENGINE_BIN_NAME: &str = "passlock-engine";

/// Directory-level configuration, loaded from `.passlock.toml`.
///
/// Every field has a sensible default so Passlock works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// File name (relative to the session directory) of the encrypted vault.
    #[serde(default = "default_vault_file")]
    pub vault_file: String,

    /// File name (relative to the session directory) of the plaintext
    /// handoff state file shared with the engine.
    #[serde(default = "default_handoff_file")]
    pub handoff_file: String,

    /// Path to the engine program. Falls back to `passlock-engine` next
    /// to the current executable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_file() -> String {
    ".passlock.vault".to_string()
}

fn default_handoff_file() -> String {
    ".passlock.handoff".to_string()
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_file: default_vault_file(),
            handoff_file: default_handoff_file(),
            engine: None,
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the session directory.
    pub const FILE_NAME: &'static str = ".passlock.toml";

    /// Load settings from `<dir>/.passlock.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            PasslockError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Full path to the encrypted vault file, e.g. `dir/.passlock.vault`.
    pub fn vault_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.vault_file)
    }

    /// Full path to the handoff state file, e.g. `dir/.passlock.handoff`.
    pub fn handoff_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.handoff_file)
    }

    /// Resolve the engine program: `PASSLOCK_ENGINE`, then the `engine`
    /// setting, then `passlock-engine` beside the running executable.
    ///
    /// Relative paths are anchored at the invoking working directory,
    /// since the engine itself is spawned inside the session directory.
    pub fn engine_program(&self) -> Result<PathBuf> {
        if let Ok(program) = std::env::var(ENGINE_ENV_VAR) {
            if !program.is_empty() {
                return Ok(anchor_program(&program, &std::env::current_dir()?));
            }
        }

        if let Some(ref program) = self.engine {
            return Ok(anchor_program(program, &std::env::current_dir()?));
        }

        let exe = std::env::current_exe()?;
        let mut sibling = exe.with_file_name(ENGINE_BIN_NAME);
        if cfg!(windows) {
            sibling.set_extension("exe");
        }
        Ok(sibling)
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }
}

/// Make a relative program path absolute against `cwd`.
///
/// Bare names (`passlock-engine`) are left alone for a `PATH` lookup.
fn anchor_program(raw: &str, cwd: &Path) -> PathBuf {
    let path = Path::new(raw);
    if path.is_absolute() || path.components().count() == 1 {
        return path.to_path_buf();
    }
    std::fs::canonicalize(cwd.join(path)).unwrap_or_else(|_| cwd.join(path))
}

// ── Tests ────────────────────────────────────────────────────────────
