//! Handoff store — the plaintext state file shared with the vault engine.
//!
//! The engine writes it after a successful unlock and reads it on sync;
//! the session writes it after every mutation and before every save.
//! It holds the whole vault in clear text, so it is always written
//! owner-only and scrubbed (zero-filled, then removed) as soon as the
//! session no longer needs it.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use zeroize::Zeroize;

use crate::errors::{PasslockError, Result};
use crate::vault::file::{temp_path, write_private_atomic};
use crate::vault::Vault;

/// Handle to the handoff state file.
#[derive(Debug, Clone)]
pub struct HandoffStore {
    path: PathBuf,
}

impl HandoffStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Serialize `vault` and replace the file atomically (mode 0600).
    pub fn write(&self, vault: &Vault) -> Result<()> {
        let mut json = serde_json::to_vec(vault)
            .map_err(|e| PasslockError::SerializationError(format!("handoff: {e}")))?;
        let written = write_private_atomic(&self.path, &json);
        json.zeroize();
        written?;

        debug!(
            path = %self.path.display(),
            entries = vault.entries.len(),
            "handoff state written"
        );
        Ok(())
    }

    /// Parse the file back into a `Vault`.
    ///
    /// `HandoffUnavailable` if the file is absent, `HandoffCorrupt` if it
    /// does not hold a valid vault.
    pub fn read(&self) -> Result<Vault> {
        let mut bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PasslockError::HandoffUnavailable);
            }
            Err(e) => return Err(e.into()),
        };

        let parsed = serde_json::from_slice::<Vault>(&bytes)
            .map_err(|e| PasslockError::HandoffCorrupt(e.to_string()));
        bytes.zeroize();
        parsed
    }

    /// Best-effort secure removal: overwrite with zeros, then delete.
    ///
    /// Also clears a staging file left by an interrupted write.  Never
    /// fails; a missing file is a no-op.
    pub fn scrub(&self) {
        scrub_file(&self.path);
        scrub_file(&temp_path(&self.path));
    }
}

fn scrub_file(path: &Path) {
    let Ok(metadata) = fs::metadata(path) else {
        return;
    };

    let len = usize::try_from(metadata.len()).unwrap_or(0);
    if len > 0 {
        if let Ok(mut file) = fs::OpenOptions::new().write(true).open(path) {
            let zeros = vec![0u8; len];
            let _ = file.write_all(&zeros);
            let _ = file.sync_all();
        }
    }

    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "handoff state scrubbed"),
        Err(e) => warn!(path = %path.display(), error = %e, "could not remove handoff state"),
    }
}
