//! The on-disk vault file.
//!
//! The file format belongs to the engine.  The session side only needs to
//! know whether the file exists and, before unlock, how to split it into
//! salt and ciphertext for display:
//!
//! ```text
//! <salt (base64)>:<nonce || ciphertext (base64)>
//! ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::errors::{PasslockError, Result};

/// Separator between the salt prefix and the ciphertext.
const DELIMITER: char = ':';

/// Read-only metadata shown before unlock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultInfo {
    pub salt: String,
    pub ciphertext_len: usize,
}

/// Handle to the encrypted vault file.
#[derive(Debug, Clone)]
pub struct VaultFile {
    path: PathBuf,
}

impl VaultFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Split the file into `(salt, ciphertext length)` without decrypting.
    pub fn info(&self) -> Result<VaultInfo> {
        let (salt, ciphertext) = self.read_raw()?;
        Ok(VaultInfo {
            salt,
            ciphertext_len: ciphertext.len(),
        })
    }

    /// Engine side: read and decode `(salt, nonce || ciphertext)`.
    pub fn read(&self) -> Result<(String, Vec<u8>)> {
        let (salt, encoded) = self.read_raw()?;
        let sealed = BASE64
            .decode(encoded.trim())
            .map_err(|e| PasslockError::InvalidVaultFormat(format!("ciphertext: {e}")))?;
        Ok((salt, sealed))
    }

    /// Engine side: replace the file with `salt:base64(sealed)`.
    pub fn write(&self, salt: &str, sealed: &[u8]) -> Result<()> {
        if salt.contains(DELIMITER) {
            return Err(PasslockError::InvalidVaultFormat(
                "salt must not contain ':'".into(),
            ));
        }
        let contents = format!("{salt}{DELIMITER}{}", BASE64.encode(sealed));
        write_private_atomic(&self.path, contents.as_bytes())
    }

    fn read_raw(&self) -> Result<(String, String)> {
        if !self.exists() {
            return Err(PasslockError::VaultMissing);
        }
        let data = fs::read_to_string(&self.path)?;
        let (salt, ciphertext) = data
            .split_once(DELIMITER)
            .ok_or_else(|| PasslockError::InvalidVaultFormat("missing salt delimiter".into()))?;
        if salt.is_empty() {
            return Err(PasslockError::InvalidVaultFormat("empty salt".into()));
        }
        Ok((salt.to_string(), ciphertext.to_string()))
    }
}

/// Hidden sibling used as the staging file for `path`.
pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new("."));
    parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ))
}

/// Write `bytes` to `path` atomically with owner-only permissions.
///
/// The data lands in `temp_path(path)` (mode 0600 on unix, created fresh)
/// which is then renamed over the target, so readers never see a
/// half-written file.  On any failure the staging file is removed.
pub(crate) fn write_private_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp_path = temp_path(path);

    // A leftover from a crashed write would make `create_new` fail.
    let _ = fs::remove_file(&tmp_path);

    let staged = stage(&tmp_path, bytes).and_then(|()| fs::rename(&tmp_path, path));
    if let Err(e) = staged {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}

fn stage(tmp_path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    #[cfg(unix)]
    let mut file = {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(0o600)
            .open(tmp_path)?
    };

    #[cfg(not(unix))]
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(tmp_path)?;

    file.write_all(bytes)?;
    file.sync_all()
}
