//! The reference vault engine.
//!
//! This is what `passlock-engine` runs.  It is the only code that ever
//! sees the master key: it derives it with Argon2id from the password and
//! the salt stored in the vault file, and seals the vault JSON with
//! AES-256-GCM.
//!
//! ```text
//! create  -> write an empty sealed vault with a fresh salt
//! unlock  -> open the sealed vault, write the handoff file
//! sync    -> check the password, seal the handoff file into the vault
//! ```

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::info;
use zeroize::Zeroize;

use crate::config::Settings;
use crate::crypto::encryption::{decrypt, encrypt};
use crate::crypto::kdf::{derive_master_key_with_params, generate_salt, Argon2Params};
use crate::errors::{PasslockError, Result};
use crate::handoff::HandoffStore;
use crate::vault::{Vault, VaultFile};

use super::{EngineAction, EngineRequest, EngineResponse, EngineTransport};

/// Command-line form accepted by `run_args`.
pub const USAGE: &str = "passlock-engine <create|unlock|sync> <password> [confirmation]";

/// Engine-side view of a session directory.
#[derive(Debug, Clone)]
pub struct EngineBackend {
    vault_file: VaultFile,
    handoff: HandoffStore,
    params: Argon2Params,
}

impl EngineBackend {
    pub fn new(vault_file: VaultFile, handoff: HandoffStore, params: Argon2Params) -> Self {
        Self {
            vault_file,
            handoff,
            params,
        }
    }

    /// Build a backend for `dir` using the paths and KDF params in `settings`.
    pub fn from_settings(dir: &std::path::Path, settings: &Settings) -> Self {
        Self::new(
            VaultFile::new(settings.vault_path(dir)),
            HandoffStore::new(settings.handoff_path(dir)),
            settings.argon2_params(),
        )
    }

    /// Dispatch one request.
    pub fn handle(&self, request: &EngineRequest<'_>) -> Result<()> {
        match *request {
            EngineRequest::Create {
                password,
                confirmation,
            } => self.create(password, Some(confirmation)),
            EngineRequest::Unlock { password } => self.unlock(password),
            EngineRequest::Sync { password } => self.sync(password),
        }
    }

    /// Run one `<action> <credential> [confirmation]` command line.
    ///
    /// Arguments are taken positionally and never read as flags, so a
    /// credential such as `--help` is just a credential.
    pub fn run_args<S: AsRef<str>>(&self, args: &[S]) -> Result<EngineAction> {
        let usage = || PasslockError::InvalidInput(format!("usage: {USAGE}"));
        let (action, rest) = args.split_first().ok_or_else(usage)?;
        let action: EngineAction = action.as_ref().parse()?;

        match (action, rest) {
            (EngineAction::Create, [password]) => self.create(password.as_ref(), None)?,
            (EngineAction::Create, [password, confirmation]) => {
                self.create(password.as_ref(), Some(confirmation.as_ref()))?
            }
            (EngineAction::Unlock, [password]) => self.unlock(password.as_ref())?,
            (EngineAction::Sync, [password]) => self.sync(password.as_ref())?,
            _ => return Err(usage()),
        }
        Ok(action)
    }

    /// Write a new, empty vault sealed under `password`.
    pub fn create(&self, password: &str, confirmation: Option<&str>) -> Result<()> {
        if self.vault_file.exists() {
            return Err(PasslockError::AlreadyExists);
        }
        if password.is_empty() {
            return Err(PasslockError::InvalidInput("password cannot be empty".into()));
        }
        if confirmation.is_some_and(|c| c != password) {
            return Err(PasslockError::InvalidInput("passwords do not match".into()));
        }

        let salt = BASE64.encode(generate_salt());
        let vault = Vault::new(salt.clone());
        self.seal(&vault, password, &salt)?;

        info!(path = %self.vault_file.path().display(), "engine created vault");
        Ok(())
    }

    /// Decrypt the vault and hand its contents over through the handoff file.
    pub fn unlock(&self, password: &str) -> Result<()> {
        let vault = self.open(password)?;
        self.handoff.write(&vault)?;
        info!(entries = vault.entries.len(), "engine unlocked vault");
        Ok(())
    }

    /// Seal the handoff file's contents back into the vault.
    ///
    /// The password must open the current vault, and the handoff salt must
    /// match the vault's: the session never regenerates the salt.
    pub fn sync(&self, password: &str) -> Result<()> {
        let current = self.open(password)?;
        let vault = self.handoff.read()?;
        if vault.salt != current.salt {
            return Err(PasslockError::InvalidVaultFormat(
                "handoff salt does not match the vault salt".into(),
            ));
        }

        self.seal(&vault, password, &current.salt)?;
        info!(entries = vault.entries.len(), "engine synced vault");
        Ok(())
    }

    fn open(&self, password: &str) -> Result<Vault> {
        let (salt, sealed) = self.vault_file.read()?;
        let mut key = self.derive_key(password, &salt)?;
        let plaintext = decrypt(&key, &sealed);
        key.zeroize();
        let mut plaintext = plaintext?;

        let vault = serde_json::from_slice::<Vault>(&plaintext)
            .map_err(|e| PasslockError::InvalidVaultFormat(format!("vault JSON: {e}")));
        plaintext.zeroize();
        let mut vault = vault?;

        // The header is the source of truth for the salt.
        vault.salt = salt;
        Ok(vault)
    }

    fn seal(&self, vault: &Vault, password: &str, salt: &str) -> Result<()> {
        let mut plaintext = serde_json::to_vec(vault)
            .map_err(|e| PasslockError::SerializationError(format!("vault: {e}")))?;
        let mut key = self.derive_key(password, salt)?;
        let sealed = encrypt(&key, &plaintext);
        key.zeroize();
        plaintext.zeroize();

        self.vault_file.write(salt, &sealed?)
    }

    fn derive_key(&self, password: &str, salt: &str) -> Result<[u8; 32]> {
        let salt_bytes = BASE64
            .decode(salt)
            .map_err(|e| PasslockError::InvalidVaultFormat(format!("salt: {e}")))?;
        derive_master_key_with_params(password.as_bytes(), &salt_bytes, &self.params)
    }
}

/// Runs an `EngineBackend` inside the current process.
///
/// Behaves like `ProcessTransport` talking to `passlock-engine`: any error
/// becomes a failed response carrying the error text.
#[derive(Debug, Clone)]
pub struct InProcessTransport {
    backend: EngineBackend,
}

impl InProcessTransport {
    pub fn new(backend: EngineBackend) -> Self {
        Self { backend }
    }
}

impl EngineTransport for InProcessTransport {
    fn invoke(&self, request: &EngineRequest<'_>) -> Result<EngineResponse> {
        Ok(match self.backend.handle(request) {
            Ok(()) => EngineResponse::ok(),
            Err(e) => EngineResponse::failed(format!("Error: {e}")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::NewEntry;
    use tempfile::TempDir;

    fn backend() -> (TempDir, EngineBackend) {
        let dir = TempDir::new().unwrap();
        let backend = EngineBackend::new(
            VaultFile::new(dir.path().join(".passlock.vault")),
            HandoffStore::new(dir.path().join(".passlock.handoff")),
            Argon2Params {
                memory_kib: 8_192,
                iterations: 1,
                parallelism: 1,
            },
        );
        (dir, backend)
    }

    #[test]
    fn create_then_unlock_writes_empty_handoff() {
        let (_dir, backend) = backend();
        backend.create("correct horse", Some("correct horse")).unwrap();
        assert!(backend.vault_file.exists());
        assert!(!backend.handoff.exists());

        backend.unlock("correct horse").unwrap();
        let vault = backend.handoff.read().unwrap();
        assert!(vault.entries.is_empty());
        assert_eq!(vault.salt, backend.vault_file.info().unwrap().salt);
    }

    #[test]
    fn create_twice_fails() {
        let (_dir, backend) = backend();
        backend.create("abcd", None).unwrap();
        assert!(matches!(
            backend.create("abcd", None),
            Err(PasslockError::AlreadyExists)
        ));
    }

    #[test]
    fn create_with_mismatched_confirmation_fails() {
        let (_dir, backend) = backend();
        assert!(backend.create("abcd", Some("abce")).is_err());
        assert!(!backend.vault_file.exists());
    }

    #[test]
    fn unlock_with_wrong_password_fails_without_handoff() {
        let (_dir, backend) = backend();
        backend.create("right", None).unwrap();
        assert!(matches!(
            backend.unlock("wrong"),
            Err(PasslockError::DecryptionFailed)
        ));
        assert!(!backend.handoff.exists());
    }

    #[test]
    fn sync_persists_handoff_contents() {
        let (_dir, backend) = backend();
        backend.create("pw12", None).unwrap();
        backend.unlock("pw12").unwrap();

        let mut vault = backend.handoff.read().unwrap();
        vault.insert(&NewEntry::new("gh", "bob", "pw1")).unwrap();
        backend.handoff.write(&vault).unwrap();
        backend.sync("pw12").unwrap();

        backend.handoff.scrub();
        backend.unlock("pw12").unwrap();
        let reopened = backend.handoff.read().unwrap();
        assert_eq!(reopened.entries.len(), 1);
        assert_eq!(reopened.entries[0].name, "gh");
    }

    #[test]
    fn sync_with_wrong_password_leaves_vault_untouched() {
        let (_dir, backend) = backend();
        backend.create("pw12", None).unwrap();
        backend.unlock("pw12").unwrap();
        let before = std::fs::read(backend.vault_file.path()).unwrap();

        assert!(backend.sync("nope").is_err());
        assert_eq!(std::fs::read(backend.vault_file.path()).unwrap(), before);
    }

    #[test]
    fn sync_rejects_foreign_salt() {
        let (_dir, backend) = backend();
        backend.create("pw12", None).unwrap();
        backend.handoff.write(&Vault::new("b3RoZXI=".into())).unwrap();
        assert!(matches!(
            backend.sync("pw12"),
            Err(PasslockError::InvalidVaultFormat(_))
        ));
    }

    #[test]
    fn sync_without_handoff_is_unavailable() {
        let (_dir, backend) = backend();
        backend.create("pw12", None).unwrap();
        assert!(matches!(
            backend.sync("pw12"),
            Err(PasslockError::HandoffUnavailable)
        ));
    }

    #[test]
    fn in_process_transport_reports_failure_text() {
        let (_dir, backend) = backend();
        let transport = InProcessTransport::new(backend);
        let response = transport
            .invoke(&EngineRequest::Unlock { password: "x" })
            .unwrap();
        assert!(!response.success);
        assert!(response.diagnostic.starts_with("Error:"));
    }

    #[test]
    fn run_args_treats_flag_like_credentials_as_passwords() {
        for password in ["--help", "--version", "-hello", "--"] {
            let (_dir, backend) = backend();
            assert_eq!(
                backend.run_args(&["create", password, password]).unwrap(),
                EngineAction::Create
            );
            backend.run_args(&["unlock", password]).unwrap();
            backend.run_args(&["sync", password]).unwrap();
            assert!(backend.vault_file.exists());
        }
    }

    #[test]
    fn run_args_rejects_malformed_command_lines() {
        let (_dir, backend) = backend();
        let no_args: [&str; 0] = [];
        assert!(backend.run_args(&no_args).is_err());
        assert!(backend.run_args(&["destroy", "pw12"]).is_err());
        assert!(backend.run_args(&["unlock"]).is_err());
        assert!(backend.run_args(&["unlock", "a", "b"]).is_err());
        assert!(!backend.vault_file.exists());
    }
}
