//! `EngineClient` — the adapter between the session and the engine.

use tracing::{debug, info};

use crate::errors::{PasslockError, Result};
use crate::vault::VaultFile;

use super::{EngineRequest, EngineResponse, EngineTransport};

/// Shortest master password `create` accepts.
pub const MIN_PASSWORD_LEN: usize = 4;

/// Synchronous client for the external vault engine.
pub struct EngineClient {
    transport: Box<dyn EngineTransport>,
    vault_file: VaultFile,
}

impl EngineClient {
    pub fn new(transport: Box<dyn EngineTransport>, vault_file: VaultFile) -> Self {
        Self {
            transport,
            vault_file,
        }
    }

    /// The vault file the engine reads and writes.
    pub fn vault_file(&self) -> &VaultFile {
        &self.vault_file
    }

    /// Ask the engine to create a brand-new vault.
    ///
    /// Validated locally first, so a bad request never spawns the engine.
    pub fn create(&self, password: &str, confirmation: &str) -> Result<()> {
        if self.vault_file.exists() {
            return Err(PasslockError::AlreadyExists);
        }
        if password.is_empty() || confirmation.is_empty() {
            return Err(PasslockError::InvalidInput(
                "password and confirmation are required".into(),
            ));
        }
        if password != confirmation {
            return Err(PasslockError::InvalidInput("passwords do not match".into()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(PasslockError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let response = self.call(EngineRequest::Create {
            password,
            confirmation,
        })?;
        if !response.success {
            return Err(PasslockError::PersistFailed(response.diagnostic));
        }

        info!(path = %self.vault_file.path().display(), "vault created");
        Ok(())
    }

    /// Decrypt the on-disk vault into the handoff file.
    pub fn unlock(&self, password: &str) -> Result<EngineResponse> {
        self.call(EngineRequest::Unlock { password })
    }

    /// Re-encrypt the handoff file into the on-disk vault.
    pub fn sync(&self, password: &str) -> Result<EngineResponse> {
        self.call(EngineRequest::Sync { password })
    }

    fn call(&self, request: EngineRequest<'_>) -> Result<EngineResponse> {
        let action = request.action();
        debug!(%action, "invoking vault engine");
        let response = self.transport.invoke(&request)?;
        debug!(%action, success = response.success, "vault engine finished");
        Ok(response)
    }
}
