use thiserror::Error;

/// All errors that can occur in Passlock.
#[derive(Debug, Error)]
pub enum PasslockError {
    // --- Session errors ---
    #[error("No vault found, create one with `passlock init` first")]
    VaultMissing,

    #[error("A vault already exists in this directory")]
    AlreadyExists,

    #[error("Unlock failed, wrong master password or unreadable vault")]
    WrongCredential,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Vault is locked, unlock it first")]
    NotUnlocked,

    #[error("Entry '{0}' not found")]
    NotFound(String),

    // --- Handoff errors ---
    #[error("Handoff state file is missing after unlock")]
    HandoffUnavailable,

    #[error("Handoff state file is corrupt: {0}")]
    HandoffCorrupt(String),

    // --- Engine errors ---
    #[error("Vault engine failed to persist the vault: {0}")]
    PersistFailed(String),

    #[error("Could not invoke the vault engine: {0}")]
    EngineInvocationFailed(String),

    // --- Crypto errors (reference engine) ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed, wrong password or corrupted data")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Invalid vault format: {0}")]
    InvalidVaultFormat(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Clipboard error: {0}")]
    ClipboardError(String),

    #[error("Audit error: {0}")]
    AuditError(String),
}

/// Convenience type alias for Passlock results.
pub type Result<T> = std::result::Result<T, PasslockError>;
