//! Vault module — the credential data model and the on-disk vault file.
//!
//! This module provides:
//! - `Entry` and `Vault`, the in-memory working set (`entry`)
//! - `VaultFile`, the opaque `<salt>:<ciphertext>` file owned by the engine (`file`)

pub mod entry;
pub mod file;

pub use entry::{Entry, NewEntry, Vault};
pub use file::{VaultFile, VaultInfo};
