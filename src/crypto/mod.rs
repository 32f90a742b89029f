//! Cryptographic primitives for the reference vault engine.
//!
//! The session layer never calls into this module directly: only the
//! `passlock-engine` binary does, through `engine::backend`.
//!
//! - AES-256-GCM encryption and decryption (`encryption`)
//! - Argon2id password-based key derivation (`kdf`)

pub mod encryption;
pub mod kdf;

pub use encryption::{decrypt, encrypt};
pub use kdf::{derive_master_key_with_params, generate_salt, Argon2Params};
