//! AES-256-GCM authenticated encryption.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce and
//! prepends it to the ciphertext.  `decrypt` splits the nonce back out
//! before decrypting.
//!
//! Layout of the returned byte buffer:
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};

use crate::errors::{PasslockError, Result};

/// Size of the AES-256-GCM nonce in bytes.
const NONCE_LEN: usize = 12;

/// Encrypt `plaintext` with a 32-byte `key`.
///
/// Returns the nonce prepended to the ciphertext (nonce || ciphertext).
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| PasslockError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| PasslockError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypt data that was produced by `encrypt`.
///
/// Any failure (short input, bad key, tag mismatch) collapses into
/// `DecryptionFailed` so callers cannot tell a wrong password apart
/// from tampered data.
pub fn decrypt(key: &[u8], ciphertext_with_nonce: &[u8]) -> Result<Vec<u8>> {
    if ciphertext_with_nonce.len() < NONCE_LEN {
        return Err(PasslockError::DecryptionFailed);
    }

    let (nonce_bytes, ciphertext) = ciphertext_with_nonce.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| PasslockError::DecryptionFailed)?;

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| PasslockError::DecryptionFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_then_decrypt_returns_plaintext() {
        let key = [7u8; 32];
        let sealed = encrypt(&key, b"{\"entries\":[]}").unwrap();
        assert_eq!(decrypt(&key, &sealed).unwrap(), b"{\"entries\":[]}");
    }

    #[test]
    fn each_encryption_uses_a_fresh_nonce() {
        let key = [1u8; 32];
        let a = encrypt(&key, b"same").unwrap();
        let b = encrypt(&key, b"same").unwrap();
        assert_ne!(a[..NONCE_LEN], b[..NONCE_LEN]);
    }

    #[test]
    fn wrong_key_fails_with_decryption_failed() {
        let sealed = encrypt(&[1u8; 32], b"secret").unwrap();
        let result = decrypt(&[2u8; 32], &sealed);
        assert!(matches!(result, Err(PasslockError::DecryptionFailed)));
    }

    #[test]
    fn truncated_input_fails() {
        assert!(matches!(
            decrypt(&[0u8; 32], &[0u8; 5]),
            Err(PasslockError::DecryptionFailed)
        ));
    }

    #[test]
    fn invalid_key_length_is_rejected() {
        assert!(matches!(
            encrypt(&[0u8; 16], b"x"),
            Err(PasslockError::EncryptionFailed(_))
        ));
    }
}
