//! Random password generation.
//!
//! Each position is drawn independently and uniformly from `ALPHABET`
//! using the thread-local CSPRNG (ChaCha seeded from the OS).

use rand::Rng;

/// 26 lowercase + 26 uppercase + 10 digits + 9 symbols.
pub const ALPHABET: &[u8; 71] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*-";

pub const MIN_LENGTH: usize = 4;
pub const MAX_LENGTH: usize = 64;
pub const DEFAULT_LENGTH: usize = 16;

/// Clamp a requested length into `[MIN_LENGTH, MAX_LENGTH]`.
///
/// `None` or a non-positive request selects `DEFAULT_LENGTH`.
pub fn effective_length(requested: Option<i64>) -> usize {
    match requested {
        Some(n) if n > 0 => {
            let n = usize::try_from(n).unwrap_or(MAX_LENGTH);
            n.clamp(MIN_LENGTH, MAX_LENGTH)
        }
        _ => DEFAULT_LENGTH,
    }
}

/// Generate a password of `effective_length(requested)` characters.
pub fn generate(requested: Option<i64>) -> String {
    let length = effective_length(requested);
    let mut rng = rand::rng();
    (0..length)
        .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
        .collect()
}
