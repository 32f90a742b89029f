//! Password helpers: strength scoring (`strength`) and generation (`generator`).

pub mod generator;
pub mod strength;

pub use generator::{generate, ALPHABET, DEFAULT_LENGTH, MAX_LENGTH, MIN_LENGTH};
pub use strength::{score, Strength, StrengthReport};
