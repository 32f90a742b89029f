//! Configuration — `.passlock.toml` settings with defaults for every field.

pub mod settings;

pub use settings::Settings;
