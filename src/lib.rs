#[cfg(feature = "audit-log")]
pub mod audit;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod engine;
pub mod errors;
pub mod handoff;
pub mod password;
pub mod session;
pub mod vault;
