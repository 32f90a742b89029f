pub mod add;
#[cfg(feature = "audit-log")]
pub mod audit_cmd;
pub mod completions;
pub mod delete;
pub mod generate;
pub mod info;
pub mod init;
pub mod list;
pub mod search;
pub mod shell;
pub mod show;
pub mod strength;
