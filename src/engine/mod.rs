//! Vault engine adapter.
//!
//! The engine is a separate program that owns encryption and the on-disk
//! vault format.  We talk to it like a tiny synchronous RPC service: one
//! request per action, and a response that is just "did it succeed" plus
//! whatever it printed.  Only the handoff file carries structured data.
//!
//! - `EngineRequest` / `EngineResponse` and the `EngineTransport` seam (here)
//! - `EngineClient`, the adapter the session talks to (`client`)
//! - `ProcessTransport`, which spawns the engine program (`process`)
//! - `EngineBackend`, the reference engine behind `passlock-engine` (`backend`)

pub mod backend;
pub mod client;
pub mod process;

use std::fmt;
use std::str::FromStr;

use crate::errors::{PasslockError, Result};

pub use backend::{EngineBackend, InProcessTransport};
pub use client::EngineClient;
pub use process::ProcessTransport;

/// The fixed set of actions the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineAction {
    Create,
    Unlock,
    Sync,
}

impl EngineAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Unlock => "unlock",
            Self::Sync => "sync",
        }
    }
}

impl fmt::Display for EngineAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineAction {
    type Err = PasslockError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "create" => Ok(Self::Create),
            "unlock" => Ok(Self::Unlock),
            "sync" => Ok(Self::Sync),
            other => Err(PasslockError::InvalidInput(format!(
                "unknown engine action '{other}'"
            ))),
        }
    }
}

/// One request per engine action.
///
/// `Debug` is implemented by hand so credentials never reach a log line.
#[derive(Clone, Copy)]
pub enum EngineRequest<'a> {
    Create {
        password: &'a str,
        confirmation: &'a str,
    },
    Unlock {
        password: &'a str,
    },
    Sync {
        password: &'a str,
    },
}

impl EngineRequest<'_> {
    pub fn action(&self) -> EngineAction {
        match self {
            Self::Create { .. } => EngineAction::Create,
            Self::Unlock { .. } => EngineAction::Unlock,
            Self::Sync { .. } => EngineAction::Sync,
        }
    }

    /// Command-line form: `<action> <credential> [confirmation]`.
    pub fn args(&self) -> Vec<&str> {
        match *self {
            Self::Create {
                password,
                confirmation,
            } => vec!["create", password, confirmation],
            Self::Unlock { password } => vec!["unlock", password],
            Self::Sync { password } => vec!["sync", password],
        }
    }
}

impl fmt::Debug for EngineRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineRequest")
            .field("action", &self.action())
            .finish_non_exhaustive()
    }
}

/// What the engine told us: success by exit status, plus its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineResponse {
    pub success: bool,
    /// Combined stdout and stderr. Only surfaced to callers on failure.
    pub diagnostic: String,
}

impl EngineResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            diagnostic: String::new(),
        }
    }

    pub fn failed(diagnostic: impl Into<String>) -> Self {
        Self {
            success: false,
            diagnostic: diagnostic.into(),
        }
    }
}

/// How requests reach the engine.
///
/// Implementations block until the engine has finished.  `Err` means the
/// engine could not be invoked at all; an engine that ran and failed is
/// an `Ok` response with `success == false`.
pub trait EngineTransport: Send + Sync {
    fn invoke(&self, request: &EngineRequest<'_>) -> Result<EngineResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_follow_the_command_line_contract() {
        let create = EngineRequest::Create {
            password: "pw12",
            confirmation: "pw12",
        };
        assert_eq!(create.args(), ["create", "pw12", "pw12"]);
        assert_eq!(
            EngineRequest::Unlock { password: "x" }.args(),
            ["unlock", "x"]
        );
        assert_eq!(EngineRequest::Sync { password: "x" }.args(), ["sync", "x"]);
    }

    #[test]
    fn debug_output_hides_credentials() {
        let req = EngineRequest::Unlock {
            password: "hunter2-secret",
        };
        let shown = format!("{req:?}");
        assert!(shown.contains("Unlock"));
        assert!(!shown.contains("hunter2-secret"));
    }

    #[test]
    fn action_parses_from_str() {
        assert_eq!("sync".parse::<EngineAction>().unwrap(), EngineAction::Sync);
        assert_eq!(
            EngineAction::Create.as_str().parse::<EngineAction>().unwrap(),
            EngineAction::Create
        );
        assert!("destroy".parse::<EngineAction>().is_err());
    }
}
