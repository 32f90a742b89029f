//! `ProcessTransport` — run the engine as a child process.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::warn;

use crate::errors::{PasslockError, Result};

use super::{EngineRequest, EngineResponse, EngineTransport};

/// Spawns `<program> <action> <credential> [confirmation]` in the session
/// directory and waits for it to exit.  No timeout is applied.
#[derive(Debug, Clone)]
pub struct ProcessTransport {
    program: PathBuf,
    working_dir: PathBuf,
}

impl ProcessTransport {
    pub fn new(program: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            working_dir: working_dir.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

impl EngineTransport for ProcessTransport {
    fn invoke(&self, request: &EngineRequest<'_>) -> Result<EngineResponse> {
        let output = Command::new(&self.program)
            .args(request.args())
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                PasslockError::EngineInvocationFailed(format!(
                    "failed to launch '{}': {e}",
                    self.program.display()
                ))
            })?;

        if output.status.success() {
            return Ok(EngineResponse::ok());
        }

        let mut diagnostic = String::from_utf8_lossy(&output.stdout).into_owned();
        diagnostic.push_str(&String::from_utf8_lossy(&output.stderr));
        let diagnostic = diagnostic.trim().to_string();

        warn!(
            action = %request.action(),
            code = output.status.code().unwrap_or(-1),
            "vault engine reported failure"
        );

        Ok(EngineResponse::failed(if diagnostic.is_empty() {
            match output.status.code() {
                Some(code) => format!("engine exited with code {code}"),
                None => "engine terminated by signal".to_string(),
            }
        } else {
            diagnostic
        }))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn script(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("engine.sh");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn zero_exit_is_success() {
        let dir = TempDir::new().unwrap();
        let transport = ProcessTransport::new(script(&dir, "echo ok; exit 0"), dir.path());
        let response = transport
            .invoke(&EngineRequest::Unlock { password: "pw" })
            .unwrap();
        assert!(response.success);
        assert!(response.diagnostic.is_empty());
    }

    #[test]
    fn nonzero_exit_is_failure_with_combined_output() {
        let dir = TempDir::new().unwrap();
        let transport = ProcessTransport::new(
            script(&dir, "echo partial; echo broken >&2; exit 3"),
            dir.path(),
        );
        let response = transport
            .invoke(&EngineRequest::Sync { password: "pw" })
            .unwrap();
        assert!(!response.success);
        assert!(response.diagnostic.contains("partial"));
        assert!(response.diagnostic.contains("broken"));
    }

    #[test]
    fn silent_failure_reports_exit_code() {
        let dir = TempDir::new().unwrap();
        let transport = ProcessTransport::new(script(&dir, "exit 7"), dir.path());
        let response = transport
            .invoke(&EngineRequest::Unlock { password: "pw" })
            .unwrap();
        assert_eq!(response.diagnostic, "engine exited with code 7");
    }

    #[test]
    fn runs_in_the_session_directory_with_action_args() {
        let dir = TempDir::new().unwrap();
        let transport = ProcessTransport::new(
            script(&dir, "pwd > where.txt; echo \"$@\" > args.txt"),
            dir.path(),
        );
        transport
            .invoke(&EngineRequest::Create {
                password: "abcd",
                confirmation: "abcd",
            })
            .unwrap();

        let args = fs::read_to_string(dir.path().join("args.txt")).unwrap();
        assert_eq!(args.trim(), "create abcd abcd");
        let cwd = fs::read_to_string(dir.path().join("where.txt")).unwrap();
        assert_eq!(
            fs::canonicalize(cwd.trim()).unwrap(),
            fs::canonicalize(dir.path()).unwrap()
        );
    }

    #[test]
    fn missing_program_is_invocation_failure() {
        let dir = TempDir::new().unwrap();
        let transport = ProcessTransport::new(dir.path().join("no-such-engine"), dir.path());
        assert!(matches!(
            transport.invoke(&EngineRequest::Unlock { password: "pw" }),
            Err(PasslockError::EngineInvocationFailed(_))
        ));
    }
}
