use std::io::ErrorKind;
use std::process::Command;

use tracing::debug;

use crate::error::VirokitError;

/// Capability boundary for invoking the external analysis binaries.
///
/// Given a program and argument list, a runner either completes silently or
/// fails with an exit-code-bearing error. The orchestration code never
/// inspects tool output; result files on disk are the only contract.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, program: &str, args: &[String]) -> Result<(), VirokitError>;
}

/// Runs programs found on PATH, inheriting stdio so the tools' own progress
/// output reaches the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<(), VirokitError> {
        debug!(program, ?args, "invoking external tool");
        let status = Command::new(program).args(args).status().map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                VirokitError::MissingTool(program.to_string())
            } else {
                VirokitError::Filesystem(format!("spawn {program}: {err}"))
            }
        })?;

        if status.success() {
            return Ok(());
        }
        match status.code() {
            Some(code) => Err(VirokitError::ToolFailed {
                tool: program.to_string(),
                code,
            }),
            None => Err(VirokitError::ToolKilled {
                tool: program.to_string(),
            }),
        }
    }
}

/// Best-effort `--version` probe for provenance records.
pub fn tool_version(program: &str) -> Option<String> {
    let output = Command::new(program).arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if stdout.is_empty() { None } else { Some(stdout) }
}
