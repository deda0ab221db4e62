//! Shell hooks run around a sync.

use std::process::Command;

use tracing::debug;

use crate::error::{Error, Result};

/// Run `command` through `sh -c`. A non-zero exit is an error.
///
/// The hook's stdout is logged at DEBUG; its stderr ends up in the error
/// message on failure.
///
/// # Errors
///
/// Returns [`Error::Hook`] when the shell cannot be started or the command fails.
pub fn run_hook(stage: &str, command: &str) -> Result<()> {
    debug!(stage, command, "Running hook");

    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .output()
        .map_err(|e| Error::Hook {
            command: command.to_string(),
            reason: e.to_string(),
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        debug!(stage, output = %stdout.trim(), "Hook output");
    }

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let status = output
        .status
        .code()
        .map_or_else(|| "terminated by signal".to_string(), |c| format!("exit status {c}"));
    Err(Error::Hook {
        command: command.to_string(),
        reason: if stderr.trim().is_empty() {
            status
        } else {
            format!("{status}: {}", stderr.trim())
        },
    })
}
