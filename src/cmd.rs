use colored::Colorize;
use std::process::Command;

use crate::error::{Error, Result};

const SHELL: &str = "/bin/sh";

/// What a finished shell command left behind
#[derive(Debug)]
pub struct Captured {
    pub success: bool,
    pub status: String,
    pub stdout: String,
    pub stderr: String,
}

/// Run `command` through the shell and capture both streams
pub fn run_captured(command: &str) -> Result<Captured> {
    let output = Command::new(SHELL)
        .arg("-c")
        .arg(command)
        .output()
        .map_err(|e| Error::Execution {
            command: command.to_string(),
            detail: format!("failed to spawn {}: {}", SHELL, e),
        })?;

    Ok(Captured {
        success: output.status.success(),
        status: output.status.to_string(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// The one stream an operator sees: stdout if there was any, stderr
/// otherwise. The flag is true when the text is error output.
fn shown(captured: &Captured) -> Option<(&str, bool)> {
    if !captured.stdout.is_empty() {
        Some((captured.stdout.as_str(), false))
    } else if !captured.stderr.is_empty() {
        Some((captured.stderr.as_str(), true))
    } else {
        None
    }
}

/// Run a service manager command, show its output, then report the outcome.
pub fn dispatch(command: &str) -> Result<()> {
    let captured = run_captured(command)?;

    match shown(&captured) {
        Some((text, false)) => println!("\n{}", text.white()),
        Some((text, true)) => println!("\n{}", text.red()),
        None => {}
    }

    if !captured.success {
        return Err(Error::Execution {
            command: command.to_string(),
            detail: captured.status,
        });
    }

    Ok(())
}
