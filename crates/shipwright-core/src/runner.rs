//! External command execution.
//!
//! Everything shipwright does to the outside world (the Firebase CLI, flutter,
//! dart, flutterfire, git) goes through [`CommandRunner`], so the sync pipeline
//! can be driven by a scripted runner in tests.

use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{Result, ShipError};

/// Exit code plus captured output of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// Turn a non-zero exit into [`ShipError::CommandFailed`].
    pub fn check(self, program: &str, args: &[&str]) -> Result<Self> {
        if self.success() {
            return Ok(self);
        }
        let stderr = if self.stderr.trim().is_empty() {
            self.stdout.trim()
        } else {
            self.stderr.trim()
        };
        Err(ShipError::CommandFailed {
            command: display_command(program, args),
            code: self.code,
            stderr: stderr.chars().take(500).collect(),
        })
    }

    /// Combined stdout and stderr, for matching on error text.
    pub fn combined(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

pub trait CommandRunner {
    /// Run `program` with `args` in `cwd`, capturing stdout and stderr.
    ///
    /// Returns `Err(ShipError::Spawn)` only when the process could not be
    /// started; a non-zero exit is reported through [`CommandOutput::code`].
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput>;

    /// Run a command attached to the user's terminal (e.g. `firebase login`).
    /// Output is not captured.
    fn run_interactive(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput>;
}

pub fn display_command(program: &str, args: &[&str]) -> String {
    let name = Path::new(program)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.to_string());
    if args.is_empty() {
        name
    } else {
        format!("{name} {}", args.join(" "))
    }
}

/// Runs real processes with `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    fn spawn_error(program: &str, err: std::io::Error) -> ShipError {
        let reason = if err.kind() == std::io::ErrorKind::NotFound && which::which(program).is_err()
        {
            format!("{program} not found in PATH")
        } else {
            err.to_string()
        };
        ShipError::Spawn {
            program: program.to_string(),
            reason,
        }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput> {
        tracing::debug!(command = %display_command(program, args), "running");
        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Self::spawn_error(program, e))?;

        Ok(CommandOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn run_interactive(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput> {
        tracing::debug!(command = %display_command(program, args), "running interactively");
        let status = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| Self::spawn_error(program, e))?;

        Ok(CommandOutput {
            code: status.code().unwrap_or(-1),
            ..CommandOutput::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_passes_success_through() {
        let out = CommandOutput {
            code: 0,
            stdout: "ok".into(),
            stderr: String::new(),
        };
        assert_eq!(out.clone().check("firebase", &["use"]).unwrap(), out);
    }

    #[test]
    fn check_reports_stderr_on_failure() {
        let out = CommandOutput {
            code: 2,
            stdout: String::new(),
            stderr: "Error: not authorized\n".into(),
        };
        let err = out.check("/usr/bin/firebase", &["apps:list"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "'firebase apps:list' exited with status 2: Error: not authorized"
        );
    }

    #[test]
    fn missing_binary_is_a_spawn_error() {
        let err = SystemRunner
            .run("shipwright-definitely-missing-binary", &[], Path::new("."))
            .unwrap_err();
        assert!(matches!(err, ShipError::Spawn { .. }));
    }
}
