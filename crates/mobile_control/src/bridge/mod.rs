//! Bridge executable plumbing
//!
//! This module provides:
//! - `runner`: process execution behind the [`CommandRunner`] trait
//! - `classify`: mapping of bridge output to [`BridgeErrorKind`](crate::BridgeErrorKind)
//! - `locate`: finding the bridge executable
//! - the [`Bridge`] wrapper that ties them together

mod classify;
mod locate;
mod runner;

pub use classify::{
    check_output, check_report, classify, classify_report, failure, Pattern, RULES,
};
pub use locate::locate_bridge;
pub use runner::{render_command, CommandOutput, CommandRunner, ProcessRunner};

#[cfg(test)]
pub(crate) mod testing;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, Span};

use crate::error::{DeviceError, Result};

/// A resolved bridge executable plus the runner used to invoke it
#[derive(Clone)]
pub struct Bridge {
    path: PathBuf,
    runner: Arc<dyn CommandRunner>,
    timeout: Option<Duration>,
    span: Span,
}

impl Bridge {
    pub fn new(
        path: PathBuf,
        runner: Arc<dyn CommandRunner>,
        timeout: Option<Duration>,
        span: Span,
    ) -> Self {
        Self {
            path,
            runner,
            timeout,
            span,
        }
    }

    /// Path of the bridge executable
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Build the full argument vector: `[-s <serial>] <args...>`
    fn argv(serial: Option<&str>, args: &[&str]) -> Vec<String> {
        let mut argv = Vec::with_capacity(args.len() + 2);
        if let Some(serial) = serial {
            argv.push("-s".to_string());
            argv.push(serial.to_string());
        }
        argv.extend(args.iter().map(|a| a.to_string()));
        argv
    }

    /// Run a command and return its output without judging it
    pub async fn exec(
        &self,
        operation: &'static str,
        serial: Option<&str>,
        args: &[&str],
    ) -> Result<CommandOutput> {
        let argv = Self::argv(serial, args);
        let command = render_command(&self.path, &argv);
        debug!(parent: &self.span, operation, %command, "running bridge command");

        let output = self
            .runner
            .run(&self.path, &argv, self.timeout)
            .await
            .map_err(|err| match err.kind() {
                io::ErrorKind::NotFound => {
                    DeviceError::BridgeNotFound(self.path.display().to_string())
                }
                io::ErrorKind::TimedOut => DeviceError::Timeout {
                    operation,
                    command: command.clone(),
                    seconds: self.timeout.map(|t| t.as_secs_f64()).unwrap_or_default(),
                },
                _ => DeviceError::Io(err),
            })?;

        debug!(
            parent: &self.span,
            operation,
            exit_code = ?output.exit_code,
            stdout_len = output.stdout.len(),
            "bridge command finished"
        );
        Ok(output)
    }

    /// Run a command and fail on non-zero exit or recognised error text
    pub async fn run(
        &self,
        operation: &'static str,
        serial: Option<&str>,
        args: &[&str],
    ) -> Result<CommandOutput> {
        let output = self.exec(operation, serial, args).await?;
        check_output(operation, output)
    }

    /// Run a command whose stdout is a report (`dumpsys`, `getprop`)
    ///
    /// Like [`run`](Self::run), but a zero exit is only judged on stderr.
    pub async fn read(
        &self,
        operation: &'static str,
        serial: Option<&str>,
        args: &[&str],
    ) -> Result<CommandOutput> {
        let output = self.exec(operation, serial, args).await?;
        check_report(operation, output)
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("path", &self.path)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
