//! Process execution for bridge commands

use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Captured result of one bridge invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Rendered command line, for error reports
    pub command: String,
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// stdout followed by stderr
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// Render a command line for logs and error messages
pub fn render_command(program: &Path, args: &[String]) -> String {
    let mut rendered = program.display().to_string();
    for arg in args {
        rendered.push(' ');
        if arg.is_empty() || arg.contains(char::is_whitespace) {
            rendered.push('\'');
            rendered.push_str(arg);
            rendered.push('\'');
        } else {
            rendered.push_str(arg);
        }
    }
    rendered
}

/// Runs an external program to completion and captures its output
///
/// Spawn failures are reported through `io::Error`; a missing executable must
/// surface as `ErrorKind::NotFound` and an expired timeout as
/// `ErrorKind::TimedOut`.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        program: &Path,
        args: &[String],
        timeout: Option<Duration>,
    ) -> io::Result<CommandOutput>;
}

/// [`CommandRunner`] backed by real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(
        &self,
        program: &Path,
        args: &[String],
        timeout: Option<Duration>,
    ) -> io::Result<CommandOutput> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match timeout {
            Some(limit) => tokio::time::timeout(limit, cmd.output())
                .await
                .map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("no exit after {:.1}s", limit.as_secs_f64()),
                    )
                })??,
            None => cmd.output().await?,
        };

        Ok(CommandOutput {
            command: render_command(program, args),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
