//! Scripted [`CommandRunner`] for unit tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use super::{render_command, CommandOutput, CommandRunner};

enum Reply {
    Output {
        exit_code: i32,
        stdout: String,
        stderr: String,
    },
    SpawnError(io::ErrorKind),
}

/// Replays queued replies in order and records every argument vector
///
/// Once the queue is empty every further call succeeds with empty output.
#[derive(Default)]
pub(crate) struct ScriptedRunner {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<Vec<String>>>,
    pulled_file: Mutex<Option<Vec<u8>>>,
}

impl ScriptedRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, exit_code: i32, stdout: &str, stderr: &str) {
        self.replies.lock().unwrap().push_back(Reply::Output {
            exit_code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        });
    }

    pub(crate) fn respond_ok(&self, stdout: &str) {
        self.respond(0, stdout, "");
    }

    pub(crate) fn fail(&self, kind: io::ErrorKind) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::SpawnError(kind));
    }

    /// Write `bytes` to the local target of every successful `pull`
    pub(crate) fn serve_pull(&self, bytes: Vec<u8>) {
        *self.pulled_file.lock().unwrap() = Some(bytes);
    }

    /// Argument vectors seen so far, program excluded
    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    fn write_pulled(&self, args: &[String]) -> io::Result<()> {
        let is_pull = args.iter().any(|a| a == "pull");
        let bytes = self.pulled_file.lock().unwrap().clone();
        match (is_pull, bytes, args.last()) {
            (true, Some(bytes), Some(target)) => std::fs::write(target, bytes),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(
        &self,
        program: &Path,
        args: &[String],
        _timeout: Option<Duration>,
    ) -> io::Result<CommandOutput> {
        self.calls.lock().unwrap().push(args.to_vec());

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::SpawnError(kind)) => Err(io::Error::from(kind)),
            Some(Reply::Output {
                exit_code,
                stdout,
                stderr,
            }) => {
                if exit_code == 0 {
                    self.write_pulled(args)?;
                }
                Ok(CommandOutput {
                    command: render_command(program, args),
                    exit_code: Some(exit_code),
                    stdout,
                    stderr,
                })
            }
            None => {
                self.write_pulled(args)?;
                Ok(CommandOutput {
                    command: render_command(program, args),
                    exit_code: Some(0),
                    stdout: String::new(),
                    stderr: String::new(),
                })
            }
        }
    }
}
