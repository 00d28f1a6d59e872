use std::future::Future;
use std::io;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Captured result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// `-1` when the process was terminated by a signal.
    pub status_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status_code == 0
    }
}

/// Runs external programs. Git and the Heroku Toolbelt go through this so
/// they can be exercised without spawning anything.
pub trait CommandRunner {
    /// Runs to completion, capturing stdout and stderr.
    fn output(
        &self,
        program: &str,
        args: &[String],
    ) -> impl Future<Output = io::Result<CommandOutput>> + Send;

    /// Runs attached to the terminal and returns the exit status.
    fn interactive(&self, program: &str, args: &[String]) -> impl Future<Output = io::Result<i32>> + Send;
}

pub fn command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    async fn output(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        debug!("Running: {}", command_line(program, args));
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await?;

        Ok(CommandOutput {
            status_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn interactive(&self, program: &str, args: &[String]) -> io::Result<i32> {
        debug!("Running interactively: {}", command_line(program, args));
        let status = Command::new(program).args(args).status().await?;
        Ok(status.code().unwrap_or(-1))
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned outputs in order and records every invocation.
    #[derive(Default)]
    pub struct ScriptedRunner {
        responses: Mutex<VecDeque<CommandOutput>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(self, status_code: i32, stdout: &str, stderr: &str) -> Self {
            self.responses.lock().unwrap().push_back(CommandOutput {
                status_code,
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            });
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn next(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
            self.calls.lock().unwrap().push(command_line(program, args));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no scripted response"))
        }
    }

    impl CommandRunner for ScriptedRunner {
        async fn output(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
            self.next(program, args)
        }

        async fn interactive(&self, program: &str, args: &[String]) -> io::Result<i32> {
            self.next(program, args).map(|output| output.status_code)
        }
    }
}
