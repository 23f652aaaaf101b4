//! External command execution
//!
//! All cluster, registry, and version-control interaction goes through the
//! `CommandRunner` seam: one shell command in, captured output or a failure
//! carrying the command text and both streams out. `ShellRunner` is the real
//! implementation; `ScriptedRunner` is an in-memory double for tests.

use std::process::Stdio;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::info;

use crate::error::{KubeError, Result};

/// Captured output of a completed command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Seam for running external shell commands.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion, returning captured output on success or
    /// `KubeError::Command` on a non-zero exit.
    async fn run(&self, command: &str) -> Result<CommandOutput>;
}

/// Runs commands through `sh -c`, streaming stdout line-by-line to the log
/// while capturing it.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner;

impl ShellRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str) -> Result<CommandOutput> {
        info!("Run: {command}");

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| KubeError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();

        // Drain both pipes concurrently so neither side can fill up and
        // block the child.
        let stdout_task = async {
            let mut captured = String::new();
            if let Some(pipe) = stdout_pipe {
                let mut lines = BufReader::new(pipe).lines();
                while let Some(line) = lines.next_line().await? {
                    info!("{line}");
                    captured.push_str(&line);
                    captured.push('\n');
                }
            }
            Ok::<_, std::io::Error>(captured)
        };
        let stderr_task = async {
            let mut captured = String::new();
            if let Some(mut pipe) = stderr_pipe {
                pipe.read_to_string(&mut captured).await?;
            }
            Ok::<_, std::io::Error>(captured)
        };

        let (stdout, stderr) = tokio::try_join!(stdout_task, stderr_task)?;
        let status = child.wait().await?;

        if !status.success() {
            return Err(KubeError::Command {
                command: command.to_string(),
                code: status.code(),
                stdout,
                stderr,
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

/// Scripted response for one command pattern.
#[derive(Debug, Clone)]
enum ScriptedResponse {
    Stdout(String),
    Fail { code: i32, stderr: String },
}

/// In-memory command runner for tests: records every command it receives
/// and plays back configured responses.
///
/// Responses match by substring, first rule wins; unmatched commands
/// succeed with empty output.
#[derive(Clone, Default)]
pub struct ScriptedRunner {
    commands: Arc<RwLock<Vec<String>>>,
    responses: Arc<RwLock<Vec<(String, ScriptedResponse)>>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Succeed with the given stdout for commands containing `needle`.
    pub fn respond(self, needle: impl Into<String>, stdout: impl Into<String>) -> Self {
        self.responses.write().unwrap().push((
            needle.into(),
            ScriptedResponse::Stdout(stdout.into()),
        ));
        self
    }

    /// Fail with exit code 1 and the given stderr for commands containing
    /// `needle`.
    pub fn fail(self, needle: impl Into<String>, stderr: impl Into<String>) -> Self {
        self.responses.write().unwrap().push((
            needle.into(),
            ScriptedResponse::Fail {
                code: 1,
                stderr: stderr.into(),
            },
        ));
        self
    }

    /// Every command run so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.commands.read().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, command: &str) -> Result<CommandOutput> {
        self.commands.write().unwrap().push(command.to_string());

        let responses = self.responses.read().unwrap();
        match responses
            .iter()
            .find(|(needle, _)| command.contains(needle.as_str()))
        {
            Some((_, ScriptedResponse::Stdout(stdout))) => Ok(CommandOutput {
                stdout: stdout.clone(),
                stderr: String::new(),
            }),
            Some((_, ScriptedResponse::Fail { code, stderr })) => Err(KubeError::Command {
                command: command.to_string(),
                code: Some(*code),
                stdout: String::new(),
                stderr: stderr.clone(),
            }),
            None => Ok(CommandOutput::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shell_runner_captures_stdout() {
        let output = ShellRunner::new().run("printf 'one\\ntwo\\n'").await.unwrap();
        assert_eq!(output.stdout, "one\ntwo\n");
        assert!(output.stderr.is_empty());
    }

    #[tokio::test]
    async fn test_shell_runner_reports_failure_with_output() {
        let err = ShellRunner::new()
            .run("printf out; printf err >&2; exit 3")
            .await
            .unwrap_err();

        match err {
            KubeError::Command {
                command,
                code,
                stdout,
                stderr,
            } => {
                assert!(command.contains("exit 3"));
                assert_eq!(code, Some(3));
                assert_eq!(stdout, "out\n");
                assert_eq!(stderr, "err");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_scripted_runner_records_and_plays_back() {
        let runner = ScriptedRunner::new()
            .respond("git rev-parse", "abc123\n")
            .fail("kubectl create", "already exists");

        let output = runner.run("git rev-parse HEAD").await.unwrap();
        assert_eq!(output.stdout, "abc123\n");

        let err = runner.run("kubectl create thing").await.unwrap_err();
        assert!(err.is_already_exists());

        assert!(runner.run("kubectl apply -f x").await.is_ok());
        assert_eq!(
            runner.commands(),
            ["git rev-parse HEAD", "kubectl create thing", "kubectl apply -f x"]
        );
    }
}
