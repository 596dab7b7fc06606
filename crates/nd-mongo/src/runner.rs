//! Running tool invocations as child processes.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::MongoError;
use crate::invocation::Invocation;

/// Longest stderr tail kept in a [`MongoError::Failed`].
const STDERR_TAIL: usize = 2048;

/// Captured output of a successful invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Last non-blank stdout line, trimmed.
    pub fn last_line(&self) -> Option<&str> {
        self.stdout.lines().map(str::trim).rev().find(|l| !l.is_empty())
    }
}

/// Executes tool invocations. Implemented by [`ProcessRunner`] in production
/// and by scripted fakes in tests.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<ToolOutput, MongoError>;
}

/// Runs invocations as OS processes with a per-invocation time limit.
///
/// The child is killed if the limit elapses.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    limit: Duration,
}

impl ProcessRunner {
    pub const fn new(limit: Duration) -> Self {
        Self { limit }
    }
}

#[async_trait]
impl ToolRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ToolOutput, MongoError> {
        tracing::debug!(command = %invocation, "spawning");

        let output = timeout(
            self.limit,
            Command::new(&invocation.program)
                .args(&invocation.args)
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| MongoError::Timeout {
            command: invocation.redacted(),
            secs: self.limit.as_secs(),
        })?
        .map_err(|source| MongoError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(MongoError::Failed {
                command: invocation.redacted(),
                code: output.status.code(),
                stderr: tail(&stderr, STDERR_TAIL).trim().to_string(),
            });
        }

        Ok(ToolOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr,
        })
    }
}

fn tail(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut start = text.len() - max;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_line_skips_trailing_blank_lines() {
        let out = ToolOutput {
            stdout: "MongoDB shell version\nfalse\n\n".into(),
            stderr: String::new(),
        };
        assert_eq!(out.last_line(), Some("false"));
        assert_eq!(ToolOutput::default().last_line(), None);
    }

    #[test]
    fn tail_respects_char_boundaries() {
        let text = "ééé";
        assert_eq!(tail(text, 3), "é");
        assert_eq!(tail("short", 100), "short");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_failure() {
        let runner = ProcessRunner::new(Duration::from_secs(10));
        let inv = Invocation::new("sh").arg("-c").arg("echo broken >&2; exit 3");
        let err = runner.run(&inv).await.unwrap_err();
        match err {
            MongoError::Failed { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_process_times_out() {
        let runner = ProcessRunner::new(Duration::from_millis(100));
        let inv = Invocation::new("sleep").arg("5");
        let err = runner.run(&inv).await.unwrap_err();
        assert!(matches!(err, MongoError::Timeout { .. }));
    }

    #[tokio::test]
    async fn missing_binary_is_spawn_error() {
        let runner = ProcessRunner::new(Duration::from_secs(1));
        let inv = Invocation::new("nightdump-definitely-not-a-binary");
        let err = runner.run(&inv).await.unwrap_err();
        assert!(matches!(err, MongoError::Spawn { .. }));
    }
}
