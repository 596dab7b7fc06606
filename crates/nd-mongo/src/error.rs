//! Errors from MongoDB tool invocations.

use thiserror::Error;

/// One failed job of a coordinated batch.
#[derive(Debug)]
pub struct JobFailure {
    pub label: String,
    pub error: MongoError,
}

#[derive(Debug, Error)]
pub enum MongoError {
    /// The tool binary could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran longer than the configured limit and was killed.
    #[error("timed out after {secs}s: {command}")]
    Timeout { command: String, secs: u64 },

    /// The tool exited non-zero.
    #[error("exited with {}: {command}: {stderr}", code.map_or_else(|| "signal".to_string(), |c| format!("status {c}")))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// No candidate host reported itself as a secondary.
    #[error("No secondary MongoDB server found among {probed} host(s). Aborting")]
    NoSecondary { probed: usize },

    /// At least one job of a coordinated batch failed; siblings ran to completion.
    #[error("{} of {total} export job(s) failed: {}", failures.len(), failure_summary(failures))]
    JobsFailed {
        total: usize,
        failures: Vec<JobFailure>,
    },

    /// Tool output could not be interpreted.
    #[error("unexpected tool output: {0}")]
    Parse(String),

    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A job task panicked or was cancelled.
    #[error("export task aborted: {0}")]
    Join(String),
}

fn failure_summary(failures: &[JobFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.label, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}
