//! Concurrent export jobs with a dispatch stagger and a join barrier.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;

use crate::error::{JobFailure, MongoError};
use crate::invocation::Invocation;
use crate::runner::ToolRunner;

/// One export to run.
#[derive(Debug, Clone)]
pub struct ExportJob {
    /// Human-readable name for logs and failure reports.
    pub label: String,
    pub invocation: Invocation,
}

impl ExportJob {
    pub fn new(label: impl Into<String>, invocation: Invocation) -> Self {
        Self {
            label: label.into(),
            invocation,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JobReport {
    pub label: String,
    pub elapsed: Duration,
}

/// Runs a batch of exports concurrently.
///
/// Dispatch is staggered by a fixed delay between starts. [`Self::run_all`]
/// returns only once every job has finished. A failing job never cancels
/// its siblings.
pub struct ExportCoordinator {
    runner: Arc<dyn ToolRunner>,
    stagger: Duration,
}

impl ExportCoordinator {
    pub fn new(runner: Arc<dyn ToolRunner>, stagger: Duration) -> Self {
        Self { runner, stagger }
    }

    pub async fn run_all(&self, jobs: Vec<ExportJob>) -> Result<Vec<JobReport>, MongoError> {
        let total = jobs.len();
        let mut set = JoinSet::new();

        for (index, job) in jobs.into_iter().enumerate() {
            if index > 0 && !self.stagger.is_zero() {
                tokio::time::sleep(self.stagger).await;
            }
            tracing::debug!(label = %job.label, command = %job.invocation, "dispatching export");
            let runner = Arc::clone(&self.runner);
            set.spawn(async move {
                let started = Instant::now();
                let result = runner.run(&job.invocation).await;
                (job.label, started.elapsed(), result)
            });
        }

        let mut completed = Vec::with_capacity(total);
        let mut failures = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((label, elapsed, Ok(_))) => {
                    tracing::info!(%label, elapsed_ms = elapsed.as_millis(), "export finished");
                    completed.push(JobReport { label, elapsed });
                }
                Ok((label, _, Err(error))) => {
                    tracing::error!(%label, %error, "export failed");
                    failures.push(JobFailure { label, error });
                }
                Err(join_error) => {
                    tracing::error!(error = %join_error, "export task aborted");
                    failures.push(JobFailure {
                        label: String::from("<aborted>"),
                        error: MongoError::Join(join_error.to_string()),
                    });
                }
            }
        }

        if failures.is_empty() {
            Ok(completed)
        } else {
            Err(MongoError::JobsFailed { total, failures })
        }
    }
}
