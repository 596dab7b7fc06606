use std::sync::Arc;

use anyhow::Context;
use nd_config::NightdumpConfig;
use nd_core::SystemClock;
use nd_mail::{LogMailer, Mailer, SmtpMailer};
use nd_mongo::ProcessRunner;
use nd_storage::S3ArtifactStore;

use crate::cli::RunArgs;
use crate::pipeline::{BackupPipeline, Collaborators};

/// Configuration plus the production collaborators, built once at startup.
pub struct AppContext {
    pub config: NightdumpConfig,
    pub collaborators: Collaborators,
}

impl AppContext {
    /// Connect the real process runner, S3 store, and mailer.
    ///
    /// With `--no-email` the mailer only logs. `--output-dir` overrides the
    /// configured working directory.
    pub fn init(mut config: NightdumpConfig, args: &RunArgs) -> anyhow::Result<Self> {
        if let Some(dir) = &args.output_dir {
            config.output_dir.clone_from(dir);
        }

        let store = S3ArtifactStore::from_config(&config.storage)
            .context("failed to initialize object storage")?;
        let mailer: Arc<dyn Mailer> = if args.no_email {
            Arc::new(LogMailer)
        } else {
            Arc::new(SmtpMailer::from_config(&config.smtp).context("failed to initialize SMTP")?)
        };

        let collaborators = Collaborators {
            runner: Arc::new(ProcessRunner::new(config.export.timeout())),
            store: Arc::new(store),
            mailer,
            clock: Arc::new(SystemClock),
        };
        Ok(Self {
            config,
            collaborators,
        })
    }

    pub fn pipeline(self) -> BackupPipeline {
        BackupPipeline::new(self.config, self.collaborators)
    }
}
