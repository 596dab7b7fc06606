//! Phase 6: one dump of the whole source database, archived three ways, plus
//! the optional staging database.

use std::path::Path;

use nd_archive::{ArchiveFilter, ArchiveRequest, BuiltArchive, flatten_nested};
use nd_config::DatabaseConfig;
use nd_core::privacy::{CACHE_MARKER, FILTERED_EXCLUDES, TALK_COLLECTIONS};
use nd_core::ArchiveKind;
use nd_mongo::{DumpOptions, MongoTarget};

use super::{PipelineError, Run, blocking, variant};

impl Run<'_> {
    pub(super) async fn global_archives(&mut self) -> Result<(), PipelineError> {
        let config = self.config;
        let db_name = &config.source.db_name;
        let stamp = self.ctx.stamp;
        let dump_dir = self.ctx.layout.database_dump_dir(db_name, stamp);

        let dump = self
            .tools
            .dump(&self.source_target(), &dump_dir, &DumpOptions::default());
        self.deps.runner.run(&dump).await?;

        let flatten_dir = dump_dir.clone();
        let moved = blocking(move || flatten_nested(&flatten_dir, CACHE_MARKER)).await?;
        tracing::info!(files = moved, "complete dump flattened");

        let stem = format!("{db_name}_{stamp}");
        let complete = self
            .build_run_archive(&dump_dir, ArchiveFilter::Complete, stem.clone())
            .await?;
        let filtered = self
            .build_run_archive(
                &dump_dir,
                ArchiveFilter::exclude(FILTERED_EXCLUDES.iter().copied()),
                format!("{stem}_filtered"),
            )
            .await?;
        let talk = self
            .build_run_archive(
                &dump_dir,
                ArchiveFilter::include(TALK_COLLECTIONS.iter().copied()),
                format!("{stem}_talk_only"),
            )
            .await?;
        self.remove(&dump_dir).await?;

        let staging = match &config.staging {
            Some(staging) => Some(self.staging_archive(staging).await?),
            None => None,
        };

        let db = self.db_display_name();
        self.upload_run_archive(ArchiveKind::Complete, &complete, db.clone())
            .await?;
        self.upload_run_archive(ArchiveKind::Filtered, &filtered, format!("Filtered {db}"))
            .await?;
        self.upload_run_archive(ArchiveKind::TalkSubset, &talk, "Talk only".to_string())
            .await?;
        if let Some(staging) = staging {
            self.upload_run_archive(ArchiveKind::Staging, &staging, "Staging".to_string())
                .await?;
        }
        Ok(())
    }

    /// Named after the source database so it never shares a key with the
    /// complete archive, whatever the staging database is called.
    async fn staging_archive(&self, staging: &DatabaseConfig) -> Result<BuiltArchive, PipelineError> {
        let name = format!("{}_staging", self.config.source.db_name);
        let dump_dir = self.ctx.layout.database_dump_dir(&name, self.ctx.stamp);
        let target = MongoTarget::new(&staging.host, &staging.db_name)
            .with_credentials(staging.credentials());
        let dump = self.tools.dump(&target, &dump_dir, &DumpOptions::default());
        self.deps.runner.run(&dump).await?;

        let stem = format!("{name}_{}", self.ctx.stamp);
        let built = self
            .build_run_archive(&dump_dir, ArchiveFilter::Complete, stem)
            .await?;
        self.remove(&dump_dir).await?;
        Ok(built)
    }

    async fn build_run_archive(
        &self,
        dump_dir: &Path,
        filter: ArchiveFilter,
        stem: String,
    ) -> Result<BuiltArchive, PipelineError> {
        self.archive(ArchiveRequest {
            source: dump_dir.to_path_buf(),
            filter,
            stem,
            destination: self.ctx.layout.backups_dir(),
        })
        .await
    }

    async fn upload_run_archive(
        &mut self,
        kind: ArchiveKind,
        built: &BuiltArchive,
        display: String,
    ) -> Result<(), PipelineError> {
        let relative = built
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        tracing::info!(%kind, %relative, "uploading");
        let line = self.uploader.upload(&display, &relative, &built.path).await?;
        self.state
            .record(variant(kind, built, relative, display), line);
        Ok(())
    }
}
