//! Phase 3: independently hosted databases, each backed up and mailed on its
//! own.

use nd_archive::{ArchiveFilter, ArchiveRequest};
use nd_config::{Credentials, StandaloneConfig};
use nd_core::inflect::{slugify, titleize};
use nd_core::layout::STANDALONE_DIR;
use nd_core::{ArchiveKind, Project};
use nd_mail::Email;
use nd_mongo::{DumpOptions, MongoTarget};

use super::{PipelineError, Run, variant};

const SYSTEM_PREFIX: &str = "system";

impl Run<'_> {
    pub(super) async fn standalone_backups(&mut self) -> Result<(), PipelineError> {
        let config = self.config;
        if config.standalone_projects.is_empty() {
            tracing::info!("no standalone databases configured");
            return Ok(());
        }
        for (name, db) in &config.standalone_projects {
            self.standalone_backup(name, db).await?;
        }
        self.remove(&self.ctx.layout.standalone_dumps_dir()).await
    }

    async fn standalone_backup(&mut self, name: &str, db: &StandaloneConfig) -> Result<(), PipelineError> {
        tracing::info!(%name, host = %db.address(), "backing up standalone database");
        let slug = slugify(name);
        let display = titleize(name);
        let dump_dir = self.ctx.layout.standalone_dumps_dir().join(&slug);
        tokio::fs::create_dir_all(&dump_dir).await?;

        let credentials = (!db.username.is_empty()).then(|| Credentials {
            user: db.username.clone(),
            pass: db.password.clone(),
        });
        let target = MongoTarget::new(db.address(), &db.database).with_credentials(credentials);
        let dump = self.tools.dump(
            &target,
            &dump_dir,
            &DumpOptions {
                exclude_collections_with_prefix: Some(SYSTEM_PREFIX.to_string()),
                ..DumpOptions::default()
            },
        );
        self.deps.runner.run(&dump).await?;

        // Per-phase registry entries, removed before the phase ends.
        let full_id = format!("standalone:{name}");
        let mut entity = Project::new(&full_id, name, self.ctx.stamp);
        entity.output = format!("{STANDALONE_DIR}/{slug}");
        self.ctx.registry.insert(entity)?;

        let full_line = self
            .archive_and_upload(&full_id, &dump_dir, ArchiveFilter::Complete, &slug, &display)
            .await?;
        let mut recipient_line = full_line;

        let mut sanitized_id = None;
        if !db.sanitized_excludes.is_empty() {
            let id = format!("standalone:{name}_sanitized");
            let mut entity = Project::new(&id, format!("{name}_sanitized"), self.ctx.stamp);
            entity.output = format!("{STANDALONE_DIR}/{slug}_sanitized");
            self.ctx.registry.insert(entity)?;

            recipient_line = self
                .archive_and_upload(
                    &id,
                    &dump_dir,
                    ArchiveFilter::exclude(db.sanitized_excludes.iter().cloned()),
                    &format!("{slug}_sanitized"),
                    &display,
                )
                .await?;
            sanitized_id = Some(id);
        }

        self.remove(&dump_dir).await?;

        let email = Email::new(
            &self.config.mail.team_from,
            format!("{name} MongoDB Backup {}", self.ctx.stamp),
            recipient_line,
        )
        .to(db.email_recipients.iter().cloned())
        .to([self.config.mail.ops_address.clone()]);
        self.deliver(email).await;

        self.ctx.registry.remove(&full_id)?;
        if let Some(id) = sanitized_id {
            self.ctx.registry.remove(&id)?;
        }
        Ok(())
    }

    /// Archive `dump_dir` under `standalone_projects/`, upload it against
    /// `entity_id`, and return the recorded line.
    async fn archive_and_upload(
        &mut self,
        entity_id: &str,
        dump_dir: &std::path::Path,
        filter: ArchiveFilter,
        stem: &str,
        display: &str,
    ) -> Result<String, PipelineError> {
        let built = self
            .archive(ArchiveRequest {
                source: dump_dir.to_path_buf(),
                filter,
                stem: stem.to_string(),
                destination: self.ctx.layout.standalone_backups_dir(),
            })
            .await?;
        let relative = format!("{STANDALONE_DIR}/{stem}.tar.gz");
        self.uploader
            .upload_for_project(entity_id, display, &relative, &built.path)
            .await?;

        let line = self
            .ctx
            .registry
            .take_email_line(entity_id)?
            .unwrap_or_default();
        self.state.record(
            variant(ArchiveKind::Standalone, &built, relative, display.to_string()),
            line.clone(),
        );
        Ok(line)
    }
}
