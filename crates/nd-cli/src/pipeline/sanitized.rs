//! Phase 4: field-allowlisted exports of selected projects, mailed to each
//! project's own recipients.

use std::path::Path;

use nd_archive::{ArchiveFilter, ArchiveRequest};
use nd_core::layout::PROJECTS_DIR;
use nd_core::privacy::{
    SANITIZED_CLASSIFICATION_FIELDS, SANITIZED_GROUP_FIELDS, SANITIZED_SUBJECT_FIELDS,
};
use nd_core::{ArchiveKind, Project};
use nd_mail::Email;
use nd_mongo::{ExportJob, ExportOptions, MongoTarget, object_id_query};

use super::{PipelineError, Run, variant};

const PROJECTS_COLLECTION: &str = "projects";

fn fields(list: &[&str]) -> Vec<String> {
    list.iter().map(|f| (*f).to_string()).collect()
}

impl Run<'_> {
    pub(super) async fn sanitized_exports(&mut self) -> Result<(), PipelineError> {
        let config = self.config;
        for (id, recipients) in &config.sanitized_projects {
            let project = self.ctx.registry.get(id)?;
            self.sanitized_export(&project, recipients).await?;
        }
        self.remove(&self.ctx.layout.project_dumps_dir()).await
    }

    /// Sandbox projects are read from the sandbox database, everything else
    /// from the selected secondary.
    fn sanitized_target(&self, project_id: &str) -> MongoTarget {
        match &self.config.sandbox {
            Some(sandbox) if self.config.is_sandbox_project(project_id) => {
                MongoTarget::new(&sandbox.host, &sandbox.db_name)
                    .with_credentials(sandbox.credentials())
            }
            _ => self.source_target(),
        }
    }

    fn sanitized_jobs(&self, project: &Project, out_dir: &Path) -> Vec<ExportJob> {
        let target = self.sanitized_target(&project.id);
        let export = |collection: &str, fields: Vec<String>, query: Option<String>| {
            ExportJob::new(
                format!("{}:{collection}", project.name),
                self.tools.export(
                    &target,
                    collection,
                    &ExportOptions {
                        fields,
                        query,
                        out: Some(out_dir.join(format!("{collection}.json"))),
                    },
                ),
            )
        };

        vec![
            export(
                project.classifications.as_str(),
                fields(SANITIZED_CLASSIFICATION_FIELDS),
                None,
            ),
            export(project.subjects.as_str(), fields(SANITIZED_SUBJECT_FIELDS), None),
            export(project.groups.as_str(), fields(SANITIZED_GROUP_FIELDS), None),
            export(
                PROJECTS_COLLECTION,
                Vec::new(),
                Some(object_id_query(&project.id)),
            ),
        ]
    }

    async fn sanitized_export(&mut self, project: &Project, recipients: &[String]) -> Result<(), PipelineError> {
        let stem = project.sanitized_output();
        let display = project.display_name();
        tracing::info!(project = %project.name, sandbox = self.config.is_sandbox_project(&project.id), "sanitized export");

        let out_dir = self.ctx.layout.project_dumps_dir().join(&stem);
        tokio::fs::create_dir_all(&out_dir).await?;

        let jobs = self.sanitized_jobs(project, &out_dir);
        self.coordinator.run_all(jobs).await?;

        let built = self
            .archive(ArchiveRequest {
                source: out_dir.clone(),
                filter: ArchiveFilter::Complete,
                stem: stem.clone(),
                destination: self.ctx.layout.project_backups_dir(),
            })
            .await?;
        self.remove(&out_dir).await?;

        let relative = format!("{PROJECTS_DIR}/{stem}.tar.gz");
        self.uploader
            .upload_for_project(&project.id, &display, &relative, &built.path)
            .await?;
        let line = self
            .ctx
            .registry
            .take_email_line(&project.id)?
            .unwrap_or_default();
        self.state.record(
            variant(ArchiveKind::Sanitized, &built, relative, display.clone()),
            line.clone(),
        );

        let email = Email::new(
            &self.config.mail.team_from,
            format!("Sanitized {display} MongoDB Backup {}", self.ctx.stamp),
            line,
        )
        .to(recipients.iter().cloned())
        .cc([self.config.mail.ops_address.clone()]);
        self.deliver(email).await;
        Ok(())
    }
}
