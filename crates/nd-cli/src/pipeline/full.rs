//! Phase 5: full-fidelity per-project dumps (opt-in).

use std::collections::BTreeSet;

use nd_archive::{ArchiveFilter, ArchiveRequest, flatten_nested};
use nd_core::layout::PROJECTS_DIR;
use nd_core::privacy::CACHE_MARKER;
use nd_core::{ArchiveKind, Project};
use nd_mongo::{DumpOptions, ExportJob, object_id_query};

use super::{PipelineError, Run, blocking, variant};

impl Run<'_> {
    pub(super) async fn full_entity_exports(&mut self) -> Result<(), PipelineError> {
        if !self.config.export.full_project_exports {
            tracing::info!("full project exports disabled");
            return Ok(());
        }

        let sanitized: BTreeSet<&str> = self
            .config
            .sanitized_projects
            .keys()
            .map(String::as_str)
            .collect();
        let remaining: Vec<Project> = self
            .ctx
            .registry
            .projects()?
            .into_iter()
            .filter(|p| !sanitized.contains(p.id.as_str()))
            .collect();

        for project in &remaining {
            self.full_export(project).await?;
        }
        self.remove(&self.ctx.layout.project_dumps_dir()).await
    }

    async fn full_export(&mut self, project: &Project) -> Result<(), PipelineError> {
        tracing::info!(project = %project.name, "full export");
        let out_dir = self.ctx.layout.project_dumps_dir().join(&project.output);
        tokio::fs::create_dir_all(&out_dir).await?;

        let target = self.source_target();
        let dump = |collection: &str, query: Option<String>| {
            ExportJob::new(
                format!("{}:{collection}", project.name),
                self.tools.dump(
                    &target,
                    &out_dir,
                    &DumpOptions {
                        collection: Some(collection.to_string()),
                        query,
                        exclude_collections_with_prefix: None,
                    },
                ),
            )
        };
        let jobs = vec![
            dump(project.classifications.as_str(), None),
            dump(project.subjects.as_str(), None),
            dump(project.groups.as_str(), None),
            dump("projects", Some(object_id_query(&project.id))),
        ];
        self.coordinator.run_all(jobs).await?;

        let flatten_dir = out_dir.clone();
        blocking(move || flatten_nested(&flatten_dir, CACHE_MARKER)).await?;

        let built = self
            .archive(ArchiveRequest {
                source: out_dir.clone(),
                filter: ArchiveFilter::Complete,
                stem: project.output.clone(),
                destination: self.ctx.layout.project_backups_dir(),
            })
            .await?;
        self.remove(&out_dir).await?;

        let relative = format!("{PROJECTS_DIR}/{}.tar.gz", project.output);
        let display = project.display_name();
        self.uploader
            .upload_for_project(&project.id, &display, &relative, &built.path)
            .await?;
        // The line stays in the registry until the notify phase collects it.
        self.state.awaiting_line.push((
            project.id.clone(),
            variant(ArchiveKind::Project, &built, relative, display),
        ));
        Ok(())
    }
}
