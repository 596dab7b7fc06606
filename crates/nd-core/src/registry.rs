//! The per-run project registry.
//!
//! Concurrent upload tasks write each project's `email_line` through the
//! registry's mutex. Readers (the notify step of a phase) must only run once
//! every writer of that phase has joined; the lock alone does not order them.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::entities::Project;
use crate::errors::CoreError;

#[derive(Debug, Default)]
pub struct ProjectRegistry {
    projects: Mutex<BTreeMap<String, Project>>,
}

impl ProjectRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, Project>>, CoreError> {
        self.projects.lock().map_err(|_| CoreError::LockPoisoned)
    }

    /// Register a project. Ids and output basenames must be unique per run.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DuplicateId`] or [`CoreError::DuplicateOutput`].
    pub fn insert(&self, project: Project) -> Result<(), CoreError> {
        let mut projects = self.lock()?;
        if projects.contains_key(&project.id) {
            return Err(CoreError::DuplicateId { id: project.id });
        }
        if let Some(existing) = projects.values().find(|p| p.output == project.output) {
            return Err(CoreError::DuplicateOutput {
                id: project.id,
                existing: existing.id.clone(),
                output: project.output,
            });
        }
        projects.insert(project.id.clone(), project);
        Ok(())
    }

    /// Snapshot of one project.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if the id is not registered.
    pub fn get(&self, id: &str) -> Result<Project, CoreError> {
        self.lock()?
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound { id: id.to_string() })
    }

    /// Remove a project, returning it if it was registered.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::LockPoisoned`] if a writer panicked.
    pub fn remove(&self, id: &str) -> Result<Option<Project>, CoreError> {
        Ok(self.lock()?.remove(id))
    }

    /// Snapshot of every registered project, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::LockPoisoned`] if a writer panicked.
    pub fn projects(&self) -> Result<Vec<Project>, CoreError> {
        Ok(self.lock()?.values().cloned().collect())
    }

    /// # Errors
    ///
    /// Returns [`CoreError::LockPoisoned`] if a writer panicked.
    pub fn len(&self) -> Result<usize, CoreError> {
        Ok(self.lock()?.len())
    }

    /// # Errors
    ///
    /// Returns [`CoreError::LockPoisoned`] if a writer panicked.
    pub fn is_empty(&self) -> Result<bool, CoreError> {
        Ok(self.lock()?.is_empty())
    }

    /// Record the upload line for a project.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] for unknown ids and
    /// [`CoreError::AlreadyRecorded`] if a line is already pending.
    pub fn record_email_line(&self, id: &str, line: String) -> Result<(), CoreError> {
        let mut projects = self.lock()?;
        let project = projects
            .get_mut(id)
            .ok_or_else(|| CoreError::NotFound { id: id.to_string() })?;
        if project.email_line.is_some() {
            return Err(CoreError::AlreadyRecorded { id: id.to_string() });
        }
        project.email_line = Some(line);
        Ok(())
    }

    /// Consume the pending upload line for a project.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] for unknown ids.
    pub fn take_email_line(&self, id: &str) -> Result<Option<String>, CoreError> {
        let mut projects = self.lock()?;
        let project = projects
            .get_mut(id)
            .ok_or_else(|| CoreError::NotFound { id: id.to_string() })?;
        Ok(project.email_line.take())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;
    use crate::stamp::RunStamp;

    fn stamp() -> RunStamp {
        RunStamp::from(NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date"))
    }

    #[test]
    fn rejects_duplicate_ids_and_outputs() {
        let registry = ProjectRegistry::new();
        registry
            .insert(Project::new("a", "galaxy_zoo", stamp()))
            .expect("first insert");

        let dup_id = registry.insert(Project::new("a", "serengeti", stamp()));
        assert!(matches!(dup_id, Err(CoreError::DuplicateId { .. })));

        let dup_output = registry.insert(Project::new("b", "galaxy_zoo", stamp()));
        assert!(matches!(dup_output, Err(CoreError::DuplicateOutput { .. })));
        assert_eq!(registry.len().expect("len"), 1);
    }

    #[test]
    fn email_line_is_written_once_until_taken() {
        let registry = ProjectRegistry::new();
        registry
            .insert(Project::new("a", "galaxy_zoo", stamp()))
            .expect("insert");

        registry
            .record_email_line("a", "first".into())
            .expect("first write");
        let second = registry.record_email_line("a", "second".into());
        assert!(matches!(second, Err(CoreError::AlreadyRecorded { .. })));

        assert_eq!(
            registry.take_email_line("a").expect("take").as_deref(),
            Some("first")
        );
        assert_eq!(registry.take_email_line("a").expect("take"), None);
        registry
            .record_email_line("a", "next phase".into())
            .expect("write after take");
    }

    #[test]
    fn unknown_ids_are_reported() {
        let registry = ProjectRegistry::new();
        assert!(matches!(
            registry.record_email_line("missing", "x".into()),
            Err(CoreError::NotFound { .. })
        ));
        assert!(matches!(
            registry.get("missing"),
            Err(CoreError::NotFound { .. })
        ));
        assert_eq!(registry.remove("missing").expect("remove"), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_each_own_their_line() {
        let registry = Arc::new(ProjectRegistry::new());
        for i in 0..32 {
            registry
                .insert(Project::new(format!("id-{i}"), format!("project_{i}"), stamp()))
                .expect("insert");
        }

        let mut handles = Vec::new();
        for i in 0..32 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                registry.record_email_line(&format!("id-{i}"), format!("line for project_{i}"))
            }));
        }
        for handle in handles {
            handle.await.expect("join").expect("record");
        }

        for project in registry.projects().expect("snapshot") {
            let suffix = project.id.trim_start_matches("id-");
            assert_eq!(
                project.email_line.as_deref(),
                Some(format!("line for project_{suffix}").as_str())
            );
        }
    }
}
