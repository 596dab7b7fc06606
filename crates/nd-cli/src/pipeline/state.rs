//! What a run has produced so far.

use nd_core::{ArchiveKind, ArchiveVariant};

/// One uploaded archive and its manifest line.
#[derive(Debug, Clone)]
pub struct Uploaded {
    pub variant: ArchiveVariant,
    pub line: String,
}

/// Accumulated by the phases in order; read by the notify phase.
#[derive(Debug, Default)]
pub struct RunState {
    pub uploads: Vec<Uploaded>,
    /// Uploads whose line is still held in the project registry.
    pub awaiting_line: Vec<(String, ArchiveVariant)>,
    pub mail_failures: Vec<String>,
    pub emails_sent: usize,
}

impl RunState {
    pub fn record(&mut self, variant: ArchiveVariant, line: String) {
        self.uploads.push(Uploaded { variant, line });
    }

    /// Lines for the operator manifest: whole-database artifacts first, then
    /// per-project ones, each in upload order.
    pub fn operator_lines(&self) -> Vec<&str> {
        let run_level = self.uploads.iter().filter(|u| u.variant.kind.is_run_level());
        let per_project = self.uploads.iter().filter(|u| !u.variant.kind.is_run_level());
        run_level.chain(per_project).map(|u| u.line.as_str()).collect()
    }

    /// Lines safe for external recipients.
    pub fn shareable_lines(&self) -> Vec<&str> {
        self.uploads
            .iter()
            .filter(|u| u.variant.kind.is_shareable())
            .map(|u| u.line.as_str())
            .collect()
    }

    pub fn count(&self, kind: ArchiveKind) -> usize {
        self.uploads.iter().filter(|u| u.variant.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;

    fn variant(kind: ArchiveKind) -> ArchiveVariant {
        ArchiveVariant {
            kind,
            archive_path: PathBuf::from("/out/backups/x.tar.gz"),
            relative_key: "x.tar.gz".into(),
            display_name: kind.to_string(),
        }
    }

    #[test]
    fn operator_lines_put_run_level_first() {
        let mut state = RunState::default();
        state.record(variant(ArchiveKind::Sanitized), "sanitized".into());
        state.record(variant(ArchiveKind::Complete), "complete".into());
        state.record(variant(ArchiveKind::Filtered), "filtered".into());
        state.record(variant(ArchiveKind::Standalone), "standalone".into());

        assert_eq!(
            state.operator_lines(),
            vec!["complete", "filtered", "sanitized", "standalone"]
        );
        assert_eq!(state.shareable_lines(), vec!["filtered"]);
        assert_eq!(state.count(ArchiveKind::Sanitized), 1);
    }
}
