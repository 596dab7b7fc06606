//! Phase 7: the operator manifest and the externally shareable one.

use nd_core::ArchiveKind;
use nd_mail::Email;

use super::{PipelineError, Run};

const LINE_SEPARATOR: &str = "\n\n";

impl Run<'_> {
    pub(super) async fn notify(&mut self) -> Result<(), PipelineError> {
        // Full-export lines were written by phase 5, which has joined.
        for (id, variant) in std::mem::take(&mut self.state.awaiting_line) {
            match self.ctx.registry.take_email_line(&id)? {
                Some(line) => self.state.record(variant, line),
                None => tracing::warn!(%id, "uploaded project has no recorded line"),
            }
        }

        let stamp = self.ctx.stamp;
        let db = self.db_display_name();
        let header = format!("{db} Backup {stamp}: 1 complete backup.");
        let subject = format!("{db} MongoDB Backup {stamp}");
        tracing::info!(
            sanitized = self.state.count(ArchiveKind::Sanitized),
            projects = self.state.count(ArchiveKind::Project),
            "composing manifests"
        );

        let operator_body = manifest(&header, &self.state.operator_lines());
        let shareable_body = manifest(&header, &self.state.shareable_lines());
        let config = self.config;
        let mail = &config.mail;

        let operator = Email::new(&mail.noreply_from, subject.clone(), operator_body)
            .to([mail.ops_address.clone()]);
        let shareable = Email::new(&mail.team_from, subject, shareable_body)
            .to([mail.ops_address.clone()])
            .to(config.filtered_recipients.iter().cloned());

        self.deliver(operator).await;
        self.deliver(shareable).await;
        Ok(())
    }
}

fn manifest(header: &str, lines: &[&str]) -> String {
    std::iter::once(header)
        .chain(lines.iter().copied())
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR)
}
