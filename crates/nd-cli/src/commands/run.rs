use anyhow::Context;
use nd_config::NightdumpConfig;

use crate::cli::{GlobalFlags, RunArgs};
use crate::context::AppContext;
use crate::pipeline::RunReport;

/// Handle `nightdump run`.
pub async fn handle(args: &RunArgs, config: NightdumpConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let ctx = AppContext::init(config, args).context("failed to initialize nightdump")?;
    let report = ctx.pipeline().run().await.context("backup run failed")?;

    if !flags.quiet {
        println!("{}", summary(&report));
    }
    Ok(())
}

fn summary(report: &RunReport) -> String {
    let mut lines = vec![format!(
        "Backup {} from {}: {} archive(s) uploaded, {} email(s) sent",
        report.stamp,
        report.replica,
        report.uploads.len(),
        report.emails_sent
    )];
    lines.extend(report.uploads.iter().map(|u| format!("  {}", u.line)));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::NaiveDate;
    use nd_core::{ArchiveKind, ArchiveVariant, FixedClock, RunStamp};

    use super::*;
    use crate::pipeline::Uploaded;

    #[test]
    fn summary_lists_each_upload() {
        let stamp = RunStamp::capture(&FixedClock(
            NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date"),
        ));
        let report = RunReport {
            stamp,
            replica: "db2:27017".to_string(),
            uploads: vec![Uploaded {
                variant: ArchiveVariant {
                    kind: ArchiveKind::Complete,
                    archive_path: PathBuf::from("/tmp/x.tar.gz"),
                    relative_key: "x.tar.gz".to_string(),
                    display_name: "Ouroboros".to_string(),
                },
                line: "Backed up Ouroboros (1.000 MB) (https://example)".to_string(),
            }],
            emails_sent: 2,
        };

        let text = summary(&report);
        assert!(text.starts_with("Backup 2026-10-19 from db2:27017: 1 archive(s) uploaded, 2 email(s) sent"));
        assert!(text.ends_with("  Backed up Ouroboros (1.000 MB) (https://example)"));
    }
}
