//! Picking a secondary replica set member to read from.

use nd_config::Credentials;

use crate::error::MongoError;
use crate::invocation::MongoTools;
use crate::runner::ToolRunner;

/// Prints `true` when the connected member is a secondary, `false` otherwise.
pub const SECONDARY_PROBE: &str = "rs.status().members.forEach(function(member) { \
     if (member.self) { print(member.stateStr === 'SECONDARY'); } })";

/// Probe `hosts` in order and return the first that reports itself as a
/// secondary.
///
/// A host whose probe fails is logged and skipped. Only the exact output
/// `true` qualifies.
pub async fn select_secondary(
    runner: &dyn ToolRunner,
    tools: &MongoTools,
    hosts: &[String],
    admin: &Credentials,
) -> Result<String, MongoError> {
    for host in hosts {
        let probe = tools.shell_eval(host, admin, SECONDARY_PROBE);
        match runner.run(&probe).await {
            Ok(output) if output.last_line() == Some("true") => {
                tracing::info!(%host, "selected secondary");
                return Ok(host.clone());
            }
            Ok(output) => {
                tracing::debug!(%host, answer = output.last_line().unwrap_or(""), "not a secondary");
            }
            Err(error) => {
                tracing::warn!(%host, %error, "replica probe failed");
            }
        }
    }
    Err(MongoError::NoSecondary {
        probed: hosts.len(),
    })
}
