//! Export scheduling knobs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const fn default_dispatch_stagger_ms() -> u64 {
    1_000
}

/// Six hours: longer than any dump has taken, short enough to page someone the same night.
const fn default_timeout_secs() -> u64 {
    21_600
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    /// Delay between dispatching sibling export jobs.
    #[serde(default = "default_dispatch_stagger_ms")]
    pub dispatch_stagger_ms: u64,

    /// Upper bound for any single tool invocation.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Also produce a full-fidelity archive for every remaining project.
    #[serde(default)]
    pub full_project_exports: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dispatch_stagger_ms: default_dispatch_stagger_ms(),
            timeout_secs: default_timeout_secs(),
            full_project_exports: false,
        }
    }
}

impl ExportConfig {
    pub const fn dispatch_stagger(&self) -> Duration {
        Duration::from_millis(self.dispatch_stagger_ms)
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
