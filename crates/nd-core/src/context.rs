use std::sync::Arc;

use crate::layout::RunLayout;
use crate::registry::ProjectRegistry;
use crate::stamp::RunStamp;

/// Everything a single run shares across phases.
///
/// Built once after replica selection and passed by reference to every phase.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub stamp: RunStamp,
    pub layout: RunLayout,
    /// Host reporting itself as secondary.
    pub replica: String,
    pub registry: Arc<ProjectRegistry>,
}

impl RunContext {
    #[must_use]
    pub fn new(stamp: RunStamp, layout: RunLayout, replica: impl Into<String>) -> Self {
        Self {
            stamp,
            layout,
            replica: replica.into(),
            registry: Arc::new(ProjectRegistry::new()),
        }
    }
}
