use serde::{Deserialize, Serialize};

use crate::inflect::{slugify, tableize, titleize};
use crate::stamp::RunStamp;

/// One logical partition of the source database (a project) for one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    /// String form of the database-assigned key.
    pub id: String,
    pub name: String,
    /// `{slug(name)}_{stamp}`: working-directory and archive stem.
    pub output: String,
    pub subjects: String,
    pub groups: String,
    pub classifications: String,
    /// Populated by the upload step; consumed by the phase that mails it.
    pub email_line: Option<String>,
}

impl Project {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, stamp: RunStamp) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            output: format!("{}_{stamp}", slugify(&name)),
            subjects: tableize(&format!("{name}_subject")),
            groups: tableize(&format!("{name}_group")),
            classifications: tableize(&format!("{name}_classification")),
            email_line: None,
            name,
        }
    }

    /// Title-cased name for email subjects and artifact descriptions.
    #[must_use]
    pub fn display_name(&self) -> String {
        titleize(&self.name)
    }

    /// Stem of the privacy-reduced export for this project.
    #[must_use]
    pub fn sanitized_output(&self) -> String {
        format!("sanitized_{}", self.output)
    }
}
