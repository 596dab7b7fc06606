//! Fixed privacy lists.
//!
//! The sanitized field allowlists are the contract for what may leave the
//! organisation in a sanitized export. Adding a field here widens what
//! external recipients receive.

/// Fields exported from `{project}_subjects` in sanitized exports.
pub const SANITIZED_SUBJECT_FIELDS: &[&str] = &[
    "activated_at",
    "classification_count",
    "coords",
    "created_at",
    "group",
    "group_id",
    "location",
    "metadata",
    "project_id",
    "random",
    "state",
    "updated_at",
    "workflow_ids",
    "zooniverse_id",
];

/// Fields exported from `{project}_classifications` in sanitized exports.
pub const SANITIZED_CLASSIFICATION_FIELDS: &[&str] = &[
    "annotations",
    "created_at",
    "project_id",
    "subject_ids",
    "subjects",
    "tutorial",
    "updated_at",
    "user_id",
    "user_name",
    "workflow_id",
];

/// Fields exported from `{project}_groups` in sanitized exports.
pub const SANITIZED_GROUP_FIELDS: &[&str] = &[
    "categories",
    "classification_count",
    "created_at",
    "metadata",
    "name",
    "project_id",
    "project_name",
    "random",
    "state",
    "stats",
    "subjects",
    "updated_at",
    "zooniverse_id",
];

/// Top-level collections dropped from the filtered archive.
pub const FILTERED_EXCLUDES: &[&str] = &[
    "_cache",
    "administrations",
    "administrators",
    "data_requests",
    "jobs",
    "messages",
    "classifications",
    "groups",
    "manifest_entries",
    "manifests",
    "moderations",
    "project_statuses",
    "subjects",
    "translations",
    "user_extra_infos",
    "users",
];

/// The only top-level collections kept in the talk-subset archive.
pub const TALK_COLLECTIONS: &[&str] = &["boards", "discussions", "projects", "subject_sets"];

/// Marker for cache collections that are never flattened into the global dump.
pub const CACHE_MARKER: &str = "_cache";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn talk_subset_never_overlaps_filtered_excludes() {
        for name in TALK_COLLECTIONS {
            assert!(!FILTERED_EXCLUDES.contains(name), "{name} is excluded");
        }
    }

    #[test]
    fn allowlists_have_no_duplicates() {
        for list in [
            SANITIZED_SUBJECT_FIELDS,
            SANITIZED_CLASSIFICATION_FIELDS,
            SANITIZED_GROUP_FIELDS,
        ] {
            let mut sorted = list.to_vec();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), list.len());
        }
    }
}
