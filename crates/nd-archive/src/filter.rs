//! Which files of a dump tree go into an archive.
//!
//! Collections are matched by file name convention: the collection name
//! followed by `.` and anything (`subjects.*` matches `subjects.bson` and
//! `subjects.metadata.json`, but not `galaxy_zoo_subjects.bson`).

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::ArchiveError;

/// Selection mode for one archive variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveFilter {
    /// Every file.
    Complete,
    /// Every file except those of the named collections.
    Exclude(Vec<String>),
    /// Only files of the named collections.
    Include(Vec<String>),
}

impl ArchiveFilter {
    pub fn exclude<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Exclude(names.into_iter().map(Into::into).collect())
    }

    pub fn include<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Include(names.into_iter().map(Into::into).collect())
    }

    /// Compile into a predicate over file names.
    pub fn predicate(&self) -> Result<FilePredicate, ArchiveError> {
        Ok(match self {
            Self::Complete => FilePredicate::All,
            Self::Exclude(names) => FilePredicate::Exclude(collection_globs(names)?),
            Self::Include(names) => FilePredicate::Include(collection_globs(names)?),
        })
    }
}

#[derive(Debug, Clone)]
pub enum FilePredicate {
    All,
    Exclude(GlobSet),
    Include(GlobSet),
}

impl FilePredicate {
    /// Whether a file with this (base) name belongs in the archive.
    pub fn admits(&self, file_name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Exclude(set) => !set.is_match(file_name),
            Self::Include(set) => set.is_match(file_name),
        }
    }
}

fn collection_globs(names: &[String]) -> Result<GlobSet, ArchiveError> {
    let mut builder = GlobSetBuilder::new();
    for name in names {
        builder.add(Glob::new(&format!("{}.*", globset::escape(name)))?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("subjects.bson", false)]
    #[case("subjects.metadata.json", false)]
    #[case("_cache.bson", false)]
    #[case("galaxy_zoo_subjects.bson", true)]
    #[case("groups.bson", true)]
    #[case("subjects", true)]
    fn exclude_matches_name_dot_anything(#[case] file: &str, #[case] admitted: bool) {
        let predicate = ArchiveFilter::exclude(["subjects", "_cache"])
            .predicate()
            .unwrap();
        assert_eq!(predicate.admits(file), admitted);
    }

    #[rstest]
    #[case("boards.bson", true)]
    #[case("discussions.metadata.json", true)]
    #[case("users.bson", false)]
    #[case("talk_boards.bson", false)]
    fn include_selects_only_named(#[case] file: &str, #[case] admitted: bool) {
        let predicate = ArchiveFilter::include(["boards", "discussions"])
            .predicate()
            .unwrap();
        assert_eq!(predicate.admits(file), admitted);
    }

    #[test]
    fn complete_admits_everything() {
        let predicate = ArchiveFilter::Complete.predicate().unwrap();
        assert!(predicate.admits("anything.at.all"));
    }

    #[test]
    fn glob_metacharacters_in_names_are_literal() {
        let predicate = ArchiveFilter::exclude(["odd[1]"]).predicate().unwrap();
        assert!(!predicate.admits("odd[1].bson"));
        assert!(predicate.admits("odd1.bson"));
    }
}
