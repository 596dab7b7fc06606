//! Writing a filtered dump directory to `.tar.gz` and moving it into place.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use ignore::WalkBuilder;

use crate::error::ArchiveError;
use crate::filter::{ArchiveFilter, FilePredicate};

/// One archive to build.
#[derive(Debug, Clone)]
pub struct ArchiveRequest {
    /// Directory whose (filtered) contents are archived under its own name.
    pub source: PathBuf,
    pub filter: ArchiveFilter,
    /// File stem of the archive; `.tar.gz` is appended.
    pub stem: String,
    /// Directory the finished archive is moved into.
    pub destination: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltArchive {
    pub path: PathBuf,
    /// Entry names inside the archive, sorted.
    pub entries: Vec<String>,
    pub bytes: u64,
}

/// Files under `root` admitted by `predicate`, as sorted relative paths.
///
/// Walks every file, hidden or ignored alike; archives must be complete.
pub fn collect_entries(root: &Path, predicate: &FilePredicate) -> Result<Vec<PathBuf>, ArchiveError> {
    let mut entries = Vec::new();
    for result in WalkBuilder::new(root)
        .standard_filters(false)
        .hidden(false)
        .follow_links(false)
        .build()
    {
        let entry = result?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !predicate.admits(&name) {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            entries.push(relative.to_path_buf());
        }
    }
    entries.sort();
    Ok(entries)
}

/// Build `{destination}/{stem}.tar.gz` from `source`.
///
/// The archive is written next to `source` first and renamed into
/// `destination` once complete, so a partially written file never appears in
/// the backups directory.
pub fn build_archive(request: &ArchiveRequest) -> Result<BuiltArchive, ArchiveError> {
    let source = &request.source;
    let (Some(dir_name), Some(parent)) = (source.file_name(), source.parent()) else {
        return Err(ArchiveError::InvalidSource(source.clone()));
    };
    if !source.is_dir() {
        return Err(ArchiveError::InvalidSource(source.clone()));
    }

    let predicate = request.filter.predicate()?;
    let files = collect_entries(source, &predicate)?;
    if files.is_empty() {
        return Err(ArchiveError::Empty(source.clone()));
    }

    let file_name = format!("{}.tar.gz", request.stem);
    let staging = parent.join(format!(".{file_name}.partial"));
    let entries = write_tar_gz(source, Path::new(dir_name), &files, &staging)?;

    fs::create_dir_all(&request.destination)
        .map_err(ArchiveError::io("creating", &request.destination))?;
    let path = request.destination.join(&file_name);
    fs::rename(&staging, &path).map_err(ArchiveError::io("moving archive to", &path))?;
    let bytes = fs::metadata(&path)
        .map_err(ArchiveError::io("reading metadata of", &path))?
        .len();

    tracing::info!(
        archive = %path.display(),
        files = entries.len(),
        bytes,
        "archive built"
    );
    Ok(BuiltArchive {
        path,
        entries,
        bytes,
    })
}

fn write_tar_gz(
    source: &Path,
    prefix: &Path,
    files: &[PathBuf],
    out: &Path,
) -> Result<Vec<String>, ArchiveError> {
    let file = File::create(out).map_err(ArchiveError::io("creating", out))?;
    let mut tar = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    let mut names = Vec::with_capacity(files.len());

    for relative in files {
        let name = prefix.join(relative);
        tar.append_path_with_name(source.join(relative), &name)
            .map_err(ArchiveError::io("archiving", source.join(relative)))?;
        names.push(name.to_string_lossy().replace('\\', "/"));
    }

    let encoder = tar.into_inner().map_err(ArchiveError::io("finishing", out))?;
    let file = encoder.finish().map_err(ArchiveError::io("compressing", out))?;
    file.sync_all().map_err(ArchiveError::io("syncing", out))?;
    Ok(names)
}
