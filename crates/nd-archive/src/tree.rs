//! Working-directory housekeeping.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::ArchiveError;

/// Move every file from `dir`'s subdirectories up into `dir`, then remove the
/// subdirectories.
///
/// Dump tools write `{out}/{db}/{collection}.bson`; archives want the
/// collections at the top. Files whose names contain `skip_marker` are
/// discarded with their directory. Returns the number of files moved.
pub fn flatten_nested(dir: &Path, skip_marker: &str) -> Result<usize, ArchiveError> {
    let mut moved = 0;
    for nested in read_dir(dir)? {
        if !nested.is_dir() {
            continue;
        }
        for file in read_dir(&nested)? {
            let Some(name) = file.file_name() else {
                continue;
            };
            if !file.is_file() || name.to_string_lossy().contains(skip_marker) {
                continue;
            }
            let target = dir.join(name);
            fs::rename(&file, &target).map_err(ArchiveError::io("moving", &file))?;
            moved += 1;
        }
        remove_tree(&nested)?;
    }
    tracing::debug!(dir = %dir.display(), moved, "flattened dump");
    Ok(moved)
}

/// Remove `path` and everything below it. Missing paths are fine.
pub fn remove_tree(path: &Path) -> Result<(), ArchiveError> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotADirectory => {
            fs::remove_file(path).map_err(ArchiveError::io("removing", path))
        }
        Err(source) => Err(ArchiveError::Io {
            action: "removing",
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Empty `dir` but keep it. Missing directories are fine.
pub fn clear_dir(dir: &Path) -> Result<(), ArchiveError> {
    let children = match fs::read_dir(dir) {
        Ok(children) => children,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(source) => {
            return Err(ArchiveError::Io {
                action: "listing",
                path: dir.to_path_buf(),
                source,
            });
        }
    };
    for child in children {
        let child = child.map_err(ArchiveError::io("listing", dir))?;
        remove_tree(&child.path())?;
    }
    Ok(())
}

fn read_dir(dir: &Path) -> Result<Vec<std::path::PathBuf>, ArchiveError> {
    let mut paths = fs::read_dir(dir)
        .map_err(ArchiveError::io("listing", dir))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(ArchiveError::io("listing", dir))?;
    paths.sort();
    Ok(paths)
}
