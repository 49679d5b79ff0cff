use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::types::NameSet;

/// Fail with `InvalidDirectory` unless `path` is an existing directory
pub fn validate_directory(path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(Error::InvalidDirectory(path.to_path_buf()))
    }
}

/// Regular files directly inside `directory` (no recursion), sorted by path.
///
/// Paths are absolute even when `directory` is given relative to the working
/// directory.
pub fn list_file_paths(directory: &Path) -> Result<Vec<PathBuf>> {
    validate_directory(directory)?;
    let directory = fs::canonicalize(directory).map_err(Error::at("resolve", directory))?;
    let directory = directory.as_path();

    let mut paths: Vec<PathBuf> = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", directory.display(), e);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();

    paths.sort();
    debug!("Listed {} files in {}", paths.len(), directory.display());
    Ok(paths)
}

/// Names of the regular files directly inside `directory`.
///
/// Names that are not valid UTF-8 cannot take part in suffix renaming and are
/// left out with a warning.
pub fn list_file_names(directory: &Path) -> Result<NameSet> {
    let mut names = NameSet::new();

    for path in list_file_paths(directory)? {
        let Some(name) = path.file_name() else {
            continue;
        };
        match name.to_str() {
            Some(name) => {
                names.insert(name.to_string());
            }
            None => warn!("Skipping file with non UTF-8 name: {}", path.display()),
        }
    }

    Ok(names)
}

// -- Tests --
