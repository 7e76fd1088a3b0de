//! Recursive discovery of input files.

use crate::error::EtlError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Suffix of both catalog and event files.
pub const JSON_SUFFIX: &str = ".json";

/// Lists every regular file under `root` whose name ends with `suffix`.
///
/// Paths are absolute and sorted lexicographically so runs are reproducible.
/// A root without matching files yields an empty list.
pub fn list_files(root: &Path, suffix: &str) -> Result<Vec<PathBuf>, EtlError> {
    let root = root.canonicalize().map_err(|source| EtlError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in WalkDir::new(&root).follow_links(true) {
        let entry = entry.map_err(|source| EtlError::Listing {
            root: root.clone(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(suffix));
        if matches {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}
