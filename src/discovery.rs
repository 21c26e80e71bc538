//! Finding the working copies under a base directory.
//!
//! Only direct children of the base directory are considered; a child is a
//! working copy when it contains a `.git` directory. Results are sorted by
//! file name so the table order is stable between runs.

use std::path::{Path, PathBuf};

use log::warn;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Lists the working copies directly below `base`.
///
/// Fails when `base` cannot be read. Unreadable children are skipped with a
/// warning.
pub fn find_repositories(base: &Path) -> Result<Vec<PathBuf>> {
    // Surface an unreadable base directory as a hard error
    std::fs::read_dir(base)?;

    let mut found = Vec::new();
    let walker = WalkDir::new(base)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        if entry.path().join(".git").is_dir() {
            found.push(entry.into_path());
        }
    }
    Ok(found)
}

/// Like [`find_repositories`], but an empty result is an error.
pub fn require_repositories(base: &Path) -> Result<Vec<PathBuf>> {
    let found = find_repositories(base)?;
    if found.is_empty() {
        return Err(Error::NoRepositories {
            path: base.display().to_string(),
        });
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_finds_direct_children_with_git_dir_sorted() {
        let temp = TempDir::new().unwrap();
        let base = temp.path();
        fs::create_dir_all(base.join("zeta/.git")).unwrap();
        fs::create_dir_all(base.join("alpha/.git")).unwrap();
        fs::create_dir_all(base.join("plain")).unwrap();
        fs::create_dir_all(base.join("nested/inner/.git")).unwrap();
        fs::create_dir_all(base.join("gitfile")).unwrap();
        fs::write(base.join("gitfile/.git"), "gitdir: elsewhere").unwrap();
        fs::write(base.join("file.txt"), "x").unwrap();

        let found = find_repositories(base).unwrap();
        assert_eq!(found, vec![base.join("alpha"), base.join("zeta")]);
    }

    #[test]
    fn test_missing_base_is_error() {
        let temp = TempDir::new().unwrap();
        let err = find_repositories(&temp.path().join("missing")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_require_repositories_rejects_empty() {
        let temp = TempDir::new().unwrap();
        let err = require_repositories(temp.path()).unwrap_err();
        assert!(matches!(err, Error::NoRepositories { .. }));
    }
}
