//! Expansion of file and directory arguments into a flat list of files.

use crate::error::{IngestError, IngestResult};
use glob::Pattern;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use walkdir::WalkDir;

/// Resolves input paths into the files beneath them.
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    ignore: Vec<Pattern>,
}

impl PathResolver {
    /// Create a resolver that prunes entries whose name matches any pattern.
    pub fn new<S: AsRef<str>>(ignore_patterns: &[S]) -> IngestResult<Self> {
        let ignore = ignore_patterns
            .iter()
            .map(|p| {
                Pattern::new(p.as_ref()).map_err(|e| IngestError::InvalidPattern {
                    pattern: p.as_ref().to_string(),
                    message: e.to_string(),
                })
            })
            .collect::<IngestResult<Vec<_>>>()?;

        Ok(Self { ignore })
    }

    /// Expand `paths` into regular files, recursing into directories depth-first.
    ///
    /// Directories are never part of the output. Paths given explicitly are
    /// never pruned by the ignore list. Duplicates keep their first position.
    pub fn resolve(
        &self,
        token: &CancellationToken,
        paths: &[PathBuf],
    ) -> IngestResult<Vec<PathBuf>> {
        let mut seen = HashSet::new();
        let mut files = Vec::new();

        for root in paths {
            if token.is_cancelled() {
                return Err(IngestError::Cancelled);
            }

            let walker = WalkDir::new(root)
                .follow_links(true)
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !self.is_ignored(e.file_name()));

            for entry in walker {
                if token.is_cancelled() {
                    return Err(IngestError::Cancelled);
                }

                let entry = entry.map_err(|e| walk_error(root, e))?;
                if entry.file_type().is_dir() {
                    continue;
                }

                let path = entry.into_path();
                if seen.insert(dedup_key(&path)) {
                    files.push(path);
                }
            }
        }

        debug!("Resolved {} input path(s) into {} file(s)", paths.len(), files.len());

        Ok(files)
    }

    fn is_ignored(&self, name: &OsStr) -> bool {
        let name = name.to_string_lossy();
        self.ignore.iter().any(|p| p.matches(&name))
    }
}

/// The same file reached through `./`, `..` or a symlink shares one key.
fn dedup_key(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn walk_error(root: &Path, err: walkdir::Error) -> IngestError {
    let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
    IngestError::from_io(path, err.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join("README.md"), "readme").unwrap();
        fs::write(dir.path().join("src/lib.rs"), "lib").unwrap();
        fs::write(dir.path().join("src/nested/mod.rs"), "mod").unwrap();
        fs::write(dir.path().join(".git/HEAD"), "ref").unwrap();
        dir
    }

    fn sorted(mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
        paths.sort();
        paths
    }

    #[test]
    fn test_resolve_single_file() {
        let dir = fixture();
        let file = dir.path().join("README.md");

        let files = PathResolver::default()
            .resolve(&CancellationToken::new(), &[file.clone()])
            .unwrap();

        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_resolve_directory_recursively() {
        let dir = fixture();

        let files = PathResolver::new(&[".git"])
            .unwrap()
            .resolve(&CancellationToken::new(), &[dir.path().to_path_buf()])
            .unwrap();

        assert_eq!(
            sorted(files),
            sorted(vec![
                dir.path().join("README.md"),
                dir.path().join("src/lib.rs"),
                dir.path().join("src/nested/mod.rs"),
            ])
        );
    }

    #[test]
    fn test_resolve_without_ignores_includes_everything() {
        let dir = fixture();

        let files = PathResolver::default()
            .resolve(&CancellationToken::new(), &[dir.path().to_path_buf()])
            .unwrap();

        assert_eq!(files.len(), 4);
        assert!(files.contains(&dir.path().join(".git/HEAD")));
    }

    #[test]
    fn test_resolve_deduplicates() {
        let dir = fixture();
        let src = dir.path().join("src");
        let lib = src.join("lib.rs");

        let files = PathResolver::default()
            .resolve(&CancellationToken::new(), &[lib.clone(), src, lib.clone()])
            .unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(files[0], lib);
    }

    #[test]
    fn test_resolve_deduplicates_differently_spelled_paths() {
        let dir = fixture();
        let lib = dir.path().join("src/lib.rs");
        let roundabout = dir.path().join("src/nested/../lib.rs");

        let files = PathResolver::default()
            .resolve(&CancellationToken::new(), &[lib.clone(), roundabout])
            .unwrap();

        assert_eq!(files, vec![lib]);
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_deduplicates_symlinked_file() {
        let dir = fixture();
        let lib = dir.path().join("src/lib.rs");
        let link = dir.path().join("lib-link.rs");
        std::os::unix::fs::symlink(&lib, &link).unwrap();

        let files = PathResolver::default()
            .resolve(&CancellationToken::new(), &[lib.clone(), link])
            .unwrap();

        // The first spelling is kept as given.
        assert_eq!(files, vec![lib]);
    }

    #[test]
    fn test_resolve_missing_path() {
        let dir = fixture();
        let missing = dir.path().join("missing.txt");

        let err = PathResolver::default()
            .resolve(&CancellationToken::new(), &[missing.clone()])
            .unwrap_err();

        match err {
            IngestError::NotFound { path } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_cancelled() {
        let dir = fixture();
        let token = CancellationToken::new();
        token.cancel();

        let err = PathResolver::default()
            .resolve(&token, &[dir.path().to_path_buf()])
            .unwrap_err();

        assert!(err.is_cancelled());
    }

    #[test]
    fn test_invalid_pattern() {
        let err = PathResolver::new(&["[unclosed"]).unwrap_err();
        assert!(matches!(err, IngestError::InvalidPattern { .. }));
    }
}
