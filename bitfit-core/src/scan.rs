use crate::catalog::PathCatalog;
use crate::config::RunConfig;
use crate::digest::Digester;
use crate::discover::ensure_root;
use crate::error::{ConfigError, TraversalError, UnreadableFile};
use crate::manifest::Manifest;
use crate::path::FilePath;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// Non-fatal problem met while building the live manifest.
#[derive(Debug)]
pub enum ScanProblem {
    Traversal(TraversalError),
    Unreadable(UnreadableFile),
}

impl fmt::Display for ScanProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanProblem::Traversal(e) => fmt::Display::fmt(e, f),
            ScanProblem::Unreadable(e) => fmt::Display::fmt(e, f),
        }
    }
}

/// Digests of every readable file under a root, plus what went wrong.
#[derive(Debug)]
pub struct Scan {
    pub manifest: Manifest,
    pub problems: Vec<ScanProblem>,
    /// Directories (relative) that could not be listed.
    unlisted_dirs: Vec<FilePath>,
}

impl Scan {
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }

    /// True when nothing can be said about `path` from this scan: the file
    /// itself was unreadable or lies in a directory that could not be
    /// listed.
    pub fn is_shadowed(&self, path: &FilePath) -> bool {
        self.problems.iter().any(|p| matches!(p, ScanProblem::Unreadable(u) if &u.path == path))
            || self.unlisted_dirs.iter().any(|d| path.is_under(d))
    }

    pub fn unreadable(&self) -> impl Iterator<Item = &UnreadableFile> {
        self.problems.iter().filter_map(|p| match p {
            ScanProblem::Unreadable(u) => Some(u),
            ScanProblem::Traversal(_) => None,
        })
    }
}

/// Walk `root` and hash each file with the configured mode. Fails only when
/// the root itself is unusable.
pub fn scan(root: &Path, config: &RunConfig) -> Result<Scan, ConfigError> {
    ensure_root(root)?;
    let catalog = PathCatalog::new(root, config)?;
    let mut digester = Digester::new(config.hash_mode);
    let mut builder = Manifest::builder();
    let mut problems = Vec::new();
    let mut unlisted_dirs = Vec::new();

    for item in catalog {
        let entry = match item {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "traversal problem");
                if let TraversalError::Walk { path, .. } = &err {
                    if let Some(rel) = pathdiff::diff_paths(path, root) {
                        if let Ok(dir) = FilePath::from_relative(&rel) {
                            unlisted_dirs.push(dir);
                        }
                    }
                }
                problems.push(ScanProblem::Traversal(err));
                continue;
            }
        };
        match digester.digest_file(&entry.location) {
            Ok(digests) => {
                debug!(path = %entry.path, md5 = %digests.md5_hex(), "hashed");
                // Catalog paths are unique within one walk.
                if let Err(dup) = builder.insert(entry.path, digests) {
                    debug!(path = %dup, "duplicate catalog path ignored");
                }
            }
            Err(source) => {
                warn!(path = %entry.path, error = %source, "unreadable file");
                problems.push(ScanProblem::Unreadable(UnreadableFile { path: entry.path, source }));
            }
        }
    }

    let manifest = builder.build();
    debug!(files = manifest.len(), problems = problems.len(), "scan complete");
    Ok(Scan { manifest, problems, unlisted_dirs })
}
