use crate::config::RunConfig;
use crate::error::{ConfigError, TraversalError};
use crate::path::FilePath;
use globset::GlobMatcher;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// One regular file found under the root.
#[derive(Clone, Debug)]
pub struct CatalogEntry {
    pub path: FilePath,
    /// Location on disk, for opening.
    pub location: PathBuf,
}

/// Lazy depth-first listing of the regular files under a root.
///
/// Siblings are visited in file-name order, so the sequence is stable across
/// runs and matches [`FilePath`] ordering. Manifest files are left out.
/// Directories that cannot be listed show up as `Err` items and the walk
/// goes on with their siblings.
pub struct PathCatalog {
    root: PathBuf,
    walker: walkdir::IntoIter,
    manifest_names: GlobMatcher,
    follow_symlinks: bool,
    seen_dirs: HashSet<PathBuf>,
}

impl PathCatalog {
    pub fn new(root: &Path, config: &RunConfig) -> Result<Self, ConfigError> {
        let manifest_names = config.manifest_matcher()?;
        let walker = WalkDir::new(root)
            .min_depth(1)
            .follow_links(config.follow_symlinks)
            .sort_by_file_name()
            .into_iter();
        Ok(Self {
            root: root.to_path_buf(),
            walker,
            manifest_names,
            follow_symlinks: config.follow_symlinks,
            seen_dirs: HashSet::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn relative(&self, path: &Path) -> PathBuf {
        pathdiff::diff_paths(path, &self.root).unwrap_or_else(|| path.to_path_buf())
    }

    fn admit_dir(&mut self, path: &Path) -> bool {
        if !self.follow_symlinks {
            return true;
        }
        match std::fs::canonicalize(path) {
            Ok(real) => self.seen_dirs.insert(real),
            // walkdir reports the failure when it tries to list it.
            Err(_) => true,
        }
    }
}

impl Iterator for PathCatalog {
    type Item = Result<CatalogEntry, TraversalError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let ent = match self.walker.next()? {
                Ok(ent) => ent,
                Err(err) => {
                    if err.loop_ancestor().is_some() {
                        debug!(error = %err, "symlink loop, not descending");
                        continue;
                    }
                    let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| self.root.clone());
                    return Some(Err(TraversalError::Walk { path, source: err }));
                }
            };

            let ft = ent.file_type();
            if ft.is_dir() {
                if !self.admit_dir(ent.path()) {
                    debug!(path = %ent.path().display(), "directory already visited");
                    self.walker.skip_current_dir();
                }
                continue;
            }

            let is_file = if ft.is_symlink() {
                // Only reached when not following links: take a symlink for
                // what it points at, but never descend through it.
                match std::fs::metadata(ent.path()) {
                    Ok(meta) => meta.is_file(),
                    // Dangling: keep it so the read failure gets reported.
                    Err(_) => true,
                }
            } else {
                ft.is_file()
            };
            if !is_file {
                debug!(path = %ent.path().display(), "skipping non-regular entry");
                continue;
            }

            let name = ent.file_name().to_string_lossy();
            if self.manifest_names.is_match(name.as_ref()) {
                debug!(path = %ent.path().display(), "skipping manifest file");
                continue;
            }

            let rel = self.relative(ent.path());
            return Some(match FilePath::from_relative(&rel) {
                Ok(path) => Ok(CatalogEntry { path, location: ent.into_path() }),
                Err(source) => Err(TraversalError::Name { path: ent.into_path(), source }),
            });
        }
    }
}
