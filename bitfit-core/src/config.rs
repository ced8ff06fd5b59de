use crate::error::ConfigError;
use globset::{Glob, GlobMatcher};
use std::num::NonZeroUsize;

/// Block size used by the low-memory mode.
pub const LOW_MEMORY_CHUNK: usize = 64 * 1024;

/// Largest block size accepted for chunked hashing (1 GiB).
pub const MAX_CHUNK: usize = 1 << 30;

/// Default name pattern for manifest files at the tree root.
pub const DEFAULT_MANIFEST_PATTERN: &str = "VERSION-*.txt";

/// How file contents are fed to the hashers. Both modes produce the same
/// digests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HashMode {
    /// Read the whole file into one buffer, then hash it.
    #[default]
    WholeFile,
    /// Read and hash fixed-size blocks, at most [`MAX_CHUNK`] bytes each.
    Chunked(NonZeroUsize),
}

impl HashMode {
    pub fn low_memory() -> Self {
        match NonZeroUsize::new(LOW_MEMORY_CHUNK) {
            Some(n) => HashMode::Chunked(n),
            None => HashMode::WholeFile,
        }
    }
}

/// Options for one run, built once and passed down explicitly.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub hash_mode: HashMode,
    /// Descend into symlinked directories. Symlinks to regular files are
    /// always hashed.
    pub follow_symlinks: bool,
    /// Glob matched against file names to recognise manifest files.
    pub manifest_pattern: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            hash_mode: HashMode::WholeFile,
            follow_symlinks: false,
            manifest_pattern: DEFAULT_MANIFEST_PATTERN.to_string(),
        }
    }
}

impl RunConfig {
    /// Compile `manifest_pattern` for matching bare file names.
    pub fn manifest_matcher(&self) -> Result<GlobMatcher, ConfigError> {
        Glob::new(&self.manifest_pattern)
            .map(|g| g.compile_matcher())
            .map_err(|source| ConfigError::BadPattern {
                pattern: self.manifest_pattern.clone(),
                source,
            })
    }
}
