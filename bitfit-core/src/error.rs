//! Error taxonomy.
//!
//! Traversal and per-file errors are collected during a scan and never abort
//! it. Parse and configuration errors are fatal and surface as [`Error`].

use crate::path::{FilePath, PathError};
use std::path::PathBuf;
use thiserror::Error;

/// A directory entry could not be listed or named.
#[derive(Debug, Error)]
pub enum TraversalError {
    #[error("Unable to list {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("Unsupported file name {}: {source}", path.display())]
    Name {
        path: PathBuf,
        #[source]
        source: PathError,
    },
}

impl TraversalError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            TraversalError::Walk { path, .. } | TraversalError::Name { path, .. } => path,
        }
    }
}

/// A file could not be opened or read to the end.
#[derive(Debug, Error)]
#[error("Unable to read the file {path}: {source}")]
pub struct UnreadableFile {
    pub path: FilePath,
    #[source]
    pub source: std::io::Error,
}

/// Structural problem in manifest text. Line numbers are 1-based.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("manifest is not valid UTF-8")]
    NotUtf8,
    #[error("line {line}: expected 3 fields (path,md5,sha1), found {found}")]
    FieldCount { line: usize, found: usize },
    #[error("line {line}: empty {field} field")]
    EmptyField { line: usize, field: &'static str },
    #[error("line {line}: {field} is not {width} hex digits: {value:?}")]
    BadDigest { line: usize, field: &'static str, width: usize, value: String },
    #[error("line {line}: unterminated quoted path")]
    BadQuoting { line: usize },
    #[error("line {line}: invalid path")]
    BadPath {
        line: usize,
        #[source]
        source: PathError,
    },
    #[error("line {line}: duplicate record for {path}")]
    DuplicatePath { line: usize, path: FilePath },
}

/// Problems detected before any traversal starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Starting directory {} does not exist", .0.display())]
    RootMissing(PathBuf),
    #[error("Starting directory {} is not a directory", .0.display())]
    RootNotDirectory(PathBuf),
    #[error("Starting directory {} cannot be read", path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No file matching {pattern} in the starting directory {}", root.display())]
    NoManifest { root: PathBuf, pattern: String },
    #[error(
        "Too many matching filenames for verification in the starting directory {}: {}. Please rename or move the files.",
        root.display(),
        candidates.join(", ")
    )]
    AmbiguousManifest { root: PathBuf, candidates: Vec<String> },
    #[error("Invalid manifest pattern {pattern:?}")]
    BadPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// Fatal errors: the run stops and nothing is reconciled.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Invalid manifest {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
    #[error("I/O error at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
