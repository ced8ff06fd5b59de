use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty path")]
    Empty,
    #[error("absolute paths are not allowed: {0:?}")]
    Absolute(String),
    #[error("parent traversal not allowed: {0:?}")]
    ParentTraversal(String),
    #[error("empty path component in {0:?}")]
    EmptyComponent(String),
    #[error("file name is not valid UTF-8: {0:?}")]
    NotUtf8(PathBuf),
    #[error("line break in file name: {0:?}")]
    LineBreak(String),
    #[error("backslash in file name: {0:?}")]
    Backslash(String),
}

/// A file location relative to the tree root, always `/`-separated.
///
/// Equality is byte equality of the normalized form. Ordering compares
/// component by component, which is the order a depth-first walk visits
/// files when siblings are sorted by name.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FilePath(String);

impl FilePath {
    /// Parse a path as written in a manifest. Backslashes are accepted as
    /// separators and `.` components are dropped.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }
        if raw.contains(['\r', '\n']) {
            return Err(PathError::LineBreak(raw.to_string()));
        }
        let slashed = raw.replace('\\', "/");
        if slashed.starts_with('/') || has_drive_prefix(&slashed) {
            return Err(PathError::Absolute(raw.to_string()));
        }
        let mut parts: Vec<&str> = Vec::new();
        for comp in slashed.split('/') {
            match comp {
                "" => return Err(PathError::EmptyComponent(raw.to_string())),
                "." => continue,
                ".." => return Err(PathError::ParentTraversal(raw.to_string())),
                c => parts.push(c),
            }
        }
        if parts.is_empty() {
            return Err(PathError::Empty);
        }
        Ok(Self(parts.join("/")))
    }

    /// Build from a host path that is already relative to the root.
    pub fn from_relative(rel: &Path) -> Result<Self, PathError> {
        let mut parts: Vec<&str> = Vec::new();
        for comp in rel.components() {
            match comp {
                Component::Normal(os) => {
                    let s = os.to_str().ok_or_else(|| PathError::NotUtf8(rel.to_path_buf()))?;
                    if s.contains(['\r', '\n']) {
                        return Err(PathError::LineBreak(s.to_string()));
                    }
                    // Manifests read `\` as a separator.
                    if s.contains('\\') {
                        return Err(PathError::Backslash(s.to_string()));
                    }
                    // Manifests read a leading `C:` as a drive.
                    if parts.is_empty() && has_drive_prefix(s) {
                        return Err(PathError::Absolute(s.to_string()));
                    }
                    parts.push(s);
                }
                Component::CurDir => {}
                Component::ParentDir => {
                    return Err(PathError::ParentTraversal(rel.display().to_string()))
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(PathError::Absolute(rel.display().to_string()))
                }
            }
        }
        if parts.is_empty() {
            return Err(PathError::Empty);
        }
        Ok(Self(parts.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last component.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// True when `self` lies strictly below the directory `dir`.
    pub fn is_under(&self, dir: &FilePath) -> bool {
        self.0.len() > dir.0.len()
            && self.0.starts_with(&dir.0)
            && self.0.as_bytes()[dir.0.len()] == b'/'
    }

    /// Host path of this file under `root`.
    pub fn to_native(&self, root: &Path) -> PathBuf {
        let mut out = root.to_path_buf();
        for comp in self.components() {
            out.push(comp);
        }
        out
    }
}

impl Ord for FilePath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components().cmp(other.components())
    }
}

impl PartialOrd for FilePath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl Serialize for FilePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// `C:`, `c:x` and the like: a Windows drive, never a relative path.
fn has_drive_prefix(path: &str) -> bool {
    matches!(path.as_bytes(), [letter, b':', ..] if letter.is_ascii_alphabetic())
}
