use crate::config::RunConfig;
use crate::error::{ConfigError, Error};
use std::fs;
use std::path::{Path, PathBuf};

/// The starting directory must exist, be a directory and be listable.
pub fn ensure_root(root: &Path) -> Result<(), ConfigError> {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(ConfigError::RootNotDirectory(root.to_path_buf())),
        Err(_) => return Err(ConfigError::RootMissing(root.to_path_buf())),
    }
    fs::read_dir(root)
        .map(drop)
        .map_err(|source| ConfigError::RootUnreadable { path: root.to_path_buf(), source })
}

/// Find the single manifest file directly under `root`.
pub fn discover_manifest(root: &Path, config: &RunConfig) -> Result<PathBuf, Error> {
    ensure_root(root)?;
    let matcher = config.manifest_matcher()?;
    let mut found: Vec<PathBuf> = Vec::new();
    for ent in fs::read_dir(root).map_err(|e| Error::io(root, e))? {
        let ent = ent.map_err(|e| Error::io(root, e))?;
        let name = ent.file_name();
        if !matcher.is_match(name.to_string_lossy().as_ref()) {
            continue;
        }
        if ent.path().is_file() {
            found.push(ent.path());
        }
    }
    found.sort();
    match found.len() {
        0 => Err(ConfigError::NoManifest {
            root: root.to_path_buf(),
            pattern: config.manifest_pattern.clone(),
        }
        .into()),
        1 => Ok(found.remove(0)),
        _ => Err(ConfigError::AmbiguousManifest {
            root: root.to_path_buf(),
            candidates: found
                .iter()
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .collect(),
        }
        .into()),
    }
}
