use crate::config::RunConfig;
use crate::discover::ensure_root;
use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::manifest_codec;
use crate::reconcile::{reconcile_excluding, Reconciliation};
use crate::scan::{scan, ScanProblem};
use std::path::Path;
use tracing::info;

#[derive(Debug)]
pub struct VerifyReport {
    pub reconciliation: Reconciliation,
    pub problems: Vec<ScanProblem>,
}

impl VerifyReport {
    /// Clean means every path matched and nothing failed to read or list.
    pub fn is_clean(&self) -> bool {
        self.reconciliation.is_clean() && self.problems.is_empty()
    }
}

/// Load and decode a manifest file.
pub fn read_manifest(manifest_path: &Path, config: &RunConfig) -> Result<Manifest> {
    let bytes = std::fs::read(manifest_path).map_err(|e| Error::io(manifest_path, e))?;
    let skip = config.manifest_matcher()?;
    manifest_codec::decode_bytes(&bytes, Some(&skip))
        .map_err(|source| Error::Parse { path: manifest_path.to_path_buf(), source })
}

/// Check the tree under `root` against the manifest at `manifest_path`.
/// The manifest is decoded before any file is hashed, so a malformed
/// manifest fails fast.
pub fn verify(manifest_path: &Path, root: &Path, config: &RunConfig) -> Result<VerifyReport> {
    ensure_root(root)?;
    let recorded = read_manifest(manifest_path, config)?;
    info!(records = recorded.len(), manifest = %manifest_path.display(), "manifest loaded");
    let live = scan(root, config)?;
    let reconciliation = reconcile_excluding(&recorded, &live.manifest, |p| live.is_shadowed(p));
    Ok(VerifyReport { reconciliation, problems: live.problems })
}
