use crate::manifest::Manifest;
use crate::path::FilePath;
use serde::Serialize;
use std::cmp::Ordering;

/// Classification of one path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Recorded and on disk with identical digests.
    Match,
    /// Recorded and on disk, contents differ.
    Mismatch,
    /// On disk but not recorded.
    ExtraOnDisk,
    /// Recorded but no longer on disk.
    MissingFromDisk,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub path: FilePath,
    pub outcome: Outcome,
}

/// Every path of `recorded ∪ live`, each exactly once, in traversal order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    entries: Vec<Entry>,
}

impl Reconciliation {
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Entries other than [`Outcome::Match`].
    pub fn discrepancies(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.outcome != Outcome::Match)
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.entries.iter().filter(|e| e.outcome == outcome).count()
    }

    pub fn is_clean(&self) -> bool {
        self.discrepancies().next().is_none()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compare a recorded manifest against a live one.
pub fn reconcile(recorded: &Manifest, live: &Manifest) -> Reconciliation {
    reconcile_excluding(recorded, live, |_| false)
}

/// Like [`reconcile`], but recorded-only paths for which `excluded` holds
/// are left out entirely. Used for files that exist but could not be read.
pub fn reconcile_excluding<F>(recorded: &Manifest, live: &Manifest, excluded: F) -> Reconciliation
where
    F: Fn(&FilePath) -> bool,
{
    let mut entries = Vec::with_capacity(recorded.len().max(live.len()));
    let mut rec = recorded.iter().peekable();
    let mut obs = live.iter().peekable();

    loop {
        let ord = match (rec.peek(), obs.peek()) {
            (None, None) => break,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some((rp, _)), Some((lp, _))) => rp.cmp(lp),
        };
        match ord {
            Ordering::Less => {
                if let Some((path, _)) = rec.next() {
                    if !excluded(path) {
                        entries.push(Entry { path: path.clone(), outcome: Outcome::MissingFromDisk });
                    }
                }
            }
            Ordering::Greater => {
                if let Some((path, _)) = obs.next() {
                    entries.push(Entry { path: path.clone(), outcome: Outcome::ExtraOnDisk });
                }
            }
            Ordering::Equal => {
                if let (Some((path, want)), Some((_, got))) = (rec.next(), obs.next()) {
                    let outcome = if want == got { Outcome::Match } else { Outcome::Mismatch };
                    entries.push(Entry { path: path.clone(), outcome });
                }
            }
        }
    }
    Reconciliation { entries }
}
