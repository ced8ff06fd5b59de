use crate::digest::DigestSet;
use crate::path::FilePath;
use std::collections::btree_map::{self, BTreeMap, Entry};

/// Mapping from file path to expected digests. Built once through
/// [`ManifestBuilder`] and read-only afterwards. Iteration follows
/// [`FilePath`] order, which is also the catalog's traversal order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    records: BTreeMap<FilePath, DigestSet>,
}

impl Manifest {
    pub fn builder() -> ManifestBuilder {
        ManifestBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, path: &FilePath) -> Option<&DigestSet> {
        self.records.get(path)
    }

    pub fn contains(&self, path: &FilePath) -> bool {
        self.records.contains_key(path)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, FilePath, DigestSet> {
        self.records.iter()
    }

    pub fn paths(&self) -> btree_map::Keys<'_, FilePath, DigestSet> {
        self.records.keys()
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = (&'a FilePath, &'a DigestSet);
    type IntoIter = btree_map::Iter<'a, FilePath, DigestSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[derive(Debug, Default)]
pub struct ManifestBuilder {
    records: BTreeMap<FilePath, DigestSet>,
}

impl ManifestBuilder {
    /// Add a record. A path that is already present is refused and handed
    /// back.
    pub fn insert(&mut self, path: FilePath, digests: DigestSet) -> Result<(), FilePath> {
        match self.records.entry(path) {
            Entry::Occupied(e) => Err(e.key().clone()),
            Entry::Vacant(e) => {
                e.insert(digests);
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn build(self) -> Manifest {
        Manifest { records: self.records }
    }
}
