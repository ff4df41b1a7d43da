//! Ordered mapping from coverage identifier to descriptor.

use std::collections::HashMap;

use crate::coverage::ContentMetadata;

/// Coverages in capabilities-document order, keyed by identifier.
///
/// Inserting an identifier that is already present replaces the descriptor
/// but keeps its original position.
#[derive(Debug, Clone, Default)]
pub struct CoverageContents {
    entries: Vec<ContentMetadata>,
    index: HashMap<String, usize>,
}

impl CoverageContents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a descriptor, returning the one it replaced.
    pub fn insert(&mut self, coverage: ContentMetadata) -> Option<ContentMetadata> {
        match self.index.get(&coverage.id) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos], coverage)),
            None => {
                self.index.insert(coverage.id.clone(), self.entries.len());
                self.entries.push(coverage);
                None
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&ContentMetadata> {
        self.index.get(id).map(|&pos| &self.entries[pos])
    }

    pub fn contains_key(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|c| c.id.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &ContentMetadata> {
        self.entries.iter()
    }

    /// (identifier, descriptor) pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContentMetadata)> {
        self.entries.iter().map(|c| (c.id.as_str(), c))
    }
}

impl<'a> IntoIterator for &'a CoverageContents {
    type Item = &'a ContentMetadata;
    type IntoIter = std::slice::Iter<'a, ContentMetadata>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
