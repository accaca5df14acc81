use crate::types::MetadataRecord;
use std::collections::BTreeMap;

/// Position-keyed metadata, one record per indexed vector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataStore {
    records: BTreeMap<usize, MetadataRecord>,
}

impl MetadataStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate a record with a position, replacing any previous one
    pub fn put(&mut self, position: usize, record: MetadataRecord) {
        self.records.insert(position, record);
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<&MetadataRecord> {
        self.records.get(&position)
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Highest file id referenced by any record (0 when empty)
    #[must_use]
    pub fn max_file_id(&self) -> u64 {
        self.records
            .values()
            .map(|record| record.file_id)
            .max()
            .unwrap_or(0)
    }

    /// First position in `0..count` without a record
    #[must_use]
    pub fn first_gap(&self, count: usize) -> Option<usize> {
        (0..count).find(|position| !self.records.contains_key(position))
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &MetadataRecord)> {
        self.records.iter().map(|(position, record)| (*position, record))
    }
}

impl FromIterator<(usize, MetadataRecord)> for MetadataStore {
    fn from_iter<I: IntoIterator<Item = (usize, MetadataRecord)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
