use std::collections::BTreeMap;
use std::sync::Arc;

use crate::common::constants::{END_DOCID, INVALID_DOCID};
use crate::core::posting_list::{TermMatchData, TermStats};
use crate::core::stream::PostingStream;
use crate::DocId;

/// One doc of a term in the building segment. A delete entry suppresses
/// the doc even when an on-disk segment holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicEntry {
    pub docid: DocId,
    pub is_delete: bool,
}

impl DynamicEntry {
    pub fn add(docid: DocId) -> Self {
        DynamicEntry { docid, is_delete: false }
    }

    pub fn delete(docid: DocId) -> Self {
        DynamicEntry { docid, is_delete: true }
    }
}

/// Seek iterator over a snapshot of one term's building-segment entries.
///
/// The snapshot is immutable and shared between clones, a clone starts over
/// with its own cursor.
#[derive(Debug)]
pub struct DynamicPostingStream {
    entries: Arc<[DynamicEntry]>,
    live_count: u64,
    cursor: usize,
    current_docid: DocId,
}

impl Clone for DynamicPostingStream {
    fn clone(&self) -> Self {
        Self { entries: self.entries.clone(), live_count: self.live_count, cursor: 0, current_docid: INVALID_DOCID }
    }
}

impl DynamicPostingStream {
    /// Builds a stream from entries in any order, the last entry of a doc wins.
    pub fn new<I: IntoIterator<Item = DynamicEntry>>(entries: I) -> Self {
        let by_docid: BTreeMap<DocId, bool> =
            entries.into_iter().map(|entry| (entry.docid, entry.is_delete)).collect();
        Self::from_sorted(by_docid.into_iter().map(|(docid, is_delete)| DynamicEntry { docid, is_delete }).collect())
    }

    /// `entries` must be sorted by doc id without duplicates.
    pub(crate) fn from_sorted(entries: Vec<DynamicEntry>) -> Self {
        debug_assert!(entries.windows(2).all(|w| w[0].docid < w[1].docid));
        let live_count = entries.iter().filter(|entry| !entry.is_delete).count() as u64;
        Self { entries: Arc::from(entries), live_count, cursor: 0, current_docid: INVALID_DOCID }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries that are not deletes.
    pub fn live_count(&self) -> u64 {
        self.live_count
    }

    pub fn current_docid(&self) -> DocId {
        self.current_docid
    }

    /// Returns the next entry, delete or not, whose doc id is
    /// `>= max(target, current + 1)`.
    pub fn seek_with_delete(&mut self, target: DocId) -> Option<DynamicEntry> {
        if self.current_docid == END_DOCID {
            return None;
        }
        let target = target.max(self.current_docid + 1);
        let remaining = &self.entries[self.cursor..];
        self.cursor += remaining.partition_point(|entry| entry.docid < target);
        match self.entries.get(self.cursor) {
            Some(&entry) => {
                self.cursor += 1;
                self.current_docid = entry.docid;
                Some(entry)
            }
            None => {
                self.current_docid = END_DOCID;
                None
            }
        }
    }
}

impl PostingStream for DynamicPostingStream {
    fn seek(&mut self, target: DocId) -> crate::Result<Option<DocId>> {
        let mut target = target;
        while let Some(entry) = self.seek_with_delete(target) {
            if !entry.is_delete {
                return Ok(Some(entry.docid));
            }
            target = entry.docid + 1;
        }
        Ok(None)
    }

    fn unpack(&mut self) -> crate::Result<TermMatchData> {
        if self.current_docid == INVALID_DOCID || self.current_docid == END_DOCID {
            return Ok(TermMatchData::default());
        }
        Ok(TermMatchData::matched_without_data())
    }

    /// The building segment keeps no term frequencies, only the live docs are counted.
    fn term_stats(&self) -> TermStats {
        TermStats { doc_freq: self.live_count, ..Default::default() }
    }

    fn reset(&mut self) {
        self.cursor = 0;
        self.current_docid = INVALID_DOCID;
    }
}
