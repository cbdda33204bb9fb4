use std::ops::AddAssign;

use crate::{DocFreq, TermFreq};

/// Document frequency and total term frequency of one chain in one segment.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChainStats {
    pub doc_freq: DocFreq,
    pub total_term_freq: u64,
}

impl ChainStats {
    pub fn new(doc_freq: DocFreq, total_term_freq: u64) -> Self {
        Self { doc_freq, total_term_freq }
    }
}

/// Term statistics aggregated over every segment a stream covers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TermStats {
    pub doc_freq: u64,
    pub total_term_freq: u64,
    /// First non-zero term payload in segment creation order.
    pub payload: u16,
}

impl AddAssign<(ChainStats, u16)> for TermStats {
    fn add_assign(&mut self, (stats, payload): (ChainStats, u16)) {
        self.doc_freq += u64::from(stats.doc_freq);
        self.total_term_freq += stats.total_term_freq;
        if self.payload == 0 {
            self.payload = payload;
        }
    }
}

/// Per-document data of the document a stream is positioned on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TermMatchData {
    pub matched: bool,
    pub term_freq: Option<TermFreq>,
    pub doc_payload: Option<u32>,
    pub field_map: Option<u32>,
}

impl TermMatchData {
    /// A hit that carries no term data, e.g. one only seen in the building segment.
    pub fn matched_without_data() -> Self {
        TermMatchData { matched: true, ..Default::default() }
    }

    pub fn has_term_data(&self) -> bool {
        self.term_freq.is_some() || self.doc_payload.is_some() || self.field_map.is_some()
    }
}
