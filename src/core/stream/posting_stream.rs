use enum_dispatch::enum_dispatch;

use crate::core::posting_list::{TermMatchData, TermStats};
use crate::core::stream::{
    BufferedPostingStream, CompositePostingStream, DynamicPostingStream, FilteredPostingStream,
};
use crate::DocId;

/// Forward-only doc id iterator over the postings of one term.
#[enum_dispatch]
pub trait PostingStream {
    /// Moves to the smallest doc id `>= max(target, current + 1)`.
    /// Returns `Ok(None)` once the stream is exhausted, and keeps doing so.
    fn seek(&mut self, target: DocId) -> crate::Result<Option<DocId>>;

    /// Term data of the doc the stream is on. Not matched before the first
    /// seek and after the end.
    fn unpack(&mut self) -> crate::Result<TermMatchData>;

    /// Statistics fixed when the stream was built.
    fn term_stats(&self) -> TermStats;

    /// Rewinds to the state right after construction.
    fn reset(&mut self);
}

/// Every stream shape a lookup can hand out. The shape is picked once when
/// the lookup assembles the stream.
#[enum_dispatch(PostingStream)]
#[derive(Debug, Clone)]
pub enum TermPostingStream {
    BufferedPostingStream,
    DynamicPostingStream,
    CompositePostingStream,
    FilteredPostingStream,
}

impl TermPostingStream {
    /// Collects every remaining doc id.
    pub fn collect_docids(&mut self) -> crate::Result<Vec<DocId>> {
        let mut docids = Vec::new();
        let mut target = 0;
        while let Some(docid) = self.seek(target)? {
            docids.push(docid);
            target = docid + 1;
        }
        Ok(docids)
    }
}
