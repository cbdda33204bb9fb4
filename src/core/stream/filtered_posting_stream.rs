use std::fmt;

use crate::core::posting_list::{TermMatchData, TermStats};
use crate::core::stream::{PostingStream, TermPostingStream};
use crate::DocId;

/// Exact per-document check behind an index kind that over-approximates its hits.
pub trait AttributeValueReader: Send + Sync + fmt::Debug {
    fn test(&mut self, docid: DocId) -> bool;

    fn box_clone(&self) -> Box<dyn AttributeValueReader>;
}

impl Clone for Box<dyn AttributeValueReader> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Wraps a stream and drops the candidates its filter rejects.
///
/// The filter has a single owner: [`FilteredPostingStream::take_filter`]
/// moves it out, after which the wrapper passes every candidate through.
#[derive(Debug, Clone)]
pub struct FilteredPostingStream {
    inner: Box<TermPostingStream>,
    filter: Option<Box<dyn AttributeValueReader>>,
}

impl FilteredPostingStream {
    pub fn new(inner: TermPostingStream, filter: Box<dyn AttributeValueReader>) -> Self {
        Self { inner: Box::new(inner), filter: Some(filter) }
    }

    pub fn has_filter(&self) -> bool {
        self.filter.is_some()
    }

    pub fn inner(&self) -> &TermPostingStream {
        &self.inner
    }

    pub fn take_filter(&mut self) -> Option<Box<dyn AttributeValueReader>> {
        self.filter.take()
    }

    pub fn into_inner(self) -> TermPostingStream {
        *self.inner
    }
}

impl PostingStream for FilteredPostingStream {
    fn seek(&mut self, target: DocId) -> crate::Result<Option<DocId>> {
        let Some(filter) = self.filter.as_mut() else {
            return self.inner.seek(target);
        };
        let mut target = target;
        while let Some(docid) = self.inner.seek(target)? {
            if filter.test(docid) {
                return Ok(Some(docid));
            }
            target = docid + 1;
        }
        Ok(None)
    }

    fn unpack(&mut self) -> crate::Result<TermMatchData> {
        self.inner.unpack()
    }

    fn term_stats(&self) -> TermStats {
        self.inner.term_stats()
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}
