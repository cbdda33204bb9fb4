use crate::common::constants::{END_DOCID, INVALID_DOCID};
use crate::core::posting_list::{TermMatchData, TermStats};
use crate::core::stream::{BufferedPostingStream, DynamicPostingStream, PostingStream};
use crate::DocId;

/// Merges the on-disk stream of a term with its building-segment stream.
///
/// A doc is emitted when either side holds it, unless the building segment
/// holds a delete for it. Both sides keep their own cursor, a side is only
/// advanced while its cursor is below the target.
#[derive(Debug)]
pub struct CompositePostingStream {
    static_stream: Option<BufferedPostingStream>,
    dynamic_stream: Option<DynamicPostingStream>,
    static_docid: DocId,
    dynamic_docid: DocId,
    dynamic_is_delete: bool,
    current_docid: DocId,
    current_from_static: bool,
    term_stats: TermStats,
}

impl Clone for CompositePostingStream {
    fn clone(&self) -> Self {
        Self::new(self.static_stream.clone(), self.dynamic_stream.clone())
    }
}

impl CompositePostingStream {
    pub fn new(static_stream: Option<BufferedPostingStream>, dynamic_stream: Option<DynamicPostingStream>) -> Self {
        let mut term_stats = static_stream.as_ref().map(|stream| stream.term_stats()).unwrap_or_default();
        if let Some(dynamic_stream) = &dynamic_stream {
            term_stats.doc_freq += dynamic_stream.live_count();
        }
        Self {
            static_stream,
            dynamic_stream,
            static_docid: INVALID_DOCID,
            dynamic_docid: INVALID_DOCID,
            dynamic_is_delete: false,
            current_docid: INVALID_DOCID,
            current_from_static: false,
            term_stats,
        }
    }

    pub fn static_stream(&self) -> Option<&BufferedPostingStream> {
        self.static_stream.as_ref()
    }

    pub fn dynamic_stream(&self) -> Option<&DynamicPostingStream> {
        self.dynamic_stream.as_ref()
    }

    fn advance_static(&mut self, target: DocId) -> crate::Result<()> {
        if self.static_docid >= target {
            return Ok(());
        }
        self.static_docid = match self.static_stream.as_mut() {
            Some(stream) => stream.seek(target)?.unwrap_or(END_DOCID),
            None => END_DOCID,
        };
        Ok(())
    }

    fn advance_dynamic(&mut self, target: DocId) {
        if self.dynamic_docid >= target {
            return;
        }
        let entry = self.dynamic_stream.as_mut().and_then(|stream| stream.seek_with_delete(target));
        self.dynamic_docid = entry.map_or(END_DOCID, |entry| entry.docid);
        self.dynamic_is_delete = entry.map_or(false, |entry| entry.is_delete);
    }

    fn emit(&mut self, docid: DocId, from_static: bool) -> Option<DocId> {
        self.current_docid = docid;
        self.current_from_static = from_static;
        Some(docid)
    }
}

impl PostingStream for CompositePostingStream {
    fn seek(&mut self, target: DocId) -> crate::Result<Option<DocId>> {
        if self.current_docid == END_DOCID {
            return Ok(None);
        }
        let mut target = target.max(self.current_docid + 1);
        loop {
            self.advance_static(target)?;
            self.advance_dynamic(target);

            let (static_docid, dynamic_docid) = (self.static_docid, self.dynamic_docid);
            if static_docid == END_DOCID && dynamic_docid == END_DOCID {
                self.current_docid = END_DOCID;
                return Ok(None);
            }
            if static_docid < dynamic_docid {
                return Ok(self.emit(static_docid, true));
            }
            if !self.dynamic_is_delete {
                // on a tie the static side carries the term data
                return Ok(self.emit(dynamic_docid, static_docid == dynamic_docid));
            }
            target = dynamic_docid + 1;
        }
    }

    fn unpack(&mut self) -> crate::Result<TermMatchData> {
        if self.current_docid == INVALID_DOCID || self.current_docid == END_DOCID {
            return Ok(TermMatchData::default());
        }
        match self.static_stream.as_mut() {
            Some(stream) if self.current_from_static => stream.unpack(),
            _ => Ok(TermMatchData::matched_without_data()),
        }
    }

    fn term_stats(&self) -> TermStats {
        self.term_stats
    }

    fn reset(&mut self) {
        if let Some(stream) = self.static_stream.as_mut() {
            stream.reset();
        }
        if let Some(stream) = self.dynamic_stream.as_mut() {
            stream.reset();
        }
        self.static_docid = INVALID_DOCID;
        self.dynamic_docid = INVALID_DOCID;
        self.dynamic_is_delete = false;
        self.current_docid = INVALID_DOCID;
        self.current_from_static = false;
    }
}
