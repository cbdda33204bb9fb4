use std::sync::Arc;

use crate::common::constants::{END_DOCID, INVALID_DOCID};
use crate::core::posting_list::{
    DecoderFactory, PositionIterator, SegmentDecoderFactory, SegmentPostingDescriptor, TermMatchData, TermStats,
};
use crate::core::stream::{PostingBuffer, PostingStream};
use crate::{DocId, PostingError};

/// Seek iterator over one term's postings in every on-disk segment.
///
/// Blocks either hold deltas, scanned by summing, or absolute local doc ids,
/// searched by bisection. The layout is read from the descriptors once and
/// every descriptor has to agree on it.
#[derive(Debug)]
pub struct BufferedPostingStream {
    buffer: PostingBuffer,
    reference_compressed: bool,
    term_stats: TermStats,
    current_docid: DocId,
    /// Index of the next unread value of the window.
    block_cursor: usize,
    /// Doc id reached by the delta scan so far.
    scan_docid: DocId,
}

impl Clone for BufferedPostingStream {
    /// Clones start from the beginning of the stream with their own decoder.
    fn clone(&self) -> Self {
        Self {
            buffer: self.buffer.clone(),
            reference_compressed: self.reference_compressed,
            term_stats: self.term_stats,
            current_docid: INVALID_DOCID,
            block_cursor: 0,
            scan_docid: INVALID_DOCID,
        }
    }
}

impl BufferedPostingStream {
    /// `descriptors` are expected in segment creation order.
    pub fn new(descriptors: Vec<SegmentPostingDescriptor>) -> crate::Result<Self> {
        BufferedPostingStream::with_decoder_factory(descriptors, Arc::new(SegmentDecoderFactory))
    }

    /// Stream whose segment postings are decoded by decoders of `decoder_factory`.
    pub fn with_decoder_factory(
        descriptors: Vec<SegmentPostingDescriptor>,
        decoder_factory: Arc<dyn DecoderFactory>,
    ) -> crate::Result<Self> {
        if let Some(descriptor) = descriptors.iter().find(|d| !d.format_options().is_valid()) {
            return Err(PostingError::InvalidArgument(format!(
                "posting of segment based at {} stores positions without term frequencies",
                descriptor.base_docid()
            )));
        }
        let reference_compressed = descriptors
            .first()
            .map(|descriptor| descriptor.format_options().reference_compressed)
            .unwrap_or_default();
        if descriptors.iter().any(|d| d.format_options().reference_compressed != reference_compressed) {
            return Err(PostingError::InvalidArgument(
                "segments disagree on reference compression".to_string(),
            ));
        }
        if descriptors.windows(2).any(|w| w[0].base_docid() > w[1].base_docid()) {
            return Err(PostingError::InvalidArgument(
                "segment postings are not sorted by base doc id".to_string(),
            ));
        }

        let mut term_stats = TermStats::default();
        for descriptor in &descriptors {
            term_stats += (descriptor.main_chain_stats(), descriptor.term_payload());
        }
        Ok(Self {
            buffer: PostingBuffer::with_decoder_factory(Arc::from(descriptors), decoder_factory),
            reference_compressed,
            term_stats,
            current_docid: INVALID_DOCID,
            block_cursor: 0,
            scan_docid: INVALID_DOCID,
        })
    }

    pub fn current_docid(&self) -> DocId {
        self.current_docid
    }

    pub fn buffer(&self) -> &PostingBuffer {
        &self.buffer
    }

    fn is_positioned(&self) -> bool {
        self.current_docid != INVALID_DOCID && self.current_docid != END_DOCID
    }

    fn window_needs_refill(&self, target: DocId) -> bool {
        match self.buffer.window() {
            None => true,
            Some(window) => window.last_docid < target || self.block_cursor >= window.len,
        }
    }

    /// Scans the current window for the first doc `>= target`.
    fn scan_window(&mut self, target: DocId) -> Option<DocId> {
        let window = self.buffer.window()?;
        let values = self.buffer.doc_values();
        if self.reference_compressed {
            let remaining = &values[self.block_cursor.min(values.len())..];
            let offset = remaining.partition_point(|&value| window.base_docid + DocId::from(value) < target);
            let index = self.block_cursor + offset;
            let Some(value) = values.get(index) else {
                self.block_cursor = values.len();
                return None;
            };
            self.block_cursor = index + 1;
            return Some(window.base_docid + DocId::from(*value));
        }
        while let Some(&delta) = values.get(self.block_cursor) {
            self.scan_docid += DocId::from(delta);
            self.block_cursor += 1;
            if self.scan_docid >= target {
                return Some(self.scan_docid);
            }
        }
        None
    }

    /// Positions of the current document, `None` when the stream is not on a document.
    pub fn positions(&mut self) -> crate::Result<Option<PositionIterator>> {
        if !self.is_positioned() {
            return Ok(None);
        }
        let index = self.block_cursor - 1;
        self.buffer.decode_positions(index).map(Some)
    }
}

impl PostingStream for BufferedPostingStream {
    fn seek(&mut self, target: DocId) -> crate::Result<Option<DocId>> {
        if self.current_docid == END_DOCID {
            return Ok(None);
        }
        let target = target.max(self.current_docid + 1);
        loop {
            if self.window_needs_refill(target) {
                match self.buffer.decode_block(target)? {
                    None => {
                        self.current_docid = END_DOCID;
                        return Ok(None);
                    }
                    Some(window) => {
                        self.block_cursor = 0;
                        self.scan_docid = window.base_docid;
                    }
                }
            }
            if let Some(docid) = self.scan_window(target) {
                self.current_docid = docid;
                return Ok(Some(docid));
            }
        }
    }

    fn unpack(&mut self) -> crate::Result<TermMatchData> {
        if !self.is_positioned() {
            return Ok(TermMatchData::default());
        }
        let index = self.block_cursor - 1;
        let term_freq = self.buffer.decode_term_freqs()?.get(index).copied();
        let doc_payload = self.buffer.decode_payloads()?.get(index).copied();
        let field_map = self.buffer.decode_field_maps()?.get(index).copied();
        Ok(TermMatchData { matched: true, term_freq, doc_payload, field_map })
    }

    fn term_stats(&self) -> TermStats {
        self.term_stats
    }

    fn reset(&mut self) {
        self.buffer.reset();
        self.current_docid = INVALID_DOCID;
        self.block_cursor = 0;
        self.scan_docid = INVALID_DOCID;
    }
}
