use std::fmt;
use std::sync::Arc;

use log::trace;

use crate::core::posting_list::{
    DecodedBlock, DecoderFactory, FormatOptions, PositionIterator, PostingDecoder, SegmentDecoderFactory,
    SegmentPostingDescriptor,
};
use crate::{DocId, TermFreq};

/// Decode-and-cache layer over the postings of one term in every on-disk segment.
///
/// Holds at most one decoded block (the window) at a time. Windows are only
/// ever requested for increasing doc ids, so the segment cursor and the
/// window's last doc id only move forward until [`PostingBuffer::reset`].
/// Running out of segments is terminal.
pub struct PostingBuffer {
    descriptors: Arc<[SegmentPostingDescriptor]>,
    decoder_factory: Arc<dyn DecoderFactory>,
    decoder: Option<Box<dyn PostingDecoder>>,
    /// Index of the segment the next decoder is opened from.
    next_segment: usize,
    window: Option<DecodedBlock>,
    exhausted: bool,
}

impl fmt::Debug for PostingBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostingBuffer")
            .field("segments", &self.descriptors.len())
            .field("decoder_factory", &self.decoder_factory)
            .field("next_segment", &self.next_segment)
            .field("window", &self.window)
            .field("exhausted", &self.exhausted)
            .finish()
    }
}

impl Clone for PostingBuffer {
    /// The clone shares the immutable descriptors and starts over with its own decoder.
    fn clone(&self) -> Self {
        PostingBuffer::with_decoder_factory(self.descriptors.clone(), self.decoder_factory.clone())
    }
}

impl PostingBuffer {
    /// `descriptors` must be sorted by base doc id.
    pub fn new(descriptors: Arc<[SegmentPostingDescriptor]>) -> Self {
        PostingBuffer::with_decoder_factory(descriptors, Arc::new(SegmentDecoderFactory))
    }

    /// Buffer whose segment decoders are opened by `decoder_factory`.
    pub fn with_decoder_factory(
        descriptors: Arc<[SegmentPostingDescriptor]>,
        decoder_factory: Arc<dyn DecoderFactory>,
    ) -> Self {
        Self { descriptors, decoder_factory, decoder: None, next_segment: 0, window: None, exhausted: false }
    }

    pub fn descriptors(&self) -> &[SegmentPostingDescriptor] {
        &self.descriptors
    }

    /// Decodes the next block holding a doc id `>= docid`, crossing into later
    /// segments as needed. Returns `Ok(None)` once every segment is exhausted.
    pub fn decode_block(&mut self, docid: DocId) -> crate::Result<Option<DecodedBlock>> {
        if self.exhausted {
            return Ok(None);
        }
        if self.decoder.is_none() && !self.move_to_segment(docid) {
            return Ok(self.exhaust());
        }
        loop {
            if let Some(decoder) = self.decoder.as_mut() {
                if let Some(block) = decoder.decode_block(docid)? {
                    debug_assert!(self.window.map_or(true, |window| window.last_docid < block.last_docid));
                    self.window = Some(block);
                    return Ok(Some(block));
                }
            }
            if !self.move_to_segment(docid) {
                return Ok(self.exhaust());
            }
        }
    }

    fn exhaust(&mut self) -> Option<DecodedBlock> {
        self.exhausted = true;
        self.decoder = None;
        self.window = None;
        None
    }

    fn move_to_segment(&mut self, docid: DocId) -> bool {
        let cursor = self.locate_segment(self.next_segment, docid);
        if cursor >= self.descriptors.len() {
            return false;
        }
        trace!("posting buffer opens segment #{} based at {}", cursor, self.descriptors[cursor].base_docid());
        self.decoder = Some(self.decoder_factory.open(&self.descriptors[cursor]));
        self.next_segment = cursor + 1;
        true
    }

    /// Last segment at or after `cursor` whose base doc id is `<= docid`.
    fn locate_segment(&self, cursor: usize, docid: DocId) -> usize {
        if cursor >= self.descriptors.len() {
            return cursor;
        }
        let later = &self.descriptors[cursor + 1..];
        cursor + later.partition_point(|descriptor| descriptor.base_docid() <= docid)
    }

    pub fn window(&self) -> Option<DecodedBlock> {
        self.window
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Doc values of the current window, empty when there is none.
    pub fn doc_values(&self) -> &[u32] {
        match (&self.window, &self.decoder) {
            (Some(_), Some(decoder)) => decoder.doc_buffer(),
            _ => &[],
        }
    }

    /// Format of the segment the current window belongs to.
    pub fn current_format(&self) -> Option<FormatOptions> {
        self.window?;
        self.next_segment.checked_sub(1).map(|segment| self.descriptors[segment].format_options())
    }

    /// Sum of the term frequencies that precede the window in its segment.
    pub fn running_term_freq(&self) -> u64 {
        self.window.map_or(0, |window| window.running_term_freq)
    }

    pub fn decode_term_freqs(&mut self) -> crate::Result<&[TermFreq]> {
        match self.decoder.as_mut() {
            Some(decoder) if self.window.is_some() => decoder.decode_term_freqs(),
            _ => Ok(&[]),
        }
    }

    pub fn decode_payloads(&mut self) -> crate::Result<&[u32]> {
        match self.decoder.as_mut() {
            Some(decoder) if self.window.is_some() => decoder.decode_payloads(),
            _ => Ok(&[]),
        }
    }

    pub fn decode_field_maps(&mut self) -> crate::Result<&[u32]> {
        match self.decoder.as_mut() {
            Some(decoder) if self.window.is_some() => decoder.decode_field_maps(),
            _ => Ok(&[]),
        }
    }

    pub fn decode_positions(&mut self, index_in_window: usize) -> crate::Result<PositionIterator> {
        match self.decoder.as_mut() {
            Some(decoder) if self.window.is_some() => decoder.decode_positions(index_in_window),
            _ => Ok(PositionIterator::default()),
        }
    }

    /// Drops the decoder and window, the next block is decoded from the first segment.
    pub fn reset(&mut self) {
        self.decoder = None;
        self.next_segment = 0;
        self.window = None;
        self.exhausted = false;
    }
}
