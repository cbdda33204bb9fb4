use std::fmt;
use std::ops::Range;

use crate::common::constants::{BLOCK_HEADER_LEN, DOC_BLOCK_LEN};
use crate::core::buffer::{PooledDocBuffer, DOC_BUFFER_POOL};
use crate::core::posting_list::encoder::{read_vint, BlockDecoder};
use crate::core::posting_list::{
    BlockHeader, FormatOptions, InlinePosting, PositionIterator, PostingEncoding, PostingRegion,
    SegmentPostingDescriptor,
};
use crate::{DocId, LocalDocId, PostingError, TermFreq};

/// Location of the block a decoder has just materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedBlock {
    /// Global doc id the decoded values are relative to: the previous block's
    /// last doc for delta layouts, the segment base for reference layouts.
    pub base_docid: DocId,
    pub first_docid: DocId,
    pub last_docid: DocId,
    /// Sum of the term frequencies before this block in its segment.
    pub running_term_freq: u64,
    pub len: usize,
}

/// Decodes the blocks of one segment posting, one block at a time.
///
/// `decode_block` returns `Ok(None)` once the posting is exhausted; errors
/// are reserved for unreadable or corrupted data. The per-document sections
/// of the current block are decoded on first request only.
pub trait PostingDecoder: Send + fmt::Debug {
    /// Moves to the next block whose last doc id is `>= start_docid`.
    fn decode_block(&mut self, start_docid: DocId) -> crate::Result<Option<DecodedBlock>>;

    /// Doc values of the current block: deltas, or absolute local ids for
    /// reference-compressed formats.
    fn doc_buffer(&self) -> &[u32];

    fn decode_term_freqs(&mut self) -> crate::Result<&[TermFreq]>;

    fn decode_payloads(&mut self) -> crate::Result<&[u32]>;

    fn decode_field_maps(&mut self) -> crate::Result<&[u32]>;

    /// Positions of the doc at `index_in_block` in the current block.
    fn decode_positions(&mut self, index_in_block: usize) -> crate::Result<PositionIterator>;
}

/// Opens the decoder of one segment posting.
pub trait DecoderFactory: Send + Sync + fmt::Debug {
    fn open(&self, descriptor: &SegmentPostingDescriptor) -> Box<dyn PostingDecoder>;
}

/// Opens a [`SegmentPostingDecoder`] for every descriptor.
#[derive(Debug, Default, Clone, Copy)]
pub struct SegmentDecoderFactory;

impl DecoderFactory for SegmentDecoderFactory {
    fn open(&self, descriptor: &SegmentPostingDescriptor) -> Box<dyn PostingDecoder> {
        Box::new(SegmentPostingDecoder::open(descriptor))
    }
}

enum DecoderSource {
    Inline { posting: InlinePosting, consumed: bool },
    Region { region: PostingRegion, offset: usize },
}

#[derive(Default)]
struct BlockSections {
    term_freqs: Option<Range<usize>>,
    payloads: Option<Range<usize>>,
    field_maps: Option<Range<usize>>,
    positions: Option<Range<usize>>,
}

/// [`PostingDecoder`] over a [`SegmentPostingDescriptor`].
pub struct SegmentPostingDecoder {
    base_docid: DocId,
    format: FormatOptions,
    source: DecoderSource,
    block_decoder: BlockDecoder,
    doc_buffer: PooledDocBuffer<'static>,
    body: Vec<u8>,
    sections: BlockSections,
    doc_count: usize,
    term_freqs: Vec<TermFreq>,
    term_freqs_decoded: bool,
    payloads: Vec<u32>,
    payloads_decoded: bool,
    field_maps: Vec<u32>,
    field_maps_decoded: bool,
    positions: Vec<u32>,
    position_offsets: Vec<usize>,
    positions_decoded: bool,
}

impl fmt::Debug for SegmentPostingDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentPostingDecoder")
            .field("base_docid", &self.base_docid)
            .field("format", &self.format)
            .field("doc_count", &self.doc_count)
            .finish()
    }
}

impl SegmentPostingDecoder {
    pub fn open(descriptor: &SegmentPostingDescriptor) -> Self {
        let source = match descriptor.encoding() {
            PostingEncoding::Inline(posting) => DecoderSource::Inline { posting: *posting, consumed: false },
            PostingEncoding::Region(region) => DecoderSource::Region { region: region.clone(), offset: 0 },
        };
        Self {
            base_docid: descriptor.base_docid(),
            format: descriptor.format_options(),
            source,
            block_decoder: BlockDecoder::new(),
            doc_buffer: DOC_BUFFER_POOL.get(),
            body: Vec::new(),
            sections: BlockSections::default(),
            doc_count: 0,
            term_freqs: Vec::new(),
            term_freqs_decoded: false,
            payloads: Vec::new(),
            payloads_decoded: false,
            field_maps: Vec::new(),
            field_maps_decoded: false,
            positions: Vec::new(),
            position_offsets: Vec::new(),
            positions_decoded: false,
        }
    }

    fn decode_error<TStr: ToString>(&self, reason: TStr) -> PostingError {
        PostingError::decode_failed(self.base_docid, reason)
    }

    fn reset_block_state(&mut self) {
        self.doc_buffer.buffer.clear();
        self.sections = BlockSections::default();
        self.doc_count = 0;
        self.term_freqs.clear();
        self.term_freqs_decoded = false;
        self.payloads.clear();
        self.payloads_decoded = false;
        self.field_maps.clear();
        self.field_maps_decoded = false;
        self.positions.clear();
        self.position_offsets.clear();
        self.positions_decoded = false;
    }

    /// Reads block headers from `offset`, skipping blocks that end before
    /// `local_start`, and loads the body of the first block that doesn't.
    fn read_next_block(
        region: &PostingRegion,
        offset: &mut usize,
        local_start: LocalDocId,
        base_docid: DocId,
        body: &mut Vec<u8>,
    ) -> crate::Result<Option<BlockHeader>> {
        loop {
            if *offset >= region.source.len() {
                return Ok(None);
            }
            let header_bytes = region
                .source
                .read_bytes(*offset, BLOCK_HEADER_LEN)
                .map_err(|e| PostingError::decode_failed(base_docid, e))?;
            let header =
                BlockHeader::deserialize(&header_bytes).map_err(|e| PostingError::decode_failed(base_docid, e))?;
            let body_offset = *offset + BLOCK_HEADER_LEN;
            *offset = body_offset + header.body_len as usize;
            if header.last_docid < local_start {
                continue;
            }

            let body_bytes = region
                .source
                .read_bytes(body_offset, header.body_len as usize)
                .map_err(|e| PostingError::decode_failed(base_docid, e))?;
            if crc32fast::hash(&body_bytes) != header.body_crc {
                return Err(PostingError::decode_failed(base_docid, "block checksum mismatch"));
            }
            body.clear();
            body.extend_from_slice(&body_bytes);
            return Ok(Some(header));
        }
    }

    fn load_inline(&mut self, posting: InlinePosting) -> DecodedBlock {
        let (local_docid, term_freq) = posting.decode();
        self.doc_buffer.buffer.push(local_docid);
        self.doc_count = 1;
        if self.format.has_term_freq {
            self.term_freqs.push(term_freq);
        }
        if self.format.has_doc_payload {
            self.payloads.push(0);
        }
        if self.format.has_field_map {
            self.field_maps.push(0);
        }
        // inline postings carry no positions
        self.position_offsets.extend_from_slice(&[0, 0]);
        self.term_freqs_decoded = true;
        self.payloads_decoded = true;
        self.field_maps_decoded = true;
        self.positions_decoded = true;

        let docid = self.base_docid + DocId::from(local_docid);
        DecodedBlock { base_docid: self.base_docid, first_docid: docid, last_docid: docid, running_term_freq: 0, len: 1 }
    }

    fn load_region_block(&mut self, header: BlockHeader) -> crate::Result<DecodedBlock> {
        let doc_count = header.doc_count as usize;
        let mut cursor = 0;
        let doc_section = self.next_section(&mut cursor)?;
        let mut sections = BlockSections::default();
        if self.format.has_term_freq {
            sections.term_freqs = Some(self.next_section(&mut cursor)?);
        }
        if self.format.has_doc_payload {
            sections.payloads = Some(self.next_section(&mut cursor)?);
        }
        if self.format.has_field_map {
            sections.field_maps = Some(self.next_section(&mut cursor)?);
        }
        if self.format.has_position {
            sections.positions = Some(self.next_section(&mut cursor)?);
        }
        if cursor != self.body.len() {
            return Err(self.decode_error(format!("{} trailing bytes in block body", self.body.len() - cursor)));
        }

        let doc_bytes = &self.body[doc_section.clone()];
        let consumed = if doc_count == DOC_BLOCK_LEN && header.num_bits > 0 {
            self.block_decoder.uncompress_block_unsorted(doc_bytes, header.num_bits)
        } else {
            self.block_decoder.uncompress_vint_unsorted(doc_bytes, doc_count)
        };
        match consumed {
            Some(consumed) if consumed == doc_section.len() => {}
            _ => return Err(self.decode_error("doc section does not match its length")),
        }
        self.doc_buffer.buffer.extend_from_slice(self.block_decoder.output_array());
        self.doc_count = doc_count;
        self.sections = sections;

        let (base_docid, first_local, last_local) = self.validate_doc_values(&header)?;
        Ok(DecodedBlock {
            base_docid,
            first_docid: self.base_docid + DocId::from(first_local),
            last_docid: self.base_docid + DocId::from(last_local),
            running_term_freq: u64::from(header.running_term_freq),
            len: doc_count,
        })
    }

    /// Checks the decoded doc values against the header, returns the global
    /// base of the values with the first and last local doc ids.
    fn validate_doc_values(&self, header: &BlockHeader) -> crate::Result<(DocId, LocalDocId, LocalDocId)> {
        let values = &self.doc_buffer.buffer;
        if self.format.reference_compressed {
            let ascending = values.windows(2).all(|w| w[0] < w[1]);
            let (first, last) = (values[0], values[values.len() - 1]);
            if !ascending || first < header.base_docid || last != header.last_docid {
                return Err(self.decode_error("reference block doc ids are inconsistent with the header"));
            }
            return Ok((self.base_docid, first, last));
        }
        let mut docid = u64::from(header.base_docid);
        let mut first = None;
        for (idx, &delta) in values.iter().enumerate() {
            if idx > 0 && delta == 0 {
                return Err(self.decode_error("zero delta inside a block"));
            }
            docid += u64::from(delta);
            first.get_or_insert(docid);
        }
        if docid != u64::from(header.last_docid) {
            return Err(self.decode_error(format!(
                "block deltas end at {docid}, header says {}",
                header.last_docid
            )));
        }
        let first = first.unwrap_or(docid) as LocalDocId;
        Ok((self.base_docid + DocId::from(header.base_docid), first, header.last_docid))
    }

    fn next_section(&self, cursor: &mut usize) -> crate::Result<Range<usize>> {
        let len_bytes = self
            .body
            .get(*cursor..*cursor + 4)
            .ok_or_else(|| self.decode_error("truncated section length"))?;
        let mut buf = [0u8; 4];
        buf.copy_from_slice(len_bytes);
        let start = *cursor + 4;
        let end = start + u32::from_le_bytes(buf) as usize;
        if end > self.body.len() {
            return Err(self.decode_error("section overflows block body"));
        }
        *cursor = end;
        Ok(start..end)
    }

    fn decode_vint_section(&mut self, section: Option<Range<usize>>) -> crate::Result<Vec<u32>> {
        let Some(section) = section else {
            return Ok(Vec::new());
        };
        let bytes = &self.body[section.clone()];
        match self.block_decoder.uncompress_vint_unsorted(bytes, self.doc_count) {
            Some(consumed) if consumed == section.len() => Ok(self.block_decoder.output_array().to_vec()),
            _ => Err(self.decode_error("vint section does not match its length")),
        }
    }

    fn ensure_term_freqs(&mut self) -> crate::Result<()> {
        if !self.term_freqs_decoded {
            let values = self.decode_vint_section(self.sections.term_freqs.clone())?;
            self.term_freqs = values.into_iter().map(|tf| tf as TermFreq).collect();
            self.term_freqs_decoded = true;
        }
        Ok(())
    }

    fn ensure_positions(&mut self) -> crate::Result<()> {
        if self.positions_decoded {
            return Ok(());
        }
        self.ensure_term_freqs()?;
        let Some(section) = self.sections.positions.clone() else {
            self.position_offsets = vec![0; self.doc_count + 1];
            self.positions_decoded = true;
            return Ok(());
        };
        let bytes = &self.body[section.clone()];
        let mut offset = 0;
        let mut positions = Vec::new();
        let mut position_offsets = Vec::with_capacity(self.doc_count + 1);
        position_offsets.push(0);
        for &term_freq in &self.term_freqs {
            let mut position = 0u32;
            for _ in 0..term_freq {
                let delta = read_vint(bytes, &mut offset)
                    .ok_or_else(|| PostingError::decode_failed(self.base_docid, "truncated position section"))?;
                position += delta;
                positions.push(position);
            }
            position_offsets.push(positions.len());
        }
        if offset != section.len() {
            return Err(self.decode_error("position section does not match its length"));
        }
        self.positions = positions;
        self.position_offsets = position_offsets;
        self.positions_decoded = true;
        Ok(())
    }
}

impl PostingDecoder for SegmentPostingDecoder {
    fn decode_block(&mut self, start_docid: DocId) -> crate::Result<Option<DecodedBlock>> {
        let local_start = (start_docid - self.base_docid).clamp(0, DocId::from(LocalDocId::MAX)) as LocalDocId;
        let base_docid = self.base_docid;
        self.reset_block_state();

        match &mut self.source {
            DecoderSource::Inline { posting, consumed } => {
                if *consumed {
                    return Ok(None);
                }
                *consumed = true;
                let posting = *posting;
                if posting.decode().0 < local_start {
                    return Ok(None);
                }
                Ok(Some(self.load_inline(posting)))
            }
            DecoderSource::Region { region, offset } => {
                match Self::read_next_block(region, offset, local_start, base_docid, &mut self.body)? {
                    None => Ok(None),
                    Some(header) => self.load_region_block(header).map(Some),
                }
            }
        }
    }

    fn doc_buffer(&self) -> &[u32] {
        &self.doc_buffer.buffer
    }

    fn decode_term_freqs(&mut self) -> crate::Result<&[TermFreq]> {
        self.ensure_term_freqs()?;
        Ok(&self.term_freqs)
    }

    fn decode_payloads(&mut self) -> crate::Result<&[u32]> {
        if !self.payloads_decoded {
            self.payloads = self.decode_vint_section(self.sections.payloads.clone())?;
            self.payloads_decoded = true;
        }
        Ok(&self.payloads)
    }

    fn decode_field_maps(&mut self) -> crate::Result<&[u32]> {
        if !self.field_maps_decoded {
            self.field_maps = self.decode_vint_section(self.sections.field_maps.clone())?;
            self.field_maps_decoded = true;
        }
        Ok(&self.field_maps)
    }

    fn decode_positions(&mut self, index_in_block: usize) -> crate::Result<PositionIterator> {
        if index_in_block >= self.doc_count {
            return Err(PostingError::InvalidArgument(format!(
                "position request for doc {index_in_block} of a block holding {}",
                self.doc_count
            )));
        }
        self.ensure_positions()?;
        let start = self.position_offsets[index_in_block];
        let end = self.position_offsets[index_in_block + 1];
        Ok(PositionIterator::new(self.positions[start..end].to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;
    use std::io;
    use std::sync::Arc;

    use super::*;
    use crate::core::posting_list::{CompressMode, PostingRegionWriter, RegionSource};

    fn region_descriptor(format: FormatOptions, mode: CompressMode, docs: &[u32]) -> SegmentPostingDescriptor {
        let mut writer = PostingRegionWriter::new(format, mode).unwrap();
        for &docid in docs {
            let term_freq = (docid % 3 + 1) as TermFreq;
            let positions: Vec<u32> = (0..term_freq as u32).map(|p| p * 10 + docid % 7).collect();
            writer.add(docid, term_freq, docid * 2, docid % 4, &positions).unwrap();
        }
        writer.into_descriptor(1_000, 100_000)
    }

    fn collect_docids(decoder: &mut SegmentPostingDecoder, reference: bool) -> Vec<DocId> {
        let mut docids = Vec::new();
        while let Some(block) = decoder.decode_block(0).unwrap() {
            let mut docid = block.base_docid;
            for &value in decoder.doc_buffer() {
                if reference {
                    docid = block.base_docid + DocId::from(value);
                } else {
                    docid += DocId::from(value);
                }
                docids.push(docid);
            }
            assert_eq!(docids.last().copied(), Some(block.last_docid));
        }
        docids
    }

    #[test]
    fn test_decode_all_layouts() {
        let docs: Vec<u32> = (0..400u32).map(|i| i * 3 + 1).collect();
        let expected: Vec<DocId> = docs.iter().map(|&d| 1_000 + DocId::from(d)).collect();
        for reference in [false, true] {
            for mode in [CompressMode::Bitpacked, CompressMode::ShortList] {
                let format = FormatOptions::full().with_reference_compressed(reference);
                let descriptor = region_descriptor(format, mode, &docs);
                let mut decoder = SegmentPostingDecoder::open(&descriptor);
                assert_eq!(collect_docids(&mut decoder, reference), expected);
            }
        }
    }

    #[test]
    fn test_decode_block_skips_to_start() {
        let docs: Vec<u32> = (0..400u32).collect();
        let descriptor = region_descriptor(FormatOptions::full(), CompressMode::Bitpacked, &docs);
        let mut decoder = SegmentPostingDecoder::open(&descriptor);
        let block = decoder.decode_block(1_000 + 300).unwrap().unwrap();
        assert_eq!(block.first_docid, 1_000 + 256);
        assert_eq!(block.last_docid, 1_000 + 383);
        assert_eq!(block.running_term_freq, (0..256u32).map(|d| u64::from(d % 3 + 1)).sum::<u64>());
        assert!(decoder.decode_block(1_000 + 10_000).unwrap().is_none());
    }

    #[test]
    fn test_lazy_sections() {
        let docs: Vec<u32> = vec![3, 8, 20];
        let descriptor = region_descriptor(FormatOptions::full(), CompressMode::Bitpacked, &docs);
        let mut decoder = SegmentPostingDecoder::open(&descriptor);
        decoder.decode_block(0).unwrap().unwrap();
        assert!(!decoder.term_freqs_decoded);
        assert_eq!(decoder.decode_term_freqs().unwrap(), &[1, 3, 3]);
        assert!(decoder.term_freqs_decoded);
        assert_eq!(decoder.decode_payloads().unwrap(), &[6, 16, 40]);
        assert_eq!(decoder.decode_field_maps().unwrap(), &[3, 0, 0]);
        let positions: Vec<u32> = decoder.decode_positions(1).unwrap().collect();
        assert_eq!(positions, vec![1, 11, 21]);
        assert!(decoder.decode_positions(3).is_err());
    }

    #[test]
    fn test_doc_list_only_sections_are_empty() {
        let descriptor = region_descriptor(FormatOptions::doc_list_only(), CompressMode::Bitpacked, &[1, 2]);
        let mut decoder = SegmentPostingDecoder::open(&descriptor);
        decoder.decode_block(0).unwrap().unwrap();
        assert!(decoder.decode_term_freqs().unwrap().is_empty());
        assert!(decoder.decode_payloads().unwrap().is_empty());
        assert_eq!(decoder.decode_positions(0).unwrap().len(), 0);
    }

    #[test]
    fn test_inline_decoder() {
        let descriptor = SegmentPostingDescriptor::new_inline(
            50,
            10,
            InlinePosting::encode(4, 2, true),
            FormatOptions::full(),
        );
        let mut decoder = SegmentPostingDecoder::open(&descriptor);
        let block = decoder.decode_block(0).unwrap().unwrap();
        assert_eq!((block.first_docid, block.last_docid, block.len), (54, 54, 1));
        assert_eq!(decoder.doc_buffer(), &[4]);
        assert_eq!(decoder.decode_term_freqs().unwrap(), &[2]);
        assert!(decoder.decode_block(0).unwrap().is_none());

        let mut decoder = SegmentPostingDecoder::open(&descriptor);
        assert!(decoder.decode_block(55).unwrap().is_none());
    }

    #[test]
    fn test_corrupted_body_is_decode_failure() {
        let mut writer = PostingRegionWriter::new(FormatOptions::full(), CompressMode::Bitpacked).unwrap();
        for docid in 0..10u32 {
            writer.add(docid, 1, 0, 0, &[0]).unwrap();
        }
        let (mut bytes, stats) = writer.finish();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        let region = PostingRegion { source: Arc::new(bytes), compress_mode: CompressMode::Bitpacked };
        let descriptor = SegmentPostingDescriptor::new_region(0, 10, region, FormatOptions::full(), stats);
        let mut decoder = SegmentPostingDecoder::open(&descriptor);
        assert!(matches!(decoder.decode_block(0), Err(PostingError::DecodeFailed { .. })));
    }

    #[derive(Debug)]
    struct FailingSource;

    impl RegionSource for FailingSource {
        fn len(&self) -> usize {
            64
        }

        fn read_bytes(&self, _offset: usize, _len: usize) -> io::Result<Cow<'_, [u8]>> {
            Err(io::Error::new(io::ErrorKind::Other, "disk unavailable"))
        }
    }

    #[test]
    fn test_io_failure_is_decode_failure() {
        let region = PostingRegion { source: Arc::new(FailingSource), compress_mode: CompressMode::Bitpacked };
        let descriptor = SegmentPostingDescriptor::new_region(
            0,
            10,
            region,
            FormatOptions::doc_list_only(),
            crate::core::posting_list::ChainStats::new(1, 1),
        );
        let mut decoder = SegmentPostingDecoder::open(&descriptor);
        match decoder.decode_block(0) {
            Err(PostingError::DecodeFailed { base_docid, reason }) => {
                assert_eq!(base_docid, 0);
                assert!(reason.contains("disk unavailable"));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }
}
