use std::sync::Arc;

use log::error;

use crate::common::constants::DOC_BLOCK_LEN;
use crate::core::posting_list::encoder::{write_vint, BlockEncoder};
use crate::core::posting_list::{
    BlockHeader, ChainStats, CompressMode, FormatOptions, PostingRegion, SegmentPostingDescriptor,
};
use crate::{DocId, LocalDocId, PostingError, TermFreq};

struct PendingDoc {
    docid: LocalDocId,
    term_freq: TermFreq,
    payload: u32,
    field_map: u32,
    positions: Vec<u32>,
}

/// Serializes one segment's posting of one term into a region of
/// checksummed blocks of up to [`DOC_BLOCK_LEN`] docs.
pub struct PostingRegionWriter {
    format: FormatOptions,
    compress_mode: CompressMode,
    encoder: BlockEncoder,
    output: Vec<u8>,
    pending: Vec<PendingDoc>,
    last_docid: Option<LocalDocId>,
    block_base_docid: LocalDocId,
    running_term_freq: u32,
    stats: ChainStats,
}

impl PostingRegionWriter {
    /// Fails when `format` stores positions without term frequencies.
    pub fn new(format: FormatOptions, compress_mode: CompressMode) -> crate::Result<Self> {
        if !format.is_valid() {
            let error_msg = format!("[PostingRegionWriter] positions need term frequencies, got {format:?}");
            error!("{}", error_msg);
            return Err(PostingError::InvalidArgument(error_msg));
        }
        Ok(Self {
            format,
            compress_mode,
            encoder: BlockEncoder::new(),
            output: Vec::new(),
            pending: Vec::with_capacity(DOC_BLOCK_LEN),
            last_docid: None,
            block_base_docid: 0,
            running_term_freq: 0,
            stats: ChainStats::default(),
        })
    }

    /// Adds a doc with a term frequency of one and no extra data.
    pub fn add_doc(&mut self, docid: LocalDocId) -> crate::Result<()> {
        let positions = if self.format.has_position { vec![0] } else { vec![] };
        self.add(docid, 1, 0, 0, &positions)
    }

    /// Adds a doc. Doc ids must be strictly increasing; when positions are
    /// stored there must be exactly `term_freq` of them, ascending.
    pub fn add(
        &mut self,
        docid: LocalDocId,
        term_freq: TermFreq,
        payload: u32,
        field_map: u32,
        positions: &[u32],
    ) -> crate::Result<()> {
        if let Some(last_docid) = self.last_docid {
            if docid <= last_docid {
                let error_msg = format!("[PostingRegionWriter] doc id {docid} added after {last_docid}");
                error!("{}", error_msg);
                return Err(PostingError::InvalidArgument(error_msg));
            }
        }
        if term_freq < 1 {
            return Err(PostingError::InvalidArgument(format!("term freq {term_freq} of doc {docid} is below 1")));
        }
        if self.format.has_position
            && (positions.len() != term_freq as usize || positions.windows(2).any(|w| w[0] > w[1]))
        {
            return Err(PostingError::InvalidArgument(format!(
                "doc {docid} needs {term_freq} ascending positions, got {positions:?}"
            )));
        }

        self.pending.push(PendingDoc { docid, term_freq, payload, field_map, positions: positions.to_vec() });
        self.last_docid = Some(docid);
        self.stats.doc_freq += 1;
        self.stats.total_term_freq += term_freq as u64;

        if self.pending.len() == DOC_BLOCK_LEN {
            self.flush_block();
        }
        Ok(())
    }

    fn flush_block(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let base_docid = self.block_base_docid;
        let values: Vec<u32> = if self.format.reference_compressed {
            self.pending.iter().map(|doc| doc.docid).collect()
        } else {
            let mut prev = base_docid;
            self.pending
                .iter()
                .map(|doc| {
                    let delta = doc.docid - prev;
                    prev = doc.docid;
                    delta
                })
                .collect()
        };

        let mut body = Vec::new();
        let num_bits = if values.len() == DOC_BLOCK_LEN && self.compress_mode == CompressMode::Bitpacked {
            let (num_bits, bytes) = self.encoder.compress_block_unsorted(&values);
            write_section(&mut body, bytes);
            num_bits
        } else {
            write_section(&mut body, self.encoder.compress_vint_unsorted(&values));
            0
        };

        if self.format.has_term_freq {
            let term_freqs: Vec<u32> = self.pending.iter().map(|doc| doc.term_freq as u32).collect();
            write_section(&mut body, self.encoder.compress_vint_unsorted(&term_freqs));
        }
        if self.format.has_doc_payload {
            let payloads: Vec<u32> = self.pending.iter().map(|doc| doc.payload).collect();
            write_section(&mut body, self.encoder.compress_vint_unsorted(&payloads));
        }
        if self.format.has_field_map {
            let field_maps: Vec<u32> = self.pending.iter().map(|doc| doc.field_map).collect();
            write_section(&mut body, self.encoder.compress_vint_unsorted(&field_maps));
        }
        if self.format.has_position {
            let mut position_bytes = Vec::new();
            for doc in &self.pending {
                let mut prev = 0;
                for &position in &doc.positions {
                    write_vint(position - prev, &mut position_bytes);
                    prev = position;
                }
            }
            write_section(&mut body, &position_bytes);
        }

        let last_docid = self.pending.last().map(|doc| doc.docid).unwrap_or(base_docid);
        let header = BlockHeader {
            doc_count: self.pending.len() as u8,
            num_bits,
            base_docid,
            last_docid,
            running_term_freq: self.running_term_freq,
            body_len: body.len() as u32,
            body_crc: crc32fast::hash(&body),
        };
        header.serialize(&mut self.output);
        self.output.extend_from_slice(&body);

        self.running_term_freq += self.pending.iter().map(|doc| doc.term_freq as u32).sum::<u32>();
        self.block_base_docid = last_docid;
        self.pending.clear();
    }

    pub fn stats(&self) -> ChainStats {
        self.stats
    }

    /// Flushes the tail block and returns the region bytes.
    pub fn finish(mut self) -> (Vec<u8>, ChainStats) {
        self.flush_block();
        (self.output, self.stats)
    }

    /// Finishes the region and wraps it into the descriptor of a segment.
    pub fn into_descriptor(self, base_docid: DocId, doc_count: u32) -> SegmentPostingDescriptor {
        let format = self.format;
        let compress_mode = self.compress_mode;
        let (bytes, stats) = self.finish();
        let region = PostingRegion { source: Arc::new(bytes), compress_mode };
        SegmentPostingDescriptor::new_region(base_docid, doc_count, region, format, stats)
    }
}

fn write_section(body: &mut Vec<u8>, bytes: &[u8]) {
    body.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    body.extend_from_slice(bytes);
}
