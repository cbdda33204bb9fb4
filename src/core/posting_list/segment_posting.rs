use std::borrow::Cow;
use std::fmt;
use std::io;
use std::sync::Arc;

use crate::core::posting_list::{ChainStats, CompressMode, FormatOptions};
use crate::{DocId, LocalDocId, TermFreq};

/// Byte storage a posting region is read from.
pub trait RegionSource: Send + Sync + fmt::Debug {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads `len` bytes at `offset`. Reading past the end is an `UnexpectedEof`.
    fn read_bytes(&self, offset: usize, len: usize) -> io::Result<Cow<'_, [u8]>>;
}

impl RegionSource for Vec<u8> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn read_bytes(&self, offset: usize, len: usize) -> io::Result<Cow<'_, [u8]>> {
        offset
            .checked_add(len)
            .and_then(|end| self.get(offset..end))
            .map(Cow::Borrowed)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("read of {len} bytes at {offset} overflows region of {} bytes", self.as_slice().len()),
                )
            })
    }
}

/// Single-document posting packed into the dictionary value.
///
/// The two 32-bit halves hold `(local_docid, term_freq)`, low half first unless
/// `df_first` is set. A doc-list-only value is the local doc id itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlinePosting {
    pub value: u64,
    pub is_doc_list_only: bool,
    pub df_first: bool,
}

impl InlinePosting {
    pub fn encode(docid: LocalDocId, term_freq: TermFreq, df_first: bool) -> Self {
        let (low, high) = if df_first { (term_freq as u32, docid) } else { (docid, term_freq as u32) };
        InlinePosting {
            value: u64::from(low) | (u64::from(high) << 32),
            is_doc_list_only: false,
            df_first,
        }
    }

    pub fn doc_list_only(docid: LocalDocId) -> Self {
        InlinePosting { value: u64::from(docid), is_doc_list_only: true, df_first: false }
    }

    pub fn decode(&self) -> (LocalDocId, TermFreq) {
        if self.is_doc_list_only {
            return (self.value as LocalDocId, 1);
        }
        let low = self.value as u32;
        let high = (self.value >> 32) as u32;
        if self.df_first {
            (high, low as TermFreq)
        } else {
            (low, high as TermFreq)
        }
    }
}

/// A byte region holding checksummed posting blocks.
#[derive(Debug, Clone)]
pub struct PostingRegion {
    pub source: Arc<dyn RegionSource>,
    pub compress_mode: CompressMode,
}

#[derive(Debug, Clone)]
pub enum PostingEncoding {
    Inline(InlinePosting),
    Region(PostingRegion),
}

/// Where one segment's posting for one term lives, plus its statistics.
#[derive(Debug, Clone)]
pub struct SegmentPostingDescriptor {
    base_docid: DocId,
    doc_count: u32,
    encoding: PostingEncoding,
    format_options: FormatOptions,
    main_chain_stats: ChainStats,
    term_payload: u16,
}

impl SegmentPostingDescriptor {
    pub fn new_inline(
        base_docid: DocId,
        doc_count: u32,
        inline: InlinePosting,
        format_options: FormatOptions,
    ) -> Self {
        let (_, term_freq) = inline.decode();
        Self {
            base_docid,
            doc_count,
            encoding: PostingEncoding::Inline(inline),
            format_options,
            main_chain_stats: ChainStats::new(1, term_freq.max(0) as u64),
            term_payload: 0,
        }
    }

    pub fn new_region(
        base_docid: DocId,
        doc_count: u32,
        region: PostingRegion,
        format_options: FormatOptions,
        stats: ChainStats,
    ) -> Self {
        Self {
            base_docid,
            doc_count,
            encoding: PostingEncoding::Region(region),
            format_options,
            main_chain_stats: stats,
            term_payload: 0,
        }
    }

    pub fn with_term_payload(mut self, term_payload: u16) -> Self {
        self.term_payload = term_payload;
        self
    }

    /// Replaces the reported statistics, used when a truncated chain reports
    /// the statistics of its main chain.
    pub fn with_main_chain_stats(mut self, stats: ChainStats) -> Self {
        self.main_chain_stats = stats;
        self
    }

    pub fn base_docid(&self) -> DocId {
        self.base_docid
    }

    pub fn doc_count(&self) -> u32 {
        self.doc_count
    }

    /// First global doc id past this segment.
    pub fn end_docid(&self) -> DocId {
        self.base_docid + DocId::from(self.doc_count)
    }

    pub fn encoding(&self) -> &PostingEncoding {
        &self.encoding
    }

    pub fn format_options(&self) -> FormatOptions {
        self.format_options
    }

    pub fn main_chain_stats(&self) -> ChainStats {
        self.main_chain_stats
    }

    pub fn term_payload(&self) -> u16 {
        self.term_payload
    }

    pub fn is_empty(&self) -> bool {
        self.main_chain_stats.doc_freq == 0
    }
}
