mod block_header;
pub mod encoder;
mod match_data;
mod position_iterator;
mod posting_decoder;
mod posting_format;
mod posting_region_writer;
mod segment_posting;

pub use block_header::BlockHeader;
pub use match_data::{ChainStats, TermMatchData, TermStats};
pub use position_iterator::PositionIterator;
pub use posting_decoder::{
    DecodedBlock, DecoderFactory, PostingDecoder, SegmentDecoderFactory, SegmentPostingDecoder,
};
pub use posting_format::{CompressMode, FormatOptions};
pub use posting_region_writer::PostingRegionWriter;
pub use segment_posting::{
    InlinePosting, PostingEncoding, PostingRegion, RegionSource, SegmentPostingDescriptor,
};
