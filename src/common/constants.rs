use crate::{DictKey, DocId};

/// Number of documents held by one full posting block.
pub const DOC_BLOCK_LEN: usize = 128;

/// Marks a stream cursor that has not been positioned yet.
pub const INVALID_DOCID: DocId = -1;

/// Marks a stream cursor that ran past the last document.
pub const END_DOCID: DocId = DocId::MAX;

/// Fixed dictionary key used by null terms.
pub const NULL_TERM_KEY: DictKey = u64::MAX;

/// Size in bytes of a serialized block header.
pub const BLOCK_HEADER_LEN: usize = 24;
