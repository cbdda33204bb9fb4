use fnv::{FnvHashMap, FnvHashSet};
use parking_lot::RwLock;

use crate::core::posting_list::SegmentPostingDescriptor;
use crate::index::{SegmentId, SegmentInfo};
use crate::{DictKey, PostingError};

/// Posting chains a dictionary can hold for one key in one segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PostingChain {
    Main,
    /// Doc-list-only chain of a high-frequency term.
    Bitmap,
    /// Truncated ranking chain, by name.
    Truncate(String),
}

/// Maps `(segment, key, chain)` to the posting of that segment.
pub trait TermDictionary: Send + Sync {
    /// `Ok(None)` when the segment holds no such chain for the key.
    fn lookup(
        &self,
        segment: &SegmentInfo,
        key: DictKey,
        chain: &PostingChain,
    ) -> crate::Result<Option<SegmentPostingDescriptor>>;

    fn is_high_frequency(&self, key: DictKey) -> bool;
}

/// In-memory [`TermDictionary`].
#[derive(Debug, Default)]
pub struct MemoryTermDictionary {
    postings: RwLock<FnvHashMap<(SegmentId, DictKey, PostingChain), SegmentPostingDescriptor>>,
    high_frequency: RwLock<FnvHashSet<DictKey>>,
}

impl MemoryTermDictionary {
    pub fn new() -> Self {
        MemoryTermDictionary::default()
    }

    /// The descriptor has to be based at the segment's base doc id.
    pub fn insert(
        &self,
        segment: &SegmentInfo,
        key: DictKey,
        chain: PostingChain,
        descriptor: SegmentPostingDescriptor,
    ) -> crate::Result<()> {
        if descriptor.base_docid() != segment.base_docid {
            return Err(PostingError::InvalidArgument(format!(
                "posting based at {} inserted into segment {} based at {}",
                descriptor.base_docid(),
                segment.segment_id,
                segment.base_docid
            )));
        }
        self.postings.write().insert((segment.segment_id, key, chain), descriptor);
        Ok(())
    }

    pub fn mark_high_frequency(&self, key: DictKey) {
        self.high_frequency.write().insert(key);
    }

    pub fn len(&self) -> usize {
        self.postings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TermDictionary for MemoryTermDictionary {
    fn lookup(
        &self,
        segment: &SegmentInfo,
        key: DictKey,
        chain: &PostingChain,
    ) -> crate::Result<Option<SegmentPostingDescriptor>> {
        Ok(self.postings.read().get(&(segment.segment_id, key, chain.clone())).cloned())
    }

    fn is_high_frequency(&self, key: DictKey) -> bool {
        self.high_frequency.read().contains(&key)
    }
}
