use std::collections::BTreeMap;
use std::fmt;

use fnv::FnvHashMap;
use log::error;
use parking_lot::RwLock;

use crate::common::constants::END_DOCID;
use crate::core::stream::{DynamicEntry, DynamicPostingStream};
use crate::index::DocIdRange;
use crate::{DictKey, DocId, PostingError};

/// The mutable segment that receives real-time writes.
pub trait DynamicIndex: Send + Sync {
    /// Snapshot of the entries of `key`, `None` when the term was never written.
    fn lookup(&self, key: DictKey) -> Option<DynamicPostingStream>;

    /// Doc ids the segment can hold.
    fn doc_range(&self) -> DocIdRange;
}

/// In-memory [`DynamicIndex`] holding, per term, the doc ids written to it
/// and whether their last write was a delete.
pub struct BuildingSegmentIndex {
    base_docid: DocId,
    postings: RwLock<FnvHashMap<DictKey, BTreeMap<DocId, bool>>>,
}

impl fmt::Debug for BuildingSegmentIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildingSegmentIndex")
            .field("base_docid", &self.base_docid)
            .field("terms", &self.postings.read().len())
            .finish()
    }
}

impl BuildingSegmentIndex {
    pub fn new(base_docid: DocId) -> Self {
        BuildingSegmentIndex { base_docid, postings: RwLock::new(FnvHashMap::default()) }
    }

    pub fn base_docid(&self) -> DocId {
        self.base_docid
    }

    pub fn add(&self, key: DictKey, docid: DocId) -> crate::Result<()> {
        self.record(key, docid, false)
    }

    pub fn delete(&self, key: DictKey, docid: DocId) -> crate::Result<()> {
        self.record(key, docid, true)
    }

    fn record(&self, key: DictKey, docid: DocId, is_delete: bool) -> crate::Result<()> {
        if !self.doc_range().contains(docid) {
            let error_msg = format!(
                "[BuildingSegmentIndex] doc id {docid} is outside the segment range [{}, {})",
                self.base_docid, END_DOCID
            );
            error!("{}", error_msg);
            return Err(PostingError::InvalidArgument(error_msg));
        }
        self.postings.write().entry(key).or_default().insert(docid, is_delete);
        Ok(())
    }
}

impl DynamicIndex for BuildingSegmentIndex {
    fn lookup(&self, key: DictKey) -> Option<DynamicPostingStream> {
        let postings = self.postings.read();
        let entries = postings.get(&key)?;
        let entries: Vec<DynamicEntry> =
            entries.iter().map(|(&docid, &is_delete)| DynamicEntry { docid, is_delete }).collect();
        Some(DynamicPostingStream::from_sorted(entries))
    }

    fn doc_range(&self) -> DocIdRange {
        DocIdRange::new(self.base_docid, END_DOCID)
    }
}
