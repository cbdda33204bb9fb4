use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::index::{DocIdRange, DynamicIndex};
use crate::{DocId, PostingError};

pub type SegmentId = u32;

/// An immutable on-disk segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentInfo {
    pub segment_id: SegmentId,
    pub base_docid: DocId,
    pub doc_count: u32,
}

impl SegmentInfo {
    pub fn new(segment_id: SegmentId, base_docid: DocId, doc_count: u32) -> Self {
        SegmentInfo { segment_id, base_docid, doc_count }
    }

    pub fn end_docid(&self) -> DocId {
        self.base_docid + DocId::from(self.doc_count)
    }

    pub fn doc_range(&self) -> DocIdRange {
        DocIdRange::new(self.base_docid, self.end_docid())
    }
}

/// Point-in-time view of the segments a lookup runs against.
#[derive(Clone, Default)]
pub struct SegmentSnapshot {
    segments: Vec<SegmentInfo>,
    building: Option<Arc<dyn DynamicIndex>>,
}

impl fmt::Debug for SegmentSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentSnapshot")
            .field("segments", &self.segments)
            .field("building", &self.building.as_ref().map(|building| building.doc_range()))
            .finish()
    }
}

impl SegmentSnapshot {
    /// `segments` must be in creation order, which is ascending base doc id,
    /// and must not overlap each other or the building segment.
    pub fn new(segments: Vec<SegmentInfo>, building: Option<Arc<dyn DynamicIndex>>) -> crate::Result<Self> {
        if segments.windows(2).any(|pair| pair[1].base_docid < pair[0].end_docid()) {
            return Err(PostingError::InvalidArgument("segments overlap or are out of creation order".to_string()));
        }
        if let (Some(last), Some(building)) = (segments.last(), building.as_ref()) {
            if building.doc_range().begin < last.end_docid() {
                return Err(PostingError::InvalidArgument(
                    "building segment starts inside an on-disk segment".to_string(),
                ));
            }
        }
        Ok(SegmentSnapshot { segments, building })
    }

    pub fn segments(&self) -> &[SegmentInfo] {
        &self.segments
    }

    pub fn building(&self) -> Option<&Arc<dyn DynamicIndex>> {
        self.building.as_ref()
    }
}

/// Publishes segment snapshots to lookups. A lookup keeps the snapshot it
/// started with, publishing never disturbs it.
pub struct SegmentRegistry {
    current: ArcSwap<SegmentSnapshot>,
}

impl Default for SegmentRegistry {
    fn default() -> Self {
        SegmentRegistry::new(SegmentSnapshot::default())
    }
}

impl SegmentRegistry {
    pub fn new(snapshot: SegmentSnapshot) -> Self {
        SegmentRegistry { current: ArcSwap::from(Arc::new(snapshot)) }
    }

    pub fn snapshot(&self) -> Arc<SegmentSnapshot> {
        self.current.load_full()
    }

    pub fn publish(&self, snapshot: SegmentSnapshot) {
        self.current.store(Arc::new(snapshot));
    }
}
