use crate::core::posting_list::{CompressMode, FormatOptions, PostingRegionWriter, SegmentPostingDescriptor};
use crate::DocId;

/// Block layout a stream test runs against.
pub trait Layout {
    const REFERENCE: bool;
    const MODE: CompressMode;
}

pub struct DeltaBitpacked;
pub struct DeltaShortList;
pub struct ReferenceBitpacked;
pub struct ReferenceShortList;

impl Layout for DeltaBitpacked {
    const REFERENCE: bool = false;
    const MODE: CompressMode = CompressMode::Bitpacked;
}

impl Layout for DeltaShortList {
    const REFERENCE: bool = false;
    const MODE: CompressMode = CompressMode::ShortList;
}

impl Layout for ReferenceBitpacked {
    const REFERENCE: bool = true;
    const MODE: CompressMode = CompressMode::Bitpacked;
}

impl Layout for ReferenceShortList {
    const REFERENCE: bool = true;
    const MODE: CompressMode = CompressMode::ShortList;
}

/// Doc-list-only segment posting holding the local doc ids `docs`.
pub fn layout_descriptor<L: Layout>(base_docid: DocId, doc_count: u32, docs: &[u32]) -> SegmentPostingDescriptor {
    let format = FormatOptions::doc_list_only().with_reference_compressed(L::REFERENCE);
    let mut writer = PostingRegionWriter::new(format, L::MODE).unwrap();
    for &docid in docs {
        writer.add_doc(docid).unwrap();
    }
    writer.into_descriptor(base_docid, doc_count)
}

/// Delta bit-packed segment posting, the layout most tests don't care about.
pub fn segment_descriptor(base_docid: DocId, doc_count: u32, docs: &[u32]) -> SegmentPostingDescriptor {
    layout_descriptor::<DeltaBitpacked>(base_docid, doc_count, docs)
}
