mod attribute_reader;
mod building_segment;
mod segment_registry;
mod term;
mod term_dictionary;
mod term_hasher;

pub use attribute_reader::{FilterFactory, MemoryAttributeValues, RangeAttributeFilter, RangeFilterFactory};
pub use building_segment::{BuildingSegmentIndex, DynamicIndex};
pub use segment_registry::{SegmentId, SegmentInfo, SegmentRegistry, SegmentSnapshot};
pub use term::{validate_ranges, DocIdRange, IndexKind, Term};
pub use term_dictionary::{MemoryTermDictionary, PostingChain, TermDictionary};
pub use term_hasher::TermHasher;
