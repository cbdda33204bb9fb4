/// Global document id. Segment-local ids are [`LocalDocId`] offset by the segment base.
pub type DocId = i64;
pub type LocalDocId = u32;
pub type TermFreq = i32;
pub type DocFreq = u32;
/// Key a term resolves to inside the dictionary.
pub type DictKey = u64;
