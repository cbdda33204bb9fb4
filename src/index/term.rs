use log::warn;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::{DocId, PostingError};

/// Half-open doc id range `[begin, end)`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocIdRange {
    pub begin: DocId,
    pub end: DocId,
}

impl DocIdRange {
    pub fn new(begin: DocId, end: DocId) -> Self {
        DocIdRange { begin, end }
    }

    pub fn is_empty(&self) -> bool {
        self.begin >= self.end
    }

    pub fn contains(&self, docid: DocId) -> bool {
        self.begin <= docid && docid < self.end
    }

    pub fn intersects(&self, other: &DocIdRange) -> bool {
        self.begin < other.end && other.begin < self.end
    }
}

/// Hint ranges are valid when each one is non-empty, and they are sorted
/// by `begin` without overlapping.
pub fn validate_ranges(ranges: &[DocIdRange]) -> crate::Result<()> {
    if let Some(range) = ranges.iter().find(|range| range.is_empty()) {
        let error_msg = format!("range [{}, {}) is empty", range.begin, range.end);
        warn!("{}", error_msg);
        return Err(PostingError::InvalidRange(error_msg));
    }
    if let Some(pair) = ranges.windows(2).find(|pair| pair[1].begin < pair[0].end) {
        let error_msg = format!(
            "range [{}, {}) is unsorted or overlaps [{}, {})",
            pair[1].begin, pair[1].end, pair[0].begin, pair[0].end
        );
        warn!("{}", error_msg);
        return Err(PostingError::InvalidRange(error_msg));
    }
    Ok(())
}

/// Flavour of an index. Range, date and spatial indexes store coarse terms
/// whose hits may need an exact check.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Default, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    #[default]
    Normal,
    Range,
    Date,
    Spatial,
}

impl IndexKind {
    /// Only spatial terms over-approximate enough to need a per-document check.
    pub fn needs_inner_filter(&self) -> bool {
        matches!(self, IndexKind::Spatial)
    }

    /// Range and date words are numbers and resolve to themselves.
    pub fn has_numeric_terms(&self) -> bool {
        matches!(self, IndexKind::Range | IndexKind::Date)
    }
}

/// Term of a lookup, immutable once built.
#[derive(TypedBuilder, Debug, Clone, PartialEq, Eq)]
pub struct Term {
    #[builder(setter(into))]
    index_name: String,

    #[builder(default, setter(into))]
    word: String,

    /// Name of the truncated chain to rank with, if any.
    #[builder(default, setter(into, strip_option))]
    truncate_name: Option<String>,

    /// Restricts the lookup to these doc ids. Empty means everything.
    #[builder(default)]
    hint_ranges: Vec<DocIdRange>,

    #[builder(default = false)]
    is_null: bool,
}

impl Term {
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn truncate_name(&self) -> Option<&str> {
        self.truncate_name.as_deref()
    }

    pub fn hint_ranges(&self) -> &[DocIdRange] {
        &self.hint_ranges
    }

    pub fn is_null(&self) -> bool {
        self.is_null
    }

    /// Whether any doc of `range` may be selected by the hint ranges.
    pub fn selects(&self, range: &DocIdRange) -> bool {
        self.hint_ranges.is_empty() || self.hint_ranges.iter().any(|hint| hint.intersects(range))
    }
}
