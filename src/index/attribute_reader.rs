use std::fmt;
use std::sync::Arc;

use fnv::FnvHashMap;

use crate::core::stream::AttributeValueReader;
use crate::index::Term;
use crate::DocId;

/// Builds the exact per-document check of a term whose index kind needs one.
pub trait FilterFactory: Send + Sync {
    /// `None` leaves the term's stream unfiltered.
    fn create_filter(&self, term: &Term) -> Option<Box<dyn AttributeValueReader>>;
}

/// Per-document attribute values shared by every filter created over them.
#[derive(Debug, Default, Clone)]
pub struct MemoryAttributeValues {
    values: Arc<FnvHashMap<DocId, i64>>,
}

impl MemoryAttributeValues {
    pub fn new(values: impl IntoIterator<Item = (DocId, i64)>) -> Self {
        MemoryAttributeValues { values: Arc::new(values.into_iter().collect()) }
    }

    pub fn get(&self, docid: DocId) -> Option<i64> {
        self.values.get(&docid).copied()
    }

    /// Filter accepting the docs whose value lies in `[low, high]`.
    pub fn range_filter(&self, low: i64, high: i64) -> RangeAttributeFilter {
        RangeAttributeFilter { values: self.clone(), low, high, tested: 0 }
    }
}

/// Accepts docs whose attribute value lies in an inclusive range. Docs
/// without a value are rejected.
#[derive(Clone)]
pub struct RangeAttributeFilter {
    values: MemoryAttributeValues,
    low: i64,
    high: i64,
    tested: usize,
}

impl fmt::Debug for RangeAttributeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeAttributeFilter")
            .field("low", &self.low)
            .field("high", &self.high)
            .field("tested", &self.tested)
            .finish()
    }
}

impl RangeAttributeFilter {
    /// How many docs this filter instance has tested.
    pub fn tested(&self) -> usize {
        self.tested
    }
}

impl AttributeValueReader for RangeAttributeFilter {
    fn test(&mut self, docid: DocId) -> bool {
        self.tested += 1;
        self.values.get(docid).map_or(false, |value| self.low <= value && value <= self.high)
    }

    fn box_clone(&self) -> Box<dyn AttributeValueReader> {
        Box::new(RangeAttributeFilter { tested: 0, ..self.clone() })
    }
}

/// Filters terms of the form `"<low>,<high>"` against shared attribute values.
#[derive(Debug, Clone)]
pub struct RangeFilterFactory {
    values: MemoryAttributeValues,
}

impl RangeFilterFactory {
    pub fn new(values: MemoryAttributeValues) -> Self {
        RangeFilterFactory { values }
    }
}

impl FilterFactory for RangeFilterFactory {
    fn create_filter(&self, term: &Term) -> Option<Box<dyn AttributeValueReader>> {
        let (low, high) = term.word().split_once(',')?;
        let low = low.trim().parse().ok()?;
        let high = high.trim().parse().ok()?;
        Some(Box::new(self.values.range_filter(low, high)))
    }
}
