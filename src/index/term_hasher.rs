use std::hash::Hasher;

use fnv::FnvHasher;

use crate::common::constants::NULL_TERM_KEY;
use crate::index::{IndexKind, Term};
use crate::DictKey;

/// Resolves terms to dictionary keys for one index kind.
#[derive(Debug, Default, Clone, Copy)]
pub struct TermHasher {
    kind: IndexKind,
}

impl TermHasher {
    pub fn new(kind: IndexKind) -> Self {
        TermHasher { kind }
    }

    /// `None` when the word can't be a term of this index kind.
    pub fn hash_term(&self, term: &Term) -> Option<DictKey> {
        if term.is_null() {
            return Some(NULL_TERM_KEY);
        }
        if self.kind.has_numeric_terms() {
            return term.word().trim().parse::<i64>().ok().map(|value| value as DictKey);
        }
        Some(self.hash_bytes(term.word().as_bytes()))
    }

    pub fn hash_bytes(&self, bytes: &[u8]) -> DictKey {
        let mut hasher = FnvHasher::default();
        hasher.write(bytes);
        hasher.finish()
    }
}
