use serde::{Deserialize, Serialize};

/// Which optional per-document sections a posting carries, and how doc ids
/// are laid out inside a block.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Default, Clone, Copy)]
pub struct FormatOptions {
    #[serde(default)]
    pub has_term_freq: bool,

    #[serde(default)]
    pub has_doc_payload: bool,

    #[serde(default)]
    pub has_field_map: bool,

    #[serde(default)]
    pub has_position: bool,

    /// Blocks store absolute local doc ids instead of deltas, which allows
    /// binary search inside a decoded block.
    #[serde(default)]
    pub reference_compressed: bool,
}

impl FormatOptions {
    /// Doc ids only, as used by bitmap chains.
    pub fn doc_list_only() -> Self {
        FormatOptions::default()
    }

    /// Term frequencies, payloads, field maps and positions.
    pub fn full() -> Self {
        FormatOptions {
            has_term_freq: true,
            has_doc_payload: true,
            has_field_map: true,
            has_position: true,
            reference_compressed: false,
        }
    }

    pub fn with_reference_compressed(mut self, reference_compressed: bool) -> Self {
        self.reference_compressed = reference_compressed;
        self
    }

    /// Positions are stored per term occurrence and need term frequencies.
    pub fn is_valid(&self) -> bool {
        !self.has_position || self.has_term_freq
    }
}

#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Default, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum CompressMode {
    /// Full blocks are bit-packed, the tail block is vint encoded.
    #[default]
    #[serde(rename = "bitpacked")]
    Bitpacked,

    /// Every block is vint encoded.
    #[serde(rename = "short_list")]
    ShortList,
}
