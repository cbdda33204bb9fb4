use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Kind of postings the caller wants for a high-frequency term.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Default, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum PostingType {
    #[default]
    Normal,
    /// Doc ids only, served from the bitmap chain when the term has one.
    Bitmap,
}

#[derive(TypedBuilder, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupOptions {
    #[builder(default)]
    pub posting_type: PostingType,

    /// Merge the building segment's entries into the stream.
    #[builder(default = true)]
    pub include_building: bool,
}

impl Default for LookupOptions {
    fn default() -> Self {
        LookupOptions::builder().build()
    }
}
