pub mod common;
pub mod config;
pub mod core;
pub mod index;
pub mod logger;
pub mod lookup;

pub use common::errors::PostingError;
pub use common::types::*;
pub use config::{HighFrequencyPolicy, LookupConfig};
pub use core::{
    AttributeValueReader, BufferedPostingStream, CompositePostingStream, DynamicEntry, DynamicPostingStream,
    FilteredPostingStream, PostingStream, TermMatchData, TermPostingStream, TermStats,
};
pub use index::{DocIdRange, IndexKind, Term};
pub use logger::LoggerConfig;
pub use lookup::{LookupCoordinator, LookupOptions, PostingType};

/// Alias for the crate-wide result type.
pub type Result<T> = std::result::Result<T, PostingError>;
