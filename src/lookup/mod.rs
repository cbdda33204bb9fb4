mod lookup_coordinator;
mod lookup_options;
mod segment_fetch;

pub use lookup_coordinator::LookupCoordinator;
pub use lookup_options::{LookupOptions, PostingType};
