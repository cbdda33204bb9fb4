mod buffered_posting_stream;
mod composite_posting_stream;
mod dynamic_posting_stream;
mod filtered_posting_stream;
mod posting_buffer;
mod posting_stream;

#[cfg(test)]
pub(crate) mod test_utils;

pub use buffered_posting_stream::BufferedPostingStream;
pub use composite_posting_stream::CompositePostingStream;
pub use dynamic_posting_stream::{DynamicEntry, DynamicPostingStream};
pub use filtered_posting_stream::{AttributeValueReader, FilteredPostingStream};
pub use posting_buffer::PostingBuffer;
pub use posting_stream::{PostingStream, TermPostingStream};
