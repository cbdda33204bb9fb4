pub mod buffer;
pub mod posting_list;
pub mod stream;

pub use posting_list::{TermMatchData, TermStats};
pub use stream::{
    AttributeValueReader, BufferedPostingStream, CompositePostingStream, DynamicEntry, DynamicPostingStream,
    FilteredPostingStream, PostingBuffer, PostingStream, TermPostingStream,
};
