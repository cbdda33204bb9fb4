use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::common::file_operations::FileOperationError;
use crate::DocId;

/// The library's error enum
#[derive(Debug, Clone, Error)]
pub enum PostingError {
    /// The storage under a posting region failed while a block was materialized,
    /// or the block bytes are corrupted.
    #[error("Failed to decode posting block of segment based at {base_docid}: '{reason}'")]
    DecodeFailed { base_docid: DocId, reason: String },

    /// Caller-supplied doc-id ranges are empty, unsorted or overlapping.
    #[error("Invalid doc-id range: '{0}'")]
    InvalidRange(String),

    /// A truncated chain exists but neither the main chain nor the bitmap chain does.
    #[error("Truncate chain '{truncate_name}' has no main chain and no bitmap chain in segment {segment}")]
    MissingMainChain { truncate_name: String, segment: u32 },

    /// Invalid argument was passed by the user.
    #[error("An invalid argument was passed: '{0}'")]
    InvalidArgument(String),

    /// The dictionary failed while fetching a segment posting.
    #[error("Failed to fetch segment posting: '{0}'")]
    FetchFailed(String),

    /// IO Error.
    #[error("An IO error occurred: '{0}'")]
    IoError(Arc<io::Error>),

    /// An Error occurred in one of the threads.
    #[error("An error occurred in a thread: '{0}'")]
    ErrorInThread(String),

    /// System error. (e.g.: We failed spawning a new thread).
    #[error("System error.'{0}'")]
    SystemError(String),

    #[error("'{0}'")]
    FileOperationError(Arc<FileOperationError>),

    #[error("Invalid configuration: '{0}'")]
    InvalidConfig(String),

    #[error("Logger error: '{0}'")]
    LoggerError(String),
}

impl PostingError {
    pub fn decode_failed<TStr: ToString>(base_docid: DocId, reason: TStr) -> PostingError {
        PostingError::DecodeFailed { base_docid, reason: reason.to_string() }
    }
}

impl From<io::Error> for PostingError {
    fn from(io_err: io::Error) -> PostingError {
        PostingError::IoError(Arc::new(io_err))
    }
}

impl From<rayon::ThreadPoolBuildError> for PostingError {
    fn from(error: rayon::ThreadPoolBuildError) -> PostingError {
        PostingError::SystemError(error.to_string())
    }
}

impl From<serde_json::Error> for PostingError {
    fn from(serde_error: serde_json::Error) -> PostingError {
        PostingError::SystemError(serde_error.to_string())
    }
}

impl From<FileOperationError> for PostingError {
    fn from(error: FileOperationError) -> PostingError {
        PostingError::FileOperationError(Arc::new(error))
    }
}
