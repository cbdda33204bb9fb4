pub mod constants;
pub mod errors;
pub mod executor;
pub mod file_operations;
pub mod future_result;
pub mod types;

pub use executor::{shared_multi_thread_executor, Executor};
pub use future_result::FutureResult;
