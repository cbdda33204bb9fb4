use lazy_static::lazy_static;

mod doc_buffer_pool;
mod pooled_doc_buffer;

type PooledDocIds = Vec<u32>;

lazy_static! {
    /// Max number of pooled buffers to preserve in memory.
    /// Scaled according to the number of logical CPU cores to account for concurrent lookups.
    pub static ref POOL_KEEP_LIMIT: usize = num_cpus::get().clamp(8, 128) * 4;

    /// Process-wide pool the posting decoders check their doc buffers out of.
    pub static ref DOC_BUFFER_POOL: DocBufferPool = DocBufferPool::new();
}

pub use doc_buffer_pool::DocBufferPool;
pub use pooled_doc_buffer::PooledDocBuffer;
