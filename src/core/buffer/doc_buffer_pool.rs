use parking_lot::Mutex;

use crate::common::constants::DOC_BLOCK_LEN;
use crate::core::buffer::pooled_doc_buffer::PooledDocBuffer;
use crate::core::buffer::{PooledDocIds, POOL_KEEP_LIMIT};

#[derive(Debug)]
pub struct DocBufferPool {
    pool: Mutex<Vec<PooledDocIds>>,
}

impl DocBufferPool {
    pub fn new() -> Self {
        DocBufferPool { pool: Mutex::new(Vec::with_capacity(*POOL_KEEP_LIMIT)) }
    }

    /// Checks out an empty buffer with room for one block.
    pub fn get(&self) -> PooledDocBuffer<'_> {
        match self.pool.lock().pop() {
            None => PooledDocBuffer::new(self, Vec::with_capacity(DOC_BLOCK_LEN)),
            Some(data) => PooledDocBuffer::new(self, data),
        }
    }

    pub(super) fn return_back(&self, mut data: PooledDocIds) {
        data.clear();
        let mut pool = self.pool.lock();
        if pool.len() < *POOL_KEEP_LIMIT {
            pool.push(data);
        }
    }

    pub fn pooled_count(&self) -> usize {
        self.pool.lock().len()
    }
}

impl Default for DocBufferPool {
    fn default() -> Self {
        Self::new()
    }
}
