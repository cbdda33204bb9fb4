use std::fmt;

use crate::core::buffer::doc_buffer_pool::DocBufferPool;
use crate::core::buffer::PooledDocIds;

/// A doc buffer checked out of a [`DocBufferPool`], returned to it on drop.
pub struct PooledDocBuffer<'a> {
    pool: &'a DocBufferPool,
    pub buffer: PooledDocIds,
}

impl<'a> PooledDocBuffer<'a> {
    pub fn new(pool: &'a DocBufferPool, buffer: PooledDocIds) -> Self {
        PooledDocBuffer { pool, buffer }
    }
}

impl<'a> fmt::Debug for PooledDocBuffer<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledDocBuffer").field("len", &self.buffer.len()).finish()
    }
}

impl<'a> Drop for PooledDocBuffer<'a> {
    fn drop(&mut self) {
        self.pool.return_back(std::mem::take(&mut self.buffer));
    }
}
