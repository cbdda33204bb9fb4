use bitpacking::{BitPacker, BitPacker4x};

use crate::common::constants::DOC_BLOCK_LEN;

/// Worst case size of one bit-packed block.
pub const COMPRESSED_BLOCK_MAX_SIZE: usize = DOC_BLOCK_LEN * 4;

const STOP_BIT: u8 = 0x80;

/// Appends `value` using 7 bits per byte, the last byte carrying the stop bit.
pub fn write_vint(mut value: u32, output: &mut Vec<u8>) {
    loop {
        let next_byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            output.push(next_byte | STOP_BIT);
            return;
        }
        output.push(next_byte);
    }
}

/// Reads one vint starting at `*offset`, returns `None` on truncated input.
pub fn read_vint(data: &[u8], offset: &mut usize) -> Option<u32> {
    let mut result = 0u32;
    let mut shift = 0u32;
    while let Some(&byte) = data.get(*offset) {
        *offset += 1;
        if shift > 28 {
            return None;
        }
        result |= u32::from(byte & 0x7F) << shift;
        if byte & STOP_BIT != 0 {
            return Some(result);
        }
        shift += 7;
    }
    None
}

pub struct BlockEncoder {
    bitpacker: BitPacker4x,
    output: [u8; COMPRESSED_BLOCK_MAX_SIZE],
    vint_output: Vec<u8>,
}

impl Default for BlockEncoder {
    fn default() -> Self {
        BlockEncoder::new()
    }
}

impl BlockEncoder {
    pub fn new() -> BlockEncoder {
        BlockEncoder {
            bitpacker: BitPacker4x::new(),
            output: [0u8; COMPRESSED_BLOCK_MAX_SIZE],
            vint_output: Vec::new(),
        }
    }

    /// Bit-packs exactly [`DOC_BLOCK_LEN`] values. Returns `(num_bits, bytes)`.
    pub fn compress_block_unsorted(&mut self, block: &[u32]) -> (u8, &[u8]) {
        assert_eq!(block.len(), DOC_BLOCK_LEN);
        let num_bits = self.bitpacker.num_bits(block);
        let written_size = self.bitpacker.compress(block, &mut self.output[..], num_bits);
        (num_bits, &self.output[..written_size])
    }

    pub fn compress_vint_unsorted(&mut self, input: &[u32]) -> &[u8] {
        self.vint_output.clear();
        for &value in input {
            write_vint(value, &mut self.vint_output);
        }
        &self.vint_output[..]
    }
}

/// Decodes blocks written by [`BlockEncoder`] into an internal buffer.
pub struct BlockDecoder {
    bitpacker: BitPacker4x,
    output: [u32; DOC_BLOCK_LEN],
    pub output_len: usize,
}

impl Default for BlockDecoder {
    fn default() -> Self {
        BlockDecoder::new()
    }
}

impl Clone for BlockDecoder {
    fn clone(&self) -> Self {
        BlockDecoder::new()
    }
}

impl BlockDecoder {
    pub fn new() -> BlockDecoder {
        BlockDecoder { bitpacker: BitPacker4x::new(), output: [0u32; DOC_BLOCK_LEN], output_len: 0 }
    }

    /// Returns the number of consumed bytes, or `None` if `data` is too short.
    pub fn uncompress_block_unsorted(&mut self, data: &[u8], num_bits: u8) -> Option<usize> {
        let expected_len = num_bits as usize * DOC_BLOCK_LEN / 8;
        if num_bits > 32 || data.len() < expected_len {
            return None;
        }
        self.output_len = DOC_BLOCK_LEN;
        Some(self.bitpacker.decompress(&data[..expected_len], &mut self.output[..], num_bits))
    }

    /// Returns the number of consumed bytes, or `None` if `data` is truncated.
    pub fn uncompress_vint_unsorted(&mut self, data: &[u8], num_els: usize) -> Option<usize> {
        if num_els > DOC_BLOCK_LEN {
            return None;
        }
        let mut offset = 0;
        for slot in self.output[..num_els].iter_mut() {
            *slot = read_vint(data, &mut offset)?;
        }
        self.output_len = num_els;
        Some(offset)
    }

    pub fn output_array(&self) -> &[u32] {
        &self.output[..self.output_len]
    }
}
