use crate::common::constants::{BLOCK_HEADER_LEN, DOC_BLOCK_LEN};
use crate::LocalDocId;

/// Fixed-size header in front of every block of a posting region.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// How many docs the block stores (1..=[`DOC_BLOCK_LEN`]).
    pub doc_count: u8,
    /// Bit width of a bit-packed doc section, `0` for a vint doc section.
    pub num_bits: u8,
    /// Last local doc id of the previous block, `0` for the first block.
    pub base_docid: LocalDocId,
    pub last_docid: LocalDocId,
    /// Sum of the term frequencies of all previous blocks.
    pub running_term_freq: u32,
    pub body_len: u32,
    pub body_crc: u32,
}

impl BlockHeader {
    pub fn serialize(&self, output: &mut Vec<u8>) {
        output.push(self.doc_count);
        output.push(self.num_bits);
        output.extend_from_slice(&0u16.to_le_bytes());
        output.extend_from_slice(&self.base_docid.to_le_bytes());
        output.extend_from_slice(&self.last_docid.to_le_bytes());
        output.extend_from_slice(&self.running_term_freq.to_le_bytes());
        output.extend_from_slice(&self.body_len.to_le_bytes());
        output.extend_from_slice(&self.body_crc.to_le_bytes());
    }

    /// Parses a header, returns a reason when the bytes can't be a header.
    pub fn deserialize(bytes: &[u8]) -> Result<BlockHeader, String> {
        if bytes.len() < BLOCK_HEADER_LEN {
            return Err(format!("block header needs {BLOCK_HEADER_LEN} bytes, got {}", bytes.len()));
        }
        let read_u32 = |offset: usize| {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(&bytes[offset..offset + 4]);
            u32::from_le_bytes(buf)
        };
        let header = BlockHeader {
            doc_count: bytes[0],
            num_bits: bytes[1],
            base_docid: read_u32(4),
            last_docid: read_u32(8),
            running_term_freq: read_u32(12),
            body_len: read_u32(16),
            body_crc: read_u32(20),
        };
        if header.doc_count == 0 || header.doc_count as usize > DOC_BLOCK_LEN {
            return Err(format!("invalid block doc count {}", header.doc_count));
        }
        if header.num_bits > 32 {
            return Err(format!("invalid bit width {}", header.num_bits));
        }
        if header.last_docid < header.base_docid {
            return Err(format!(
                "block last doc id {} is below its base {}",
                header.last_docid, header.base_docid
            ));
        }
        Ok(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let header = BlockHeader {
            doc_count: 128,
            num_bits: 5,
            base_docid: 10,
            last_docid: 700,
            running_term_freq: 42,
            body_len: 96,
            body_crc: 0xDEAD_BEEF,
        };
        let mut bytes = Vec::new();
        header.serialize(&mut bytes);
        assert_eq!(bytes.len(), BLOCK_HEADER_LEN);
        assert_eq!(BlockHeader::deserialize(&bytes), Ok(header));
    }

    #[test]
    fn test_header_rejects_garbage() {
        assert!(BlockHeader::deserialize(&[0u8; 4]).is_err());
        // doc_count == 0
        assert!(BlockHeader::deserialize(&[0u8; BLOCK_HEADER_LEN]).is_err());

        let mut bytes = Vec::new();
        BlockHeader { doc_count: 1, base_docid: 9, last_docid: 3, ..Default::default() }.serialize(&mut bytes);
        assert!(BlockHeader::deserialize(&bytes).is_err());
    }
}
