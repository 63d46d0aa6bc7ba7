//! BIN header parsing

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use crate::{Error, Result};

/// Header size in bytes
pub const HEADER_SIZE: usize = 32;

/// Signature at bytes 4-7: "TOSB"
pub const BIN_SIGNATURE: [u8; 4] = *b"TOSB";

// Field offsets
const ALIGN_BITS: usize = 2;
const RESERVED: usize = 3;
const SIGNATURE: usize = 4;
const ORG: usize = 8;
const PATCH_TABLE_OFFSET: usize = 16;
const FILE_SIZE: usize = 24;

/// BIN file header (32 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Header {
    /// Jump stub over the header
    pub jmp: [u8; 2],
    /// Module alignment as a power-of-two exponent
    pub module_align_bits: u8,
    pub reserved: u8,
    pub signature: [u8; 4],
    /// Load origin address
    pub org: i64,
    /// Patch table offset from the start of the file
    pub patch_table_offset: i64,
    /// Declared size of the whole file, header included
    pub file_size: i64,
}

impl Header {
    /// Parse and validate a header from the start of `data`
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(Error::DataTooShort {
                needed: HEADER_SIZE,
                actual: data.len(),
            });
        }

        let mut signature = [0u8; 4];
        signature.copy_from_slice(&data[SIGNATURE..SIGNATURE + 4]);
        if signature != BIN_SIGNATURE {
            return Err(Error::InvalidSignature(signature));
        }

        let module_align_bits = data[ALIGN_BITS];
        if 1u64.checked_shl(u32::from(module_align_bits)).is_none() {
            return Err(Error::InvalidAlignment(module_align_bits));
        }

        Ok(Self {
            jmp: [data[0], data[1]],
            module_align_bits,
            reserved: data[RESERVED],
            signature,
            org: LittleEndian::read_i64(&data[ORG..]),
            patch_table_offset: LittleEndian::read_i64(&data[PATCH_TABLE_OFFSET..]),
            file_size: LittleEndian::read_i64(&data[FILE_SIZE..]),
        })
    }

    /// Module alignment in bytes
    #[inline]
    pub fn alignment(&self) -> u64 {
        1u64 << self.module_align_bits
    }

    /// Serialize back to the on-disk layout
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[..2].copy_from_slice(&self.jmp);
        out[ALIGN_BITS] = self.module_align_bits;
        out[RESERVED] = self.reserved;
        out[SIGNATURE..SIGNATURE + 4].copy_from_slice(&self.signature);
        LittleEndian::write_i64(&mut out[ORG..], self.org);
        LittleEndian::write_i64(&mut out[PATCH_TABLE_OFFSET..], self.patch_table_offset);
        LittleEndian::write_i64(&mut out[FILE_SIZE..], self.file_size);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Header {
        Header {
            jmp: [0xeb, 0x1e],
            module_align_bits: 4,
            reserved: 0,
            signature: BIN_SIGNATURE,
            org: 0x7fff_ffff_ffff_ffff,
            patch_table_offset: 0x60,
            file_size: 0x80,
        }
    }

    #[test]
    fn test_header_size() {
        assert_eq!(HEADER_SIZE, 32);
    }

    #[test]
    fn test_header_parse() {
        let bytes = sample().to_bytes();
        let header = Header::from_bytes(&bytes).unwrap();
        assert_eq!(header, sample());
        assert_eq!(header.alignment(), 16);
        assert_eq!(&bytes[4..8], b"TOSB");
        assert_eq!(bytes[16], 0x60);
    }

    #[test]
    fn test_header_parse_too_short() {
        let data = [0u8; 16];
        assert!(matches!(
            Header::from_bytes(&data),
            Err(Error::DataTooShort {
                needed: 32,
                actual: 16
            })
        ));
    }

    #[test]
    fn test_header_bad_signature() {
        let mut bytes = sample().to_bytes();
        bytes[7] = b'X';
        assert!(matches!(
            Header::from_bytes(&bytes),
            Err(Error::InvalidSignature(sig)) if &sig == b"TOSX"
        ));
    }

    #[test]
    fn test_header_alignment_limits() {
        let mut bytes = sample().to_bytes();
        bytes[2] = 63;
        assert_eq!(Header::from_bytes(&bytes).unwrap().alignment(), 1 << 63);

        bytes[2] = 64;
        assert!(matches!(
            Header::from_bytes(&bytes),
            Err(Error::InvalidAlignment(64))
        ));
    }
}
