//! Inspector for TOSB BIN modules
//!
//! BIN modules are linked executables loaded by a minimal operating system
//! loader. A module is a fixed header followed by the image and a patch table.
//!
//! # Format Overview
//!
//! ## Header (32 bytes, little-endian)
//! - Bytes 0-1: Jump stub
//! - Byte 2: Module alignment exponent
//! - Byte 3: Reserved
//! - Bytes 4-7: "TOSB" signature
//! - Bytes 8-15: Origin address
//! - Bytes 16-23: Patch table offset (from the start of the file)
//! - Bytes 24-31: Declared file size
//!
//! ## Patch Table
//!
//! A stream of directives, each `[tag: u8] [value: u32] [symbol: cstr]`,
//! ended by a zero tag. Absolute-address blocks replace the symbol with
//! `value` raw `u32` entries. Consecutive relocation records with empty
//! symbols are use sites of the next named relocation record.

mod cursor;
mod decode;
mod file;
mod header;
mod summary;
mod tag;
mod writer;

pub use decode::{
    decode_patch_table, decode_patch_table_with, AbsoluteBlock, DecodeOptions, DecodedItem,
    ImportGroup, PatchStream, PatchTable, Record, DEFAULT_MAX_RECORDS,
};
pub use file::{BinFile, SizeWarning};
pub use header::{Header, BIN_SIGNATURE, HEADER_SIZE};
pub use summary::{Allocation, Export, Relocation, Summary};
pub use tag::{RecordTag, TagFamily};
pub use writer::PatchTableWriter;

/// Errors from BIN parsing
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data too short: need {needed} bytes, got {actual}")]
    DataTooShort { needed: usize, actual: usize },

    #[error("Invalid BIN signature: expected 'TOSB', got {0:02x?}")]
    InvalidSignature([u8; 4]),

    #[error("Invalid module alignment: 2^{0} does not fit in 64 bits")]
    InvalidAlignment(u8),

    #[error("Invalid file size {0} in header")]
    InvalidFileSize(i64),

    #[error("Invalid patch table offset {0} in header")]
    InvalidPatchTableOffset(i64),

    #[error("Truncated record at offset 0x{offset:x}")]
    TruncatedRecord { offset: usize },

    #[error("Truncated address block at offset 0x{offset:x}: {count} entries declared, {available} present")]
    TruncatedBlock {
        offset: usize,
        count: u32,
        available: usize,
    },

    #[error("Unterminated import chain at offset 0x{offset:x} (chain starts at 0x{chain_start:x})")]
    UnterminatedChain { offset: usize, chain_start: usize },

    #[error("Too many records: limit of {limit} reached at offset 0x{offset:x}")]
    TooManyRecords { limit: usize, offset: usize },
}

impl Error {
    /// Byte offset where decoding failed, for patch-table errors
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::TruncatedRecord { offset }
            | Error::TruncatedBlock { offset, .. }
            | Error::UnterminatedChain { offset, .. }
            | Error::TooManyRecords { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Check if data starts with a BIN header signature
pub fn is_bin(data: &[u8]) -> bool {
    data.len() >= 8 && data[4..8] == BIN_SIGNATURE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_bin() {
        assert!(is_bin(&[0xeb, 0x1e, 0x04, 0x00, b'T', b'O', b'S', b'B']));

        // Wrong signature
        assert!(!is_bin(&[0xeb, 0x1e, 0x04, 0x00, b'T', b'O', b'S', b'X']));

        // Too short
        assert!(!is_bin(&[0xeb, 0x1e, 0x04, 0x00, b'T']));
    }

    #[test]
    fn test_error_offset() {
        assert_eq!(Error::TruncatedRecord { offset: 7 }.offset(), Some(7));
        assert_eq!(
            Error::UnterminatedChain {
                offset: 12,
                chain_start: 3
            }
            .offset(),
            Some(12)
        );
        assert_eq!(Error::InvalidAlignment(64).offset(), None);
    }

    #[test]
    fn test_error_display() {
        let err = Error::InvalidSignature(*b"ELF\x7f");
        assert!(err.to_string().contains("Invalid BIN signature"));

        let err = Error::TruncatedBlock {
            offset: 0x20,
            count: 2,
            available: 1,
        };
        assert!(err.to_string().contains("offset 0x20"));
        assert!(err.to_string().contains("2 entries declared"));

        let err = Error::DataTooShort {
            needed: 32,
            actual: 8,
        };
        assert!(err.to_string().contains("Data too short"));

        let err = Error::TooManyRecords {
            limit: 10,
            offset: 0x40,
        };
        assert!(err.to_string().contains("limit of 10"));
    }
}
