//! Whole-file view of a BIN module

use log::{debug, warn};
use serde::Serialize;

use crate::decode::{decode_patch_table_with, DecodeOptions, PatchStream, PatchTable};
use crate::header::{Header, HEADER_SIZE};
use crate::{Error, Result};

/// Mismatch between the declared and actual file size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeWarning {
    /// Fewer bytes than the header declares
    Truncated { expected: usize, actual: usize },
    /// Bytes beyond the declared size, which are ignored
    TrailingBytes { expected: usize, actual: usize },
}

/// A validated BIN module borrowed from a byte buffer
#[derive(Debug)]
pub struct BinFile<'a> {
    pub header: Header,
    /// File contents up to the declared size
    data: &'a [u8],
    patch_table_offset: usize,
    warning: Option<SizeWarning>,
}

impl<'a> BinFile<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let header = Header::from_bytes(data)?;

        let file_size = usize::try_from(header.file_size)
            .ok()
            .filter(|&size| size >= HEADER_SIZE)
            .ok_or(Error::InvalidFileSize(header.file_size))?;

        let patch_table_offset = usize::try_from(header.patch_table_offset)
            .map_err(|_| Error::InvalidPatchTableOffset(header.patch_table_offset))?;

        let warning = if data.len() < file_size {
            Some(SizeWarning::Truncated {
                expected: file_size,
                actual: data.len(),
            })
        } else if data.len() > file_size {
            Some(SizeWarning::TrailingBytes {
                expected: file_size,
                actual: data.len(),
            })
        } else {
            None
        };

        if let Some(w) = &warning {
            warn!("BIN size mismatch: {:?}", w);
        }
        debug!(
            "BIN header ok: align {}, patch table at 0x{:x}, {} bytes",
            header.alignment(),
            patch_table_offset,
            file_size
        );

        Ok(Self {
            header,
            data: &data[..file_size.min(data.len())],
            patch_table_offset,
            warning,
        })
    }

    /// Bytes the patch table is decoded from
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn patch_table_offset(&self) -> usize {
        self.patch_table_offset
    }

    pub fn size_warning(&self) -> Option<SizeWarning> {
        self.warning
    }

    /// Module image following the header
    pub fn image(&self) -> &'a [u8] {
        self.data.get(HEADER_SIZE..).unwrap_or(&[])
    }

    pub fn patch_stream(&self, options: &DecodeOptions) -> PatchStream<'a> {
        PatchStream::with_options(self.data, self.patch_table_offset, options)
    }

    pub fn patch_table(&self, options: &DecodeOptions) -> PatchTable<'a> {
        decode_patch_table_with(self.data, self.patch_table_offset, options)
    }
}
