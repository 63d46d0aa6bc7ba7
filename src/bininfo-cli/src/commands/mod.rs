//! Command handlers for bininfo CLI
//!
//! Each subcommand has its own module with handler functions.

pub mod configure;
pub mod header;
pub mod show;
pub mod summary;

use anyhow::{Context, Result};
use bininfo::BinFile;
use std::fs;
use std::path::Path;

use crate::render;

/// Read a whole file for inspection
pub(crate) fn read_input(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Validate the header, reporting size mismatches on stderr
pub(crate) fn open(data: &[u8]) -> Result<BinFile<'_>> {
    let bin = BinFile::parse(data).context("Not a BIN file")?;

    if let Some(warning) = bin.size_warning() {
        eprintln!("bininfo warning: {}", render::size_warning(&warning));
    }

    Ok(bin)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use bininfo::{Header, PatchTableWriter, RecordTag, BIN_SIGNATURE, HEADER_SIZE};
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// A small module with one export, one import chain and an address block
    pub fn module(truncate_table_by: usize) -> Vec<u8> {
        let mut writer = PatchTableWriter::new();
        writer
            .record(RecordTag::Rel32Export, 0x00, "Main")
            .record(RecordTag::RelI32, 0x05, "")
            .record(RecordTag::RelI32, 0x0a, "Print")
            .absolute_block(&[0x10, 0x14])
            .record(RecordTag::Main, 0x00, "");
        let mut table = writer.finish();
        table.truncate(table.len() - truncate_table_by);

        let image = [0x90u8; 16];
        let header = Header {
            jmp: [0xeb, 0x1e],
            module_align_bits: 4,
            reserved: 0,
            signature: BIN_SIGNATURE,
            org: 0,
            patch_table_offset: (HEADER_SIZE + image.len()) as i64,
            file_size: (HEADER_SIZE + image.len() + table.len()) as i64,
        };

        let mut data = header.to_bytes().to_vec();
        data.extend_from_slice(&image);
        data.extend_from_slice(&table);
        data
    }

    pub fn write(data: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(data).unwrap();
        file
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_rejects_non_bin() {
        let data = vec![0u8; 64];
        let err = open(&data).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid BIN signature"));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_input(&dir.path().join("missing.BIN")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
