//! Patch-table encoding
//!
//! Produces the byte layout the decoder reads. Used to build fixtures.

use byteorder::{LittleEndian, WriteBytesExt};

use crate::decode::{AbsoluteBlock, DecodeOptions, DecodedItem, ImportGroup, Record};
use crate::tag::RecordTag;

/// Builds a patch table in memory
#[derive(Debug, Default)]
pub struct PatchTableWriter {
    buf: Vec<u8>,
    named_address_blocks: bool,
}

impl PatchTableWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match the address-block layout the decoder is configured for
    pub fn with_options(options: &DecodeOptions) -> Self {
        Self {
            buf: Vec::new(),
            named_address_blocks: options.named_address_blocks,
        }
    }

    /// Append one `[tag] [value] [symbol]` record
    ///
    /// Symbols are written up to their first NUL byte.
    pub fn record(&mut self, tag: RecordTag, value: u32, symbol: &str) -> &mut Self {
        let name = symbol.as_bytes();
        let name = memchr::memchr(0, name).map_or(name, |end| &name[..end]);

        self.buf.push(tag.to_byte());
        self.put_u32(value);
        self.buf.extend_from_slice(name);
        self.buf.push(0);
        self
    }

    fn put_record(&mut self, record: &Record<'_>) -> &mut Self {
        self.record(record.tag, record.value, &record.symbol)
    }

    pub fn import_group(&mut self, group: &ImportGroup<'_>) -> &mut Self {
        for member in group.members() {
            self.put_record(member);
        }
        self
    }

    pub fn absolute_block(&mut self, addresses: &[u32]) -> &mut Self {
        let count = u32::try_from(addresses.len()).unwrap_or(u32::MAX);

        self.buf.push(RecordTag::AbsAddr.to_byte());
        self.put_u32(count);
        if self.named_address_blocks {
            self.buf.push(0);
        }
        for &address in addresses.iter().take(count as usize) {
            self.put_u32(address);
        }
        self
    }

    pub fn item(&mut self, item: &DecodedItem<'_>) -> &mut Self {
        match item {
            DecodedItem::Record(record) => self.put_record(record),
            DecodedItem::Import(group) => self.import_group(group),
            DecodedItem::AbsoluteBlock(AbsoluteBlock { addresses }) => {
                self.absolute_block(addresses)
            }
            DecodedItem::UnresolvedUses(uses) => {
                for record in uses {
                    self.put_record(record);
                }
                self
            }
        }
    }

    /// Bytes written so far, without the terminator
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append the terminator and return the table
    pub fn finish(mut self) -> Vec<u8> {
        self.buf.push(RecordTag::End.to_byte());
        self.buf
    }

    fn put_u32(&mut self, value: u32) {
        // Writes into a Vec cannot fail
        let _ = self.buf.write_u32::<LittleEndian>(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_layout() {
        let mut writer = PatchTableWriter::new();
        writer.record(RecordTag::Imm32Export, 0x10, "foo");
        assert_eq!(
            writer.finish(),
            vec![0x11, 0x10, 0x00, 0x00, 0x00, b'f', b'o', b'o', 0x00, 0x00]
        );
    }

    #[test]
    fn test_symbol_cut_at_nul() {
        let mut writer = PatchTableWriter::new();
        writer.record(RecordTag::Main, 0, "a\0b");
        assert_eq!(writer.as_bytes(), &[0x19, 0, 0, 0, 0, b'a', 0x00]);
    }

    #[test]
    fn test_absolute_block_layout() {
        let mut writer = PatchTableWriter::new();
        writer.absolute_block(&[0x1234_5678]);
        assert_eq!(
            writer.as_bytes(),
            &[0x14, 0x01, 0x00, 0x00, 0x00, 0x78, 0x56, 0x34, 0x12]
        );

        let options = DecodeOptions {
            named_address_blocks: true,
            ..Default::default()
        };
        let mut writer = PatchTableWriter::with_options(&options);
        writer.absolute_block(&[]);
        assert_eq!(writer.as_bytes(), &[0x14, 0, 0, 0, 0, 0x00]);
    }
}
