//! Bounds-checked byte cursor over a patch table
//!
//! Every read the decoder makes goes through here. Reads past the end of the
//! buffer return `None` and leave the position unchanged.

use byteorder::{ByteOrder, LittleEndian};
use memchr::memchr;

pub(crate) struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Start at `pos`, which may lie past the end of `data`
    pub fn new(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Look at the next byte without consuming it
    #[inline]
    pub fn peek_u8(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        let b = self.peek_u8()?;
        self.pos += 1;
        Some(b)
    }

    pub fn read_u32(&mut self) -> Option<u32> {
        let bytes = self.take(4)?;
        Some(LittleEndian::read_u32(bytes))
    }

    /// Read a null-terminated string, consuming the terminator
    pub fn read_cstr(&mut self) -> Option<&'a [u8]> {
        let rest = self.data.get(self.pos..)?;
        let len = memchr(0, rest)?;
        self.pos += len + 1;
        Some(&rest[..len])
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let bytes = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_u32_le() {
        let data = [0x78, 0x56, 0x34, 0x12, 0xff];
        let mut cursor = Cursor::new(&data, 0);
        assert_eq!(cursor.read_u32(), Some(0x1234_5678));
        assert_eq!(cursor.position(), 4);
        assert_eq!(cursor.remaining(), 1);

        // Short read leaves the position alone
        assert_eq!(cursor.read_u32(), None);
        assert_eq!(cursor.position(), 4);
    }

    #[test]
    fn test_read_cstr() {
        let data = b"foo\0\0bar";
        let mut cursor = Cursor::new(data, 0);
        assert_eq!(cursor.read_cstr(), Some(&b"foo"[..]));
        assert_eq!(cursor.read_cstr(), Some(&b""[..]));
        assert_eq!(cursor.position(), 5);

        // No terminator before the end
        assert_eq!(cursor.read_cstr(), None);
        assert_eq!(cursor.position(), 5);
    }

    #[test]
    fn test_peek_does_not_advance() {
        let data = [0x03, 0x00];
        let mut cursor = Cursor::new(&data, 0);
        assert_eq!(cursor.peek_u8(), Some(0x03));
        assert_eq!(cursor.peek_u8(), Some(0x03));
        assert_eq!(cursor.read_u8(), Some(0x03));
        assert_eq!(cursor.read_u8(), Some(0x00));
        assert_eq!(cursor.peek_u8(), None);
        assert_eq!(cursor.read_u8(), None);
    }

    #[test]
    fn test_start_past_end() {
        let data = [0u8; 4];
        let mut cursor = Cursor::new(&data, 100);
        assert_eq!(cursor.remaining(), 0);
        assert_eq!(cursor.peek_u8(), None);
        assert_eq!(cursor.read_cstr(), None);
        assert_eq!(cursor.read_u32(), None);
    }
}
