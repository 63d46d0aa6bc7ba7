//! Patch-table decoding
//!
//! The table is a flat stream of `[tag] [value: u32] [symbol: cstr]` records.
//! Three shapes are layered on top of it:
//!
//! - Relocation/immediate records form import chains. Records with an empty
//!   symbol are use sites of the next named record, which ends the chain.
//!   A chain also ends when the next tag is outside the relocation family;
//!   that tag is left for the outer loop.
//! - An absolute-address record is followed by `value` raw `u32` entries.
//! - Everything else is a single record.
//!
//! ```text
//! 03 10000000 00         use site 0x10
//! 03 20000000 "bar" 00   use site 0x20, imports "bar"
//! 11 40000000 "foo" 00   exports "foo" at 0x40
//! 00                     end
//! ```

use std::borrow::Cow;
use std::iter::FusedIterator;

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::cursor::Cursor;
use crate::tag::{RecordTag, TagFamily};
use crate::{Error, Result};

/// Default cap on records decoded from one table
pub const DEFAULT_MAX_RECORDS: usize = 1 << 20;

/// One physical patch-table record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record<'a> {
    pub tag: RecordTag,
    /// Offset, immediate, size or count depending on the tag
    pub value: u32,
    /// Symbol name, empty for anonymous records
    pub symbol: Cow<'a, str>,
}

impl<'a> Record<'a> {
    pub fn new(tag: RecordTag, value: u32, symbol: impl Into<Cow<'a, str>>) -> Self {
        Self {
            tag,
            value,
            symbol: symbol.into(),
        }
    }

    #[inline]
    pub fn is_named(&self) -> bool {
        !self.symbol.is_empty()
    }

    pub fn into_owned(self) -> Record<'static> {
        Record {
            tag: self.tag,
            value: self.value,
            symbol: Cow::Owned(self.symbol.into_owned()),
        }
    }
}

/// Relocation records resolved against one imported symbol
///
/// All members but the last are anonymous use sites. The last member names
/// the symbol and is itself a use site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportGroup<'a> {
    members: Vec<Record<'a>>,
}

impl<'a> ImportGroup<'a> {
    /// Build a group, checking the chain shape
    pub fn new(members: Vec<Record<'a>>) -> Option<Self> {
        let (last, uses) = members.split_last()?;
        let well_formed = last.is_named()
            && uses.iter().all(|r| !r.is_named())
            && members.iter().all(|r| r.tag.is_import());

        well_formed.then_some(Self { members })
    }

    /// Imported symbol name
    pub fn symbol(&self) -> &str {
        self.members.last().map_or("", |r| r.symbol.as_ref())
    }

    /// Tag of the first member
    pub fn tag(&self) -> RecordTag {
        self.members.first().map_or(RecordTag::End, |r| r.tag)
    }

    pub fn members(&self) -> &[Record<'a>] {
        &self.members
    }

    /// Patch-site values of every member, in stream order
    pub fn sites(&self) -> impl Iterator<Item = u32> + '_ {
        self.members.iter().map(|r| r.value)
    }

    pub fn into_owned(self) -> ImportGroup<'static> {
        ImportGroup {
            members: self.members.into_iter().map(Record::into_owned).collect(),
        }
    }
}

/// Absolute-address entries following an `IET_ABS_ADDR` record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbsoluteBlock {
    pub addresses: Vec<u32>,
}

impl AbsoluteBlock {
    #[inline]
    pub fn count(&self) -> usize {
        self.addresses.len()
    }
}

/// A decoded patch-table item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodedItem<'a> {
    /// Export, allocation, entry point or unknown tag
    Record(Record<'a>),
    Import(ImportGroup<'a>),
    AbsoluteBlock(AbsoluteBlock),
    /// Anonymous relocation records cut off by a non-relocation tag before
    /// any record named their symbol
    UnresolvedUses(Vec<Record<'a>>),
}

impl DecodedItem<'_> {
    /// Number of physical records this item was decoded from
    pub fn record_count(&self) -> usize {
        match self {
            DecodedItem::Record(_) | DecodedItem::AbsoluteBlock(_) => 1,
            DecodedItem::Import(group) => group.members.len(),
            DecodedItem::UnresolvedUses(uses) => uses.len(),
        }
    }

    pub fn into_owned(self) -> DecodedItem<'static> {
        match self {
            DecodedItem::Record(r) => DecodedItem::Record(r.into_owned()),
            DecodedItem::Import(g) => DecodedItem::Import(g.into_owned()),
            DecodedItem::AbsoluteBlock(b) => DecodedItem::AbsoluteBlock(b),
            DecodedItem::UnresolvedUses(uses) => {
                DecodedItem::UnresolvedUses(uses.into_iter().map(Record::into_owned).collect())
            }
        }
    }
}

/// Decoder settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Cap on records plus absolute-address entries per table
    pub max_records: usize,
    /// Read a name between an address block's count and its entries
    pub named_address_blocks: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_records: DEFAULT_MAX_RECORDS,
            named_address_blocks: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Scanning,
    Done,
    Failed,
}

/// Lazy patch-table decoder
///
/// Yields items until the terminator, or a single error. Once either is
/// reached the stream stays exhausted.
pub struct PatchStream<'a> {
    cursor: Cursor<'a>,
    options: DecodeOptions,
    state: State,
    records: usize,
}

impl<'a> PatchStream<'a> {
    pub fn new(buffer: &'a [u8], offset: usize) -> Self {
        Self::with_options(buffer, offset, &DecodeOptions::default())
    }

    pub fn with_options(buffer: &'a [u8], offset: usize, options: &DecodeOptions) -> Self {
        Self {
            cursor: Cursor::new(buffer, offset),
            options: options.clone(),
            state: State::Scanning,
            records: 0,
        }
    }

    /// Current byte offset; just past the terminator once done
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// True once the terminator has been consumed
    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    fn next_item(&mut self) -> Result<Option<DecodedItem<'a>>> {
        let start = self.cursor.position();
        let byte = self
            .cursor
            .read_u8()
            .ok_or(Error::TruncatedRecord { offset: start })?;

        let tag = RecordTag::from(byte);
        if tag == RecordTag::End {
            debug!("patch table ends at 0x{:x}", start);
            return Ok(None);
        }

        self.count_records(1, start)?;
        trace!("{} at 0x{:x}", tag, start);

        let item = match tag.family() {
            TagFamily::Import => self.read_chain(tag, start)?,
            TagFamily::AbsoluteAddress => self.read_block(start)?,
            family => {
                if family == TagFamily::Unknown {
                    warn!("unknown patch tag {} at 0x{:x}", byte, start);
                }
                let (value, symbol) = self.read_body(start)?;
                DecodedItem::Record(Record { tag, value, symbol })
            }
        };

        Ok(Some(item))
    }

    /// Read the value and symbol of the record whose tag is at `start`
    fn read_body(&mut self, start: usize) -> Result<(u32, Cow<'a, str>)> {
        let value = self
            .cursor
            .read_u32()
            .ok_or(Error::TruncatedRecord { offset: start })?;
        let name = self
            .cursor
            .read_cstr()
            .ok_or(Error::TruncatedRecord { offset: start })?;

        Ok((value, String::from_utf8_lossy(name)))
    }

    /// Walk an import chain whose first tag has already been consumed
    fn read_chain(&mut self, first: RecordTag, chain_start: usize) -> Result<DecodedItem<'a>> {
        let mut members = Vec::new();
        let mut tag = first;
        let mut start = chain_start;

        loop {
            let (value, symbol) = self.read_body(start)?;
            let named = !symbol.is_empty();
            members.push(Record { tag, value, symbol });

            if named {
                return Ok(DecodedItem::Import(ImportGroup { members }));
            }

            // Anonymous use site: the next tag decides whether the chain goes on
            let next = self.cursor.position();
            match self.cursor.peek_u8().map(RecordTag::from) {
                None => {
                    return Err(Error::UnterminatedChain {
                        offset: next,
                        chain_start,
                    })
                }
                Some(next_tag) if next_tag.is_import() => {
                    self.count_records(1, next)?;
                    self.cursor.read_u8();
                    tag = next_tag;
                    start = next;
                }
                Some(next_tag) => {
                    warn!(
                        "{} use site(s) from 0x{:x} end at {} (0x{:x}) without a symbol",
                        members.len(),
                        chain_start,
                        next_tag,
                        next
                    );
                    return Ok(DecodedItem::UnresolvedUses(members));
                }
            }
        }
    }

    fn read_block(&mut self, start: usize) -> Result<DecodedItem<'a>> {
        let count = self
            .cursor
            .read_u32()
            .ok_or(Error::TruncatedRecord { offset: start })?;

        if self.options.named_address_blocks {
            self.cursor
                .read_cstr()
                .ok_or(Error::TruncatedRecord { offset: start })?;
        }

        let available = self.cursor.remaining() / 4;
        if count as usize > available {
            return Err(Error::TruncatedBlock {
                offset: start,
                count,
                available,
            });
        }
        self.count_records(count as usize, start)?;

        let mut addresses = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let address = self.cursor.read_u32().ok_or(Error::TruncatedBlock {
                offset: start,
                count,
                available,
            })?;
            addresses.push(address);
        }

        Ok(DecodedItem::AbsoluteBlock(AbsoluteBlock { addresses }))
    }

    fn count_records(&mut self, n: usize, offset: usize) -> Result<()> {
        let limit = self.options.max_records;
        match self.records.checked_add(n) {
            Some(total) if total <= limit => {
                self.records = total;
                Ok(())
            }
            _ => Err(Error::TooManyRecords { limit, offset }),
        }
    }
}

impl<'a> Iterator for PatchStream<'a> {
    type Item = Result<DecodedItem<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state != State::Scanning {
            return None;
        }

        match self.next_item() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => {
                self.state = State::Done;
                None
            }
            Err(e) => {
                self.state = State::Failed;
                Some(Err(e))
            }
        }
    }
}

impl FusedIterator for PatchStream<'_> {}

/// Result of decoding a whole table
///
/// Items decoded before an error are kept alongside it.
#[derive(Debug)]
pub struct PatchTable<'a> {
    pub items: Vec<DecodedItem<'a>>,
    pub error: Option<Error>,
    /// Offset just past the terminator, when one was reached
    pub end: Option<usize>,
}

impl<'a> PatchTable<'a> {
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Drop partial results in favour of the error
    pub fn into_result(self) -> Result<Vec<DecodedItem<'a>>> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.items),
        }
    }
}

/// Decode the patch table starting at `offset` in `buffer`
pub fn decode_patch_table(buffer: &[u8], offset: usize) -> PatchTable<'_> {
    decode_patch_table_with(buffer, offset, &DecodeOptions::default())
}

pub fn decode_patch_table_with<'a>(
    buffer: &'a [u8],
    offset: usize,
    options: &DecodeOptions,
) -> PatchTable<'a> {
    debug!(
        "decoding patch table at 0x{:x} ({} byte buffer)",
        offset,
        buffer.len()
    );

    let mut stream = PatchStream::with_options(buffer, offset, options);
    let mut items = Vec::new();
    let mut error = None;

    for item in &mut stream {
        match item {
            Ok(item) => items.push(item),
            Err(e) => {
                debug!("patch table decode failed: {}", e);
                error = Some(e);
                break;
            }
        }
    }

    let end = stream.is_done().then(|| stream.position());
    PatchTable { items, error, end }
}
