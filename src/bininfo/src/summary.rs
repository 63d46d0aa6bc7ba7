//! Flattened view of a decoded patch table

use serde::Serialize;

use crate::decode::DecodedItem;
use crate::tag::{RecordTag, TagFamily};

/// A patch site and the symbol it resolves against
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relocation {
    pub tag: RecordTag,
    /// `None` for absolute-address entries and unresolved use sites
    pub symbol: Option<String>,
    pub site: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Export {
    pub tag: RecordTag,
    pub name: String,
    pub offset: u32,
}

/// Heap allocation requested by the module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Allocation {
    pub tag: RecordTag,
    pub size: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub relocations: Vec<Relocation>,
    /// Sorted by offset
    pub exports: Vec<Export>,
    pub allocations: Vec<Allocation>,
    pub entry_point: Option<u32>,
    /// Records with tags outside the known set
    pub unknown: usize,
}

impl Summary {
    pub fn from_items(items: &[DecodedItem<'_>]) -> Self {
        let mut summary = Summary::default();

        for item in items {
            match item {
                DecodedItem::Import(group) => {
                    let symbol = group.symbol();
                    summary
                        .relocations
                        .extend(group.members().iter().map(|r| Relocation {
                            tag: r.tag,
                            symbol: Some(symbol.to_string()),
                            site: r.value,
                        }));
                }
                DecodedItem::UnresolvedUses(uses) => {
                    summary.relocations.extend(uses.iter().map(|r| Relocation {
                        tag: r.tag,
                        symbol: None,
                        site: r.value,
                    }));
                }
                DecodedItem::AbsoluteBlock(block) => {
                    summary
                        .relocations
                        .extend(block.addresses.iter().map(|&site| Relocation {
                            tag: RecordTag::AbsAddr,
                            symbol: None,
                            site,
                        }));
                }
                DecodedItem::Record(record) => match record.tag.family() {
                    TagFamily::Export => summary.exports.push(Export {
                        tag: record.tag,
                        name: record.symbol.to_string(),
                        offset: record.value,
                    }),
                    TagFamily::Allocation => summary.allocations.push(Allocation {
                        tag: record.tag,
                        size: record.value,
                    }),
                    TagFamily::Main => summary.entry_point = Some(record.value),
                    _ => summary.unknown += 1,
                },
            }
        }

        summary.exports.sort_by_key(|e| e.offset);
        summary
    }

    /// Distinct imported symbols in first-seen order
    pub fn imported_symbols(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for symbol in self.relocations.iter().filter_map(|r| r.symbol.as_deref()) {
            if !seen.contains(&symbol) {
                seen.push(symbol);
            }
        }
        seen
    }
}
