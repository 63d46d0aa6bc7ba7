//! Text rendering of headers and patch tables

use std::fmt::{self, Write};

use bininfo::{DecodedItem, Header, RecordTag, SizeWarning, Summary, TagFamily};

/// Address values per output line
const ADDRESSES_PER_LINE: usize = 8;

pub fn header(out: &mut impl Write, header: &Header) -> fmt::Result {
    writeln!(out, "BIN header:")?;
    writeln!(
        out,
        "    jmp                 [{:02X} {:02X}]h",
        header.jmp[0], header.jmp[1]
    )?;
    writeln!(out, "    alignment           {} byte(s)", header.alignment())?;
    writeln!(out, "    org                 {:016X} ({})", header.org, header.org)?;
    writeln!(
        out,
        "    patch_table_offset  {:016X} ({})",
        header.patch_table_offset, header.patch_table_offset
    )?;
    writeln!(
        out,
        "    file_size           {:016X} ({})",
        header.file_size, header.file_size
    )
}

pub fn size_warning(warning: &SizeWarning) -> String {
    match warning {
        SizeWarning::Truncated { expected, actual } => format!(
            "invalid file_size (expected {}, got {} bytes)",
            expected, actual
        ),
        SizeWarning::TrailingBytes { expected, actual } => format!(
            "invalid file_size ({} extra bytes at end of file)",
            actual - expected
        ),
    }
}

fn addresses(out: &mut impl Write, values: impl Iterator<Item = u32>) -> fmt::Result {
    out.write_str("    at")?;
    for (i, value) in values.enumerate() {
        if i != 0 && i % ADDRESSES_PER_LINE == 0 {
            out.write_str("\n      ")?;
        }
        write!(out, " {:8X}h", value)?;
    }
    out.write_char('\n')
}

fn allocation_kind(tag: RecordTag) -> &'static str {
    match tag {
        RecordTag::CodeHeap => "code heap",
        RecordTag::ZeroedCodeHeap => "zeroed code heap",
        RecordTag::DataHeap => "data heap",
        _ => "zeroed data heap",
    }
}

pub fn item(out: &mut impl Write, item: &DecodedItem<'_>) -> fmt::Result {
    match item {
        DecodedItem::Import(group) => {
            writeln!(out, "  entry {} \"{}\"", group.tag(), group.symbol())?;
            addresses(out, group.sites())
        }
        DecodedItem::UnresolvedUses(uses) => {
            let tag = uses.first().map_or(RecordTag::End, |r| r.tag);
            writeln!(out, "  entry {} \"\"", tag)?;
            addresses(out, uses.iter().map(|r| r.value))?;
            writeln!(out, "    (no symbol before next entry)")
        }
        DecodedItem::AbsoluteBlock(block) => {
            writeln!(out, "  entry {} \"\"", RecordTag::AbsAddr)?;
            addresses(out, block.addresses.iter().copied())
        }
        DecodedItem::Record(record) => {
            writeln!(out, "  entry {} \"{}\"", record.tag, record.symbol)?;
            match record.tag.family() {
                TagFamily::Export => {
                    writeln!(out, "    export {:<40} @ {:8X}h", record.symbol, record.value)
                }
                TagFamily::Allocation => writeln!(
                    out,
                    "    {} allocation of {:X}h byte(s)",
                    allocation_kind(record.tag),
                    record.value
                ),
                TagFamily::Main => writeln!(out, "    main function @ {:8X}h", record.value),
                _ => writeln!(out, "    UNHANDLED"),
            }
        }
    }
}

pub fn patch_table(out: &mut impl Write, items: &[DecodedItem<'_>]) -> fmt::Result {
    writeln!(out, "Patch table:")?;
    for entry in items {
        item(out, entry)?;
    }
    Ok(())
}

pub fn summary(out: &mut impl Write, summary: &Summary) -> fmt::Result {
    let imports = summary.imported_symbols();
    writeln!(out, "Imports ({}):", imports.len())?;
    for name in &imports {
        let sites = summary
            .relocations
            .iter()
            .filter(|r| r.symbol.as_deref() == Some(*name))
            .count();
        writeln!(out, "  - {} ({} site(s))", name, sites)?;
    }

    writeln!(out, "\nExports ({}):", summary.exports.len())?;
    for export in &summary.exports {
        writeln!(out, "  - {:<40} @ {:8X}h", export.name, export.offset)?;
    }

    let absolute = summary
        .relocations
        .iter()
        .filter(|r| r.symbol.is_none())
        .count();
    writeln!(
        out,
        "\nRelocations: {} ({} without symbol)",
        summary.relocations.len(),
        absolute
    )?;

    if !summary.allocations.is_empty() {
        writeln!(out, "\nAllocations ({}):", summary.allocations.len())?;
        for alloc in &summary.allocations {
            writeln!(out, "  - {} {:X}h byte(s)", allocation_kind(alloc.tag), alloc.size)?;
        }
    }

    if let Some(entry) = summary.entry_point {
        writeln!(out, "\nEntry point: {:X}h", entry)?;
    }

    if summary.unknown > 0 {
        writeln!(out, "\nUnknown entries: {}", summary.unknown)?;
    }

    Ok(())
}
