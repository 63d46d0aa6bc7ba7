//! Show command: header plus decoded patch table

use anyhow::{bail, Result};
use bininfo::{DecodeOptions, DecodedItem, Header, SizeWarning};
use serde::Serialize;
use std::path::Path;

use super::{open, read_input};
use crate::render;

#[derive(Serialize)]
struct ShowOutput<'a> {
    path: String,
    header: &'a Header,
    alignment: u64,
    size_warning: Option<SizeWarning>,
    items: &'a [DecodedItem<'a>],
    error: Option<String>,
    error_offset: Option<usize>,
}

pub fn show_file(path: &Path, json: bool, options: &DecodeOptions) -> Result<()> {
    let data = read_input(path)?;
    let bin = open(&data)?;
    let table = bin.patch_table(options);

    if json {
        let output = ShowOutput {
            path: path.to_string_lossy().to_string(),
            header: &bin.header,
            alignment: bin.header.alignment(),
            size_warning: bin.size_warning(),
            items: &table.items,
            error: table.error.as_ref().map(|e| e.to_string()),
            error_offset: table.error.as_ref().and_then(|e| e.offset()),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let mut out = String::new();
        render::header(&mut out, &bin.header)?;
        out.push('\n');
        render::patch_table(&mut out, &table.items)?;

        println!("bininfo {}\n", path.display());
        print!("{}", out);
    }

    if let Some(err) = table.error {
        match err.offset() {
            Some(offset) => bail!("corruption at offset 0x{:x}: {}", offset, err),
            None => bail!(err),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;

    #[test]
    fn test_show_valid_module() {
        let file = fixtures::write(&fixtures::module(0));
        show_file(file.path(), false, &DecodeOptions::default()).unwrap();
        show_file(file.path(), true, &DecodeOptions::default()).unwrap();
    }

    #[test]
    fn test_show_reports_corruption_offset() {
        // Drop the terminator and the main record's trailing name byte
        let data = fixtures::module(2);
        let file = fixtures::write(&data);

        let err = show_file(file.path(), false, &DecodeOptions::default()).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("corruption at offset 0x"), "{}", message);
        assert!(message.contains("Truncated record"));
    }
}
