//! Summary command

use anyhow::{Context, Result};
use bininfo::{DecodeOptions, Summary};
use std::path::Path;

use super::{open, read_input};
use crate::render;

pub fn show_summary(path: &Path, json: bool, options: &DecodeOptions) -> Result<()> {
    let data = read_input(path)?;
    let bin = open(&data)?;

    let items = bin
        .patch_table(options)
        .into_result()
        .context("Failed to decode patch table")?;
    let summary = Summary::from_items(&items);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        let mut out = String::new();
        render::summary(&mut out, &summary)?;
        print!("{}", out);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;

    #[test]
    fn test_summary_valid_module() {
        let file = fixtures::write(&fixtures::module(0));
        show_summary(file.path(), false, &DecodeOptions::default()).unwrap();
        show_summary(file.path(), true, &DecodeOptions::default()).unwrap();
    }

    #[test]
    fn test_summary_fails_on_corruption() {
        let file = fixtures::write(&fixtures::module(1));
        let err = show_summary(file.path(), false, &DecodeOptions::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to decode patch table"));
    }
}
