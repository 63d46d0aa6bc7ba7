//! Header command

use anyhow::Result;
use std::path::Path;

use super::{open, read_input};
use crate::render;

pub fn show_header(path: &Path, json: bool) -> Result<()> {
    let data = read_input(path)?;
    let bin = open(&data)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&bin.header)?);
        return Ok(());
    }

    let mut out = String::new();
    render::header(&mut out, &bin.header)?;
    print!("{}", out);

    Ok(())
}
