//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting decoder defaults.

use crate::config::Config;
use anyhow::Result;

/// Handle the configure command
pub fn handle(
    max_records: Option<usize>,
    named_address_blocks: Option<bool>,
    show: bool,
) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        show_config(&config);
        return Ok(());
    }

    if max_records.is_none() && named_address_blocks.is_none() {
        show_usage();
        return Ok(());
    }

    apply(&mut config, max_records, named_address_blocks);
    config.save()?;

    println!("Configuration updated");
    show_config(&config);

    Ok(())
}

fn apply(config: &mut Config, max_records: Option<usize>, named_address_blocks: Option<bool>) {
    if let Some(max) = max_records {
        config.decode.max_records = max;
    }
    if let Some(named) = named_address_blocks {
        config.decode.named_address_blocks = named;
    }
}

/// Display current configuration
fn show_config(config: &Config) {
    println!("Max records: {}", config.decode.max_records);
    println!("Named address blocks: {}", config.decode.named_address_blocks);

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}

fn show_usage() {
    println!("Usage: bininfo configure --max-records N");
    println!("   or: bininfo configure --named-address-blocks true|false");
    println!("   or: bininfo configure --show");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply() {
        let mut config = Config::default();
        apply(&mut config, Some(12), None);
        assert_eq!(config.decode.max_records, 12);
        assert!(!config.decode.named_address_blocks);

        apply(&mut config, None, Some(true));
        assert_eq!(config.decode.max_records, 12);
        assert!(config.decode.named_address_blocks);
    }
}
