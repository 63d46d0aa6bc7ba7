mod cli;
mod commands;
mod config;
mod render;

use anyhow::Result;
use clap::Parser;
use config::Config;

use cli::*;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Configure {
            max_records,
            named_address_blocks,
            show,
        } => {
            commands::configure::handle(max_records, named_address_blocks, show)?;
        }

        Commands::Header { input, json } => {
            commands::header::show_header(&input, json)?;
        }

        Commands::Show { input, json } => {
            let options = Config::load()?.decode_options(&cli.decode);
            log::debug!("decode options: {:?}", options);
            commands::show::show_file(&input, json, &options)?;
        }

        Commands::Summary { input, json } => {
            let options = Config::load()?.decode_options(&cli.decode);
            commands::summary::show_summary(&input, json, &options)?;
        }
    }

    Ok(())
}
