//! retro-shelf CLI
//!
//! Command-line interface for importing LaunchBox game libraries.

mod cli_types;
mod commands;
mod error;
mod settings;

use std::io::Write;

use clap::Parser;

use cli_types::{Cli, Commands, ConfigAction};
use commands::config::{run_config_path, run_config_show};
use commands::import::run_import;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let result = match cli.command {
        Commands::Import(args) => run_import(args),
        Commands::Config { action } => match action {
            ConfigAction::Path => {
                run_config_path();
                Ok(())
            }
            ConfigAction::Show => run_config_show(),
        },
    };

    if let Err(e) = result {
        log::error!("{e}");
        std::process::exit(1);
    }
}

/// Install the logger. Normal output goes through `log::info!` to stdout.
///
/// `--quiet` keeps warnings and errors only; `--verbose` adds debug messages
/// with timestamps and levels. `RUST_LOG` overrides both.
fn init_logging(quiet: bool, verbose: bool) {
    let level = if quiet {
        log::LevelFilter::Warn
    } else if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level)
        .target(env_logger::Target::Stdout)
        .parse_default_env();
    if verbose {
        builder.format_timestamp_millis().format_target(false);
    } else {
        builder.format(|buf, record| match record.level() {
            log::Level::Info => writeln!(buf, "{}", record.args()),
            level => writeln!(buf, "{}: {}", level.as_str().to_lowercase(), record.args()),
        });
    }
    builder.init();
}
