//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use retro_shelf_launchbox::LaunchFallback;

#[derive(Parser)]
#[command(name = "retro-shelf")]
#[command(about = "Import LaunchBox game libraries into a frontend catalog", long_about = None)]
pub(crate) struct Cli {
    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub(crate) struct ImportArgs {
    /// LaunchBox installation directory (defaults to settings, then ~/LaunchBox)
    #[arg(short, long)]
    pub installdir: Option<PathBuf>,

    /// Print the resulting catalog as JSON
    #[arg(long)]
    pub json: bool,

    /// Arguments used when neither a game nor its platform sets a command line
    /// (emulator-path, emulator-params, empty)
    #[arg(long)]
    pub launch_fallback: Option<LaunchFallback>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Read a LaunchBox installation and report what was found
    Import(ImportArgs),

    /// Manage the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Print the settings file path
    Path,

    /// Show the effective settings and where they come from
    Show,
}
