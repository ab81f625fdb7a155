use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use retro_shelf_core::SearchContext;
use retro_shelf_launchbox::{LaunchboxProvider, ProviderStats};

use crate::cli_types::ImportArgs;
use crate::error::CliError;
use crate::settings::{load_settings, resolve_options};

/// Run the LaunchBox provider against a fresh catalog and report the result.
pub(crate) fn run_import(args: ImportArgs) -> Result<(), CliError> {
    let settings = load_settings()?;
    let resolved = resolve_options(args.installdir, args.launch_fallback, &settings);
    let provider = LaunchboxProvider::new(resolved.options);

    let mut sctx = SearchContext::new();
    let stats = provider.run(&mut sctx)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&sctx)?);
        return Ok(());
    }
    print_summary(provider.name(), &stats, &sctx);
    Ok(())
}

fn print_summary(name: &str, stats: &ProviderStats, sctx: &SearchContext) {
    log::info!(
        "{} {}",
        name.if_supports_color(Stdout, |t| t.bold()),
        "import".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("");

    for collection in sctx.collections() {
        log::info!(
            "  {} {}",
            collection.name.if_supports_color(Stdout, |t| t.cyan()),
            format!("({} games)", collection.len()).if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    if sctx.collection_count() > 0 {
        log::info!("");
    }

    log::info!("  Platforms:        {}", stats.platforms);
    log::info!(
        "  Games:            {}",
        stats.games_added.if_supports_color(Stdout, |t| t.green())
    );
    log::info!("  Merged entries:   {}", stats.games_merged);
    log::info!("  Extra launchers:  {}", stats.additional_apps);
    log::info!("  Media files:      {}", stats.assets_found);
    if stats.entries_skipped > 0 {
        log::info!(
            "  Skipped entries:  {}",
            stats.entries_skipped.if_supports_color(Stdout, |t| t.yellow())
        );
    }
}
