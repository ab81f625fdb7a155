use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use retro_shelf_launchbox::LaunchboxProvider;

use crate::error::CliError;
use crate::settings::{Source, load_settings, resolve_options, settings_path};

/// Print the settings file path.
pub(crate) fn run_config_path() {
    println!("{}", settings_path().display());
}

/// Show the effective settings and where each value comes from.
pub(crate) fn run_config_show() -> Result<(), CliError> {
    let path = settings_path();
    let settings = load_settings()?;
    let resolved = resolve_options(None, None, &settings);

    log::info!(
        "{}",
        "retro-shelf Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("");

    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    log::info!("");

    let fallback = resolved.options.launch_fallback;
    let provider = LaunchboxProvider::new(resolved.options);
    let installdir = match provider.install_dir() {
        Ok(Some(dir)) => dir.display().to_string(),
        Ok(None) => "not found".to_string(),
        Err(e) => e.to_string(),
    };
    let installdir_source = match resolved.installdir_source {
        Source::Default => "auto-detected".to_string(),
        source => source.to_string(),
    };

    log::info!("  [launchbox]");
    log::info!(
        "    installdir:      {} {}",
        installdir.if_supports_color(Stdout, |t| t.bold()),
        format!("({installdir_source})").if_supports_color(Stdout, |t| t.dimmed()),
    );
    log::info!(
        "    launch_fallback: {} {}",
        fallback.if_supports_color(Stdout, |t| t.bold()),
        format!("({})", resolved.fallback_source).if_supports_color(Stdout, |t| t.dimmed()),
    );
    Ok(())
}
