//! Settings file (`~/.config/retro-shelf/settings.toml`).
//!
//! ```toml
//! [launchbox]
//! installdir = "/home/me/LaunchBox"
//! launch_fallback = "emulator-params"
//! ```
//!
//! Command-line flags take priority over the file; anything unset in both is
//! left to the provider's own discovery.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use retro_shelf_launchbox::{LaunchFallback, ProviderOptions};

use crate::error::CliError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub launchbox: LaunchboxSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub(crate) struct LaunchboxSettings {
    pub installdir: Option<PathBuf>,
    pub launch_fallback: Option<LaunchFallback>,
}

/// Path to the settings file: `~/.config/retro-shelf/settings.toml`.
pub(crate) fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("retro-shelf").join("settings.toml")
}

/// Load the settings file; a missing file yields the defaults.
pub(crate) fn load_settings() -> Result<Settings, CliError> {
    load_settings_from(&settings_path())
}

pub(crate) fn load_settings_from(path: &Path) -> Result<Settings, CliError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Settings::default()),
        Err(e) => return Err(e.into()),
    };
    toml::from_str(&contents)
        .map_err(|e| CliError::config(format!("invalid {}: {e}", path.display())))
}

/// Where an effective setting came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Source {
    Flag,
    SettingsFile,
    Default,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flag => write!(f, "command line"),
            Self::SettingsFile => write!(f, "settings file"),
            Self::Default => write!(f, "default"),
        }
    }
}

fn pick<T>(flag: Option<T>, file: Option<T>) -> (Option<T>, Source) {
    match (flag, file) {
        (Some(v), _) => (Some(v), Source::Flag),
        (None, Some(v)) => (Some(v), Source::SettingsFile),
        (None, None) => (None, Source::Default),
    }
}

/// Effective provider options and the source of each value.
pub(crate) struct ResolvedOptions {
    pub options: ProviderOptions,
    pub installdir_source: Source,
    pub fallback_source: Source,
}

/// Merge command-line flags over the settings file.
pub(crate) fn resolve_options(
    installdir: Option<PathBuf>,
    launch_fallback: Option<LaunchFallback>,
    settings: &Settings,
) -> ResolvedOptions {
    let (installdir, installdir_source) = pick(installdir, settings.launchbox.installdir.clone());
    let (fallback, fallback_source) = pick(launch_fallback, settings.launchbox.launch_fallback);
    ResolvedOptions {
        options: ProviderOptions {
            installdir,
            launch_fallback: fallback.unwrap_or_default(),
        },
        installdir_source,
        fallback_source,
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
