//! Provider entry point: one LaunchBox installation into a catalog.

use std::path::{Path, PathBuf};

use retro_shelf_core::SearchContext;
use serde::Serialize;

use crate::MSG_PREFIX;
use crate::assets;
use crate::error::ProviderError;
use crate::gamelist::{self, IngestStats, PlatformScope};
use crate::launch::LaunchFallback;
use crate::paths;
use crate::registry;

/// Options for a provider run.
#[derive(Debug, Clone, Default)]
pub struct ProviderOptions {
    /// Installation root. When unset, `~/LaunchBox/` is used if it exists.
    pub installdir: Option<PathBuf>,
    pub launch_fallback: LaunchFallback,
}

/// Summary of a provider run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProviderStats {
    /// Platforms whose game list was processed
    pub platforms: usize,
    pub games_added: usize,
    pub games_merged: usize,
    pub additional_apps: usize,
    pub assets_found: usize,
    pub entries_skipped: usize,
}

impl ProviderStats {
    fn add_ingest(&mut self, ingest: &IngestStats) {
        self.games_added += ingest.games_added;
        self.games_merged += ingest.games_merged;
        self.additional_apps += ingest.additional_apps;
        self.entries_skipped += ingest.entries_skipped;
    }
}

/// Reads a LaunchBox installation into a [`SearchContext`].
#[derive(Debug, Clone, Default)]
pub struct LaunchboxProvider {
    options: ProviderOptions,
}

impl LaunchboxProvider {
    pub fn new(options: ProviderOptions) -> Self {
        Self { options }
    }

    pub fn name(&self) -> &'static str {
        "LaunchBox"
    }

    /// The installation this provider would read, or `None` if there is none.
    ///
    /// Fails only when an explicitly configured directory does not exist.
    pub fn install_dir(&self) -> Result<Option<PathBuf>, ProviderError> {
        match &self.options.installdir {
            Some(dir) => paths::clean_install_dir(dir).map(Some),
            None => Ok(find_installation()),
        }
    }

    /// Read the installation into `sctx`.
    ///
    /// Problems with single documents or entries are logged and skipped; the
    /// only error is a configured installation directory that does not exist.
    pub fn run(&self, sctx: &mut SearchContext) -> Result<ProviderStats, ProviderError> {
        let Some(root) = self.install_dir()? else {
            log::info!("{MSG_PREFIX} no installation found");
            return Ok(ProviderStats::default());
        };
        Ok(self.run_at(&root, sctx))
    }

    fn run_at(&self, root: &Path, sctx: &mut SearchContext) -> ProviderStats {
        let mut stats = ProviderStats::default();

        let registry = registry::read_registry(root);
        if registry.emulators.is_empty() {
            log::warn!("{MSG_PREFIX} no emulator settings found");
            return stats;
        }
        if registry.platforms.is_empty() {
            log::warn!("{MSG_PREFIX} no platforms found");
            return stats;
        }

        for platform in &registry.platforms {
            let scope = PlatformScope {
                root,
                platform,
                emulators: &registry.emulators,
                fallback: self.options.launch_fallback,
            };
            let mut ingest = IngestStats::default();
            match gamelist::process_platform_xml(&scope, sctx, &mut ingest) {
                Ok(()) => stats.platforms += 1,
                Err(e) => log::warn!("{MSG_PREFIX} {e}"),
            }
            stats.add_ingest(&ingest);

            stats.assets_found += assets::find_assets(root, &platform.name, sctx);
        }

        log::info!(
            "{MSG_PREFIX} {} games, {} assets found",
            stats.games_added,
            stats.assets_found
        );
        stats
    }
}

/// `~/LaunchBox/`, if it exists.
pub fn find_installation() -> Option<PathBuf> {
    let dir = paths::default_install_dir()?;
    log::info!("{MSG_PREFIX} found directory: `{}`", dir.display());
    Some(dir)
}
