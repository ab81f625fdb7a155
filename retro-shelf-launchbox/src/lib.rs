//! LaunchBox metadata provider.
//!
//! Reads a LaunchBox installation (the emulator registry, one game list per
//! platform, and the per-platform media folders) into a shared
//! [`SearchContext`](retro_shelf_core::SearchContext).
//!
//! Expected layout under the installation root:
//! ```text
//! Data/Emulators.xml
//! Data/Platforms/<platform>.xml
//! Images/<platform>/<category>/...
//! Music/<platform>/...
//! Videos/<platform>/...
//! ```

pub mod assets;
pub mod error;
pub mod gamelist;
pub mod launch;
pub mod paths;
pub mod provider;
pub mod registry;
mod xml;

pub use assets::{ASSET_DIRS, TitleIndex, find_assets};
pub use error::ProviderError;
pub use gamelist::{IngestStats, PlatformScope, ingest_document, process_platform_xml};
pub use launch::{FILE_PATH_PLACEHOLDER, LaunchFallback};
pub use provider::{LaunchboxProvider, ProviderOptions, ProviderStats, find_installation};
pub use registry::{Emulator, EmulatorId, Platform, Registry, parse_registry, read_registry};

/// Prefix for every log line this provider emits.
pub(crate) const MSG_PREFIX: &str = "LaunchBox:";
