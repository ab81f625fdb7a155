//! Emulator and platform index (`Data/Emulators.xml`).

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::MSG_PREFIX;
use crate::error::ProviderError;
use crate::paths;
use crate::xml::ElementReader;

/// LaunchBox's own identifier for an emulator (usually a GUID).
pub type EmulatorId = String;

/// Index document, relative to the installation root.
pub const REGISTRY_FILE: &str = "Data/Emulators.xml";
/// Directory of per-platform game lists, relative to the installation root.
pub const PLATFORMS_DIR: &str = "Data/Platforms";

pub fn registry_path(root: &Path) -> PathBuf {
    root.join(REGISTRY_FILE)
}

pub fn platforms_dir(root: &Path) -> PathBuf {
    root.join(PLATFORMS_DIR)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Emulator {
    /// Canonical path of the executable
    pub app_path: PathBuf,
    /// Default command-line arguments
    pub cmd_params: String,
}

impl Emulator {
    pub fn incomplete(&self) -> bool {
        self.app_path.as_os_str().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Platform {
    pub default_emu_id: EmulatorId,
    pub name: String,
    /// Command-line override for every game of the platform; may be empty.
    pub cmd_params: String,
    /// Canonical path of the platform's game list
    pub xml_path: PathBuf,
}

impl Platform {
    pub fn incomplete(&self) -> bool {
        self.default_emu_id.is_empty() || self.name.is_empty() || self.xml_path.as_os_str().is_empty()
    }
}

/// Validated emulators and platforms of one installation.
///
/// Every platform's default emulator exists in `emulators`.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    pub emulators: HashMap<EmulatorId, Emulator>,
    /// Platforms in document order
    pub platforms: Vec<Platform>,
}

impl Registry {
    pub fn emulator(&self, id: &str) -> Option<&Emulator> {
        self.emulators.get(id)
    }

    pub fn platform(&self, name: &str) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.name == name)
    }

    /// Remove platforms whose default emulator is not defined.
    fn drop_orphan_platforms(&mut self) {
        let emulators = &self.emulators;
        self.platforms.retain(|platform| {
            let known = emulators.contains_key(&platform.default_emu_id);
            if !known {
                log::warn!(
                    "{MSG_PREFIX} emulator platform `{}` refers to a missing emulator id, entry ignored",
                    platform.name
                );
            }
            known
        });
    }
}

/// Read the registry of the installation at `root`.
///
/// A missing or unreadable index is logged and yields an empty registry.
pub fn read_registry(root: &Path) -> Registry {
    let path = registry_path(root);
    match File::open(&path) {
        Ok(file) => parse_registry(BufReader::new(file), root, &path),
        Err(e) => {
            log::warn!("{MSG_PREFIX} {}", ProviderError::open(&path, e));
            Registry::default()
        }
    }
}

/// Parse an index document. Paths inside it are resolved against `root`.
///
/// Document errors are logged; the entries read before the error are kept.
pub fn parse_registry<R: BufRead>(reader: R, root: &Path, source: &Path) -> Registry {
    let mut registry = Registry::default();
    if let Err(e) = read_entries(reader, root, source, &mut registry) {
        log::warn!("{MSG_PREFIX} {e}");
    }
    registry.drop_orphan_platforms();
    registry
}

fn read_entries<R: BufRead>(
    reader: R,
    root: &Path,
    source: &Path,
    registry: &mut Registry,
) -> Result<(), ProviderError> {
    let mut xml = ElementReader::new(reader, source);
    xml.expect_root("LaunchBox")?;

    let platforms_dir = platforms_dir(root);
    while let Some(name) = xml.next_start()? {
        match name.as_str() {
            "EmulatorPlatform" => {
                let platform = read_platform(&mut xml, &platforms_dir)?;
                if platform.incomplete() {
                    log::debug!("{MSG_PREFIX} incomplete emulator platform `{}` ignored", platform.name);
                } else {
                    registry.platforms.push(platform);
                }
            }
            "Emulator" => {
                let (id, emulator) = read_emulator(&mut xml, root)?;
                if id.is_empty() || emulator.incomplete() {
                    continue;
                }
                match registry.emulators.entry(id) {
                    Entry::Vacant(slot) => {
                        slot.insert(emulator);
                    }
                    Entry::Occupied(existing) => {
                        log::debug!("{MSG_PREFIX} duplicate emulator id `{}` ignored", existing.key());
                    }
                }
            }
            _ => xml.skip()?,
        }
    }
    Ok(())
}

fn read_platform<R: BufRead>(
    xml: &mut ElementReader<R>,
    platforms_dir: &Path,
) -> Result<Platform, ProviderError> {
    let mut platform = Platform::default();
    while let Some(field) = xml.next_start()? {
        match field.as_str() {
            "Emulator" => platform.default_emu_id = xml.read_text()?,
            "Platform" => platform.name = xml.read_text()?,
            "CommandLine" => platform.cmd_params = xml.read_text()?,
            _ => xml.skip()?,
        }
    }
    if !platform.name.is_empty() {
        let list = platforms_dir.join(format!("{}.xml", platform.name));
        platform.xml_path = paths::canonical(&list).unwrap_or_default();
    }
    Ok(platform)
}

fn read_emulator<R: BufRead>(
    xml: &mut ElementReader<R>,
    root: &Path,
) -> Result<(EmulatorId, Emulator), ProviderError> {
    let mut id = EmulatorId::new();
    let mut emulator = Emulator::default();
    while let Some(field) = xml.next_start()? {
        match field.as_str() {
            "ID" => id = xml.read_text()?,
            "ApplicationPath" => {
                let raw = xml.read_text()?;
                let resolved = paths::resolve(root, &raw);
                match paths::canonical(&resolved) {
                    Some(path) => emulator.app_path = path,
                    None => {
                        emulator.app_path = PathBuf::new();
                        log::warn!(
                            "{MSG_PREFIX} emulator `{}` doesn't seem to exist, entry ignored",
                            resolved.display()
                        );
                    }
                }
            }
            "CommandLine" => emulator.cmd_params = xml.read_text()?,
            _ => xml.skip()?,
        }
    }
    Ok((id, emulator))
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
