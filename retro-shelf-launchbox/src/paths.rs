//! Path handling for LaunchBox installations.
//!
//! LaunchBox is a Windows program and stores paths relative to the
//! installation root with backslash separators (`Games\SNES\smw.sfc`).

use std::path::{Path, PathBuf};

use crate::error::ProviderError;

/// Name of the installation folder looked up in the home directory.
pub const DEFAULT_INSTALL_DIR_NAME: &str = "LaunchBox";

/// Resolve a path as written in a LaunchBox document against the installation root.
///
/// Absolute paths are kept as they are.
pub fn resolve(root: &Path, raw: &str) -> PathBuf {
    let raw = if cfg!(windows) {
        raw.to_string()
    } else {
        raw.replace('\\', "/")
    };
    root.join(raw)
}

/// Canonical form of an existing path, or `None` if it does not exist.
pub fn canonical(path: &Path) -> Option<PathBuf> {
    std::fs::canonicalize(path).ok()
}

/// Turn a user-supplied installation directory into an absolute, canonical root.
///
/// A leading `~` is expanded to the home directory.
pub fn clean_install_dir(raw: &Path) -> Result<PathBuf, ProviderError> {
    let expanded = match raw.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => raw.to_path_buf(),
        },
        Err(_) => raw.to_path_buf(),
    };
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()?.join(expanded)
    };
    match canonical(&absolute) {
        Some(dir) if dir.is_dir() => Ok(dir),
        _ => Err(ProviderError::install_not_found(&absolute)),
    }
}

/// `~/LaunchBox/`, if it exists.
pub fn default_install_dir() -> Option<PathBuf> {
    let dir = dirs::home_dir()?.join(DEFAULT_INSTALL_DIR_NAME);
    canonical(&dir).filter(|dir| dir.is_dir())
}
