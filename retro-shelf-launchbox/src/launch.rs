//! Launch command construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::registry::Emulator;

/// Placeholder the launcher replaces with the path of the file being run.
pub const FILE_PATH_PLACEHOLDER: &str = "{file.path}";

/// What to put on the command line when neither the game nor its platform
/// declares one.
///
/// `EmulatorPath` reproduces what LaunchBox installations have historically
/// been imported with: the emulator's own executable path is passed as the
/// argument string. It is almost certainly not what anyone wants, but it is
/// the default until frontends stop depending on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LaunchFallback {
    #[default]
    EmulatorPath,
    /// Use the `<CommandLine>` of the emulator's own definition.
    EmulatorParams,
    /// No arguments besides the file.
    Empty,
}

impl LaunchFallback {
    pub const ALL: &[LaunchFallback] = &[Self::EmulatorPath, Self::EmulatorParams, Self::Empty];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmulatorPath => "emulator-path",
            Self::EmulatorParams => "emulator-params",
            Self::Empty => "empty",
        }
    }
}

impl fmt::Display for LaunchFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known [`LaunchFallback`].
#[derive(Debug, Clone)]
pub struct LaunchFallbackParseError(pub String);

impl fmt::Display for LaunchFallbackParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown launch fallback: '{}' (expected emulator-path, emulator-params or empty)",
            self.0
        )
    }
}

impl std::error::Error for LaunchFallbackParseError {}

impl FromStr for LaunchFallback {
    type Err = LaunchFallbackParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|fallback| fallback.as_str() == lower)
            .ok_or_else(|| LaunchFallbackParseError(s.to_string()))
    }
}

/// Pick the argument string for a game's launch command.
///
/// Priority: the game's own `<CommandLine>`, then the platform override, then
/// the fallback policy.
pub(crate) fn command_params(
    game_override: Option<&str>,
    platform_override: &str,
    fallback: LaunchFallback,
    default_emu: &Emulator,
    effective_emu: &Emulator,
) -> String {
    if let Some(params) = game_override {
        return params.to_string();
    }
    if !platform_override.is_empty() {
        return platform_override.to_string();
    }
    match fallback {
        LaunchFallback::EmulatorPath => default_emu.app_path.to_string_lossy().into_owned(),
        LaunchFallback::EmulatorParams => effective_emu.cmd_params.clone(),
        LaunchFallback::Empty => String::new(),
    }
}

/// Build `"<emulator>" <params> {file.path}` and the working directory.
///
/// Returns `None` when there is no emulator executable to run.
pub(crate) fn build_launch_command(emu_path: &Path, params: &str) -> Option<(String, PathBuf)> {
    if emu_path.as_os_str().is_empty() {
        return None;
    }
    let params = params.trim();
    let cmd = if params.is_empty() {
        format!("\"{}\" {FILE_PATH_PLACEHOLDER}", emu_path.display())
    } else {
        format!("\"{}\" {params} {FILE_PATH_PLACEHOLDER}", emu_path.display())
    };
    let workdir = emu_path.parent().map(Path::to_path_buf).unwrap_or_default();
    Some((cmd, workdir))
}
