use thiserror::Error;

use retro_shelf_launchbox::ProviderError;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// The LaunchBox provider could not run
    #[error("{0}")]
    Provider(#[from] ProviderError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// JSON output failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
