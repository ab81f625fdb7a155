/// Errors that can occur while reading a LaunchBox installation.
///
/// None of these abort a whole provider run: a failed document is logged and
/// the next platform is processed.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("could not open `{path}`: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("{0}")]
    InvalidDocument(String),

    #[error("LaunchBox installation not found at `{0}`")]
    InstallNotFound(String),
}

impl ProviderError {
    pub fn open(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Open {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }

    pub fn install_not_found(path: &std::path::Path) -> Self {
        Self::InstallNotFound(path.display().to_string())
    }
}
