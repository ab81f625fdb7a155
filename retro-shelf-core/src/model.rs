//! Game and launch-file records shared by every metadata provider.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

use crate::asset::AssetMap;

/// Ratings below this are treated as "not rated".
pub const RATING_EPSILON: f32 = 0.0001;

/// Run-scoped game identifier.
///
/// Ids are sequence numbers handed out by the [`SearchContext`](crate::SearchContext)
/// in creation order. They are not stable across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct GameId(pub usize);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A launchable file belonging to a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameFile {
    /// Canonical path of the file
    pub path: PathBuf,
    /// Display name (e.g. "Disc 2" or "Configure")
    pub name: Option<String>,
}

impl GameFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A game in the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct Game {
    pub title: String,
    pub description: String,
    pub developers: Vec<String>,
    pub publishers: Vec<String>,
    pub genres: Vec<String>,
    pub release_date: Option<NaiveDate>,
    /// Rating from 0.0 to 1.0
    pub rating: f32,
    /// Command template; the launcher substitutes the file path placeholder.
    pub launch_cmd: String,
    pub launch_workdir: Option<PathBuf>,
    /// Launch targets. The first one is the primary file.
    pub files: Vec<GameFile>,
    pub assets: AssetMap,
}

impl Game {
    /// Create a game around its primary file. The title defaults to the file stem.
    pub fn new(primary: GameFile) -> Self {
        let title = primary
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            title,
            description: String::new(),
            developers: Vec::new(),
            publishers: Vec::new(),
            genres: Vec::new(),
            release_date: None,
            rating: 0.0,
            launch_cmd: String::new(),
            launch_workdir: None,
            files: vec![primary],
            assets: AssetMap::new(),
        }
    }

    pub fn primary_file(&self) -> Option<&GameFile> {
        self.files.first()
    }

    pub fn has_file(&self, path: &Path) -> bool {
        self.files.iter().any(|f| f.path == path)
    }

    pub fn find_file_mut(&mut self, path: &Path) -> Option<&mut GameFile> {
        self.files.iter_mut().find(|f| f.path == path)
    }

    pub fn is_rated(&self) -> bool {
        self.rating >= RATING_EPSILON
    }
}

/// Append `value` unless the list already holds it, keeping first-seen order.
///
/// Returns `true` if the value was appended.
pub fn push_unique(list: &mut Vec<String>, value: impl Into<String>) -> bool {
    let value = value.into();
    if list.contains(&value) {
        return false;
    }
    list.push(value);
    true
}
