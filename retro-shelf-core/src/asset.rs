use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Asset categories a game can have a file bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Front box art (2D)
    BoxFront,
    /// Back box art
    BoxBack,
    /// Marquee or banner
    ArcadeMarquee,
    /// Physical media image (cartridge/disc)
    Cartridge,
    /// In-game screenshot
    Screenshot,
    /// Advertisement flyer
    Poster,
    /// Arcade control panel
    ArcadePanel,
    /// Clear logo / wheel image
    Logo,
    /// Fan-created background artwork
    Background,
    /// Steam grid banner
    SteamGrid,
    /// Background music
    Music,
    /// Gameplay or promotional video
    Video,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BoxFront => "box_front",
            Self::BoxBack => "box_back",
            Self::ArcadeMarquee => "arcade_marquee",
            Self::Cartridge => "cartridge",
            Self::Screenshot => "screenshot",
            Self::Poster => "poster",
            Self::ArcadePanel => "arcade_panel",
            Self::Logo => "logo",
            Self::Background => "background",
            Self::SteamGrid => "steam_grid",
            Self::Music => "music",
            Self::Video => "video",
        }
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-game asset slots: at most one file per [`AssetKind`].
///
/// Slots are write-once. Providers scan their sources in priority order and
/// the first file offered for a slot is the one that sticks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AssetMap {
    files: BTreeMap<AssetKind, PathBuf>,
}

impl AssetMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `path` to the `kind` slot unless the slot is already filled.
    ///
    /// Returns `true` if the file was stored.
    pub fn add_file_maybe(&mut self, kind: AssetKind, path: impl Into<PathBuf>) -> bool {
        match self.files.entry(kind) {
            Entry::Vacant(slot) => {
                slot.insert(path.into());
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn get(&self, kind: AssetKind) -> Option<&Path> {
        self.files.get(&kind).map(PathBuf::as_path)
    }

    pub fn contains(&self, kind: AssetKind) -> bool {
        self.files.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Bound files in category order.
    pub fn iter(&self) -> impl Iterator<Item = (AssetKind, &Path)> {
        self.files.iter().map(|(kind, path)| (*kind, path.as_path()))
    }
}
