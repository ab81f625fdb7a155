//! Media lookup in the `Images`, `Music` and `Videos` folders.
//!
//! LaunchBox names media files after the game title. Images and music use a
//! filesystem-safe rendering of the title; images also carry a `-NN` counter
//! (`Metroid_ Zero Mission-01.png`). Videos use the plain title, sometimes
//! with a region tag (`Chrono Trigger (USA).mp4`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use retro_shelf_core::{AssetKind, GameId, SearchContext};
use walkdir::WalkDir;

use crate::MSG_PREFIX;

/// Image folders and the slot they fill, highest priority first.
///
/// Several folders feed the same slot; since slots are write-once, the
/// earlier folder wins.
pub const ASSET_DIRS: &[(&str, AssetKind)] = &[
    ("Box - Front", AssetKind::BoxFront),
    ("Box - Front - Reconstructed", AssetKind::BoxFront),
    ("Fanart - Box - Front", AssetKind::BoxFront),
    ("Box - Back", AssetKind::BoxBack),
    ("Box - Back - Reconstructed", AssetKind::BoxBack),
    ("Fanart - Box - Back", AssetKind::BoxBack),
    ("Arcade - Marquee", AssetKind::ArcadeMarquee),
    ("Banner", AssetKind::ArcadeMarquee),
    ("Cart - Front", AssetKind::Cartridge),
    ("Disc", AssetKind::Cartridge),
    ("Fanart - Cart - Front", AssetKind::Cartridge),
    ("Fanart - Disc", AssetKind::Cartridge),
    ("Screenshot - Gameplay", AssetKind::Screenshot),
    ("Screenshot - Game Select", AssetKind::Screenshot),
    ("Screenshot - Game Title", AssetKind::Screenshot),
    ("Screenshot - Game Over", AssetKind::Screenshot),
    ("Screenshot - High Scores", AssetKind::Screenshot),
    ("Advertisement Flyer - Front", AssetKind::Poster),
    ("Arcade - Control Panel", AssetKind::ArcadePanel),
    ("Clear Logo", AssetKind::Logo),
    ("Fanart - Background", AssetKind::Background),
    ("Steam Banner", AssetKind::SteamGrid),
];

/// Characters LaunchBox replaces with `_` in media file names.
const UNSAFE_TITLE_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*', '\''];

/// Render a title the way LaunchBox names its media files.
pub fn escape_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if UNSAFE_TITLE_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// File name up to (not including) the last `.`.
pub fn complete_base_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    let base = match name.rsplit_once('.') {
        Some((base, _ext)) => base,
        None => &name,
    };
    Some(base.to_string())
}

/// Strip a trailing `-NN` counter from an image base name.
pub fn strip_number_suffix(base: &str) -> &str {
    match base.rsplit_once('-') {
        Some((title, counter))
            if !counter.is_empty() && counter.bytes().all(|b| b.is_ascii_digit()) =>
        {
            title
        }
        _ => base,
    }
}

/// Titles a video file may belong to, in the order they should be tried.
///
/// The first drops a trailing `(...)` tag. The second, present only when it
/// differs, turns `A - B` into `A: B` and `Zelda, The` into `The Zelda`.
pub fn video_title_candidates(base: &str) -> Vec<String> {
    let mut title = base;
    if let Some(inner) = base.strip_suffix(')') {
        if let Some(open) = inner.rfind('(') {
            if open > 0 {
                title = &base[..open];
            }
        }
    }
    let title = title.trim().to_string();

    let mut rewritten = title.replace(" - ", ": ");
    if let Some(head) = rewritten.strip_suffix(", The") {
        rewritten = format!("The {head}");
    }

    let mut candidates = vec![title];
    if rewritten != candidates[0] {
        candidates.push(rewritten);
    }
    candidates
}

/// Title lookup over the members of one collection.
///
/// When two members share a title, the one listed first owns it.
#[derive(Debug, Default)]
pub struct TitleIndex {
    titles: HashMap<String, GameId>,
}

impl TitleIndex {
    /// Index by the escaped title, for image and music files.
    pub fn escaped(sctx: &SearchContext, members: &[GameId]) -> Self {
        Self::build(sctx, members, escape_title)
    }

    /// Index by the stored title, for video files.
    pub fn plain(sctx: &SearchContext, members: &[GameId]) -> Self {
        Self::build(sctx, members, str::to_string)
    }

    fn build(sctx: &SearchContext, members: &[GameId], key: impl Fn(&str) -> String) -> Self {
        let mut titles = HashMap::new();
        for &id in members {
            if let Some(game) = sctx.game(id) {
                titles.entry(key(&game.title)).or_insert(id);
            }
        }
        Self { titles }
    }

    pub fn get(&self, title: &str) -> Option<GameId> {
        self.titles.get(title).copied()
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

/// Bind media files of one platform to the games of its collection.
///
/// Returns the number of files bound.
pub fn find_assets(root: &Path, platform_name: &str, sctx: &mut SearchContext) -> usize {
    let members = sctx.collection_children(platform_name).to_vec();
    if members.is_empty() {
        return 0;
    }

    let escaped = TitleIndex::escaped(sctx, &members);
    let images_root = root.join("Images").join(platform_name);
    let mut found = 0;
    for &(dir, kind) in ASSET_DIRS {
        found += find_assets_in(&images_root.join(dir), kind, true, &escaped, sctx);
    }
    let music_root = root.join("Music").join(platform_name);
    found += find_assets_in(&music_root, AssetKind::Music, false, &escaped, sctx);

    let plain = TitleIndex::plain(sctx, &members);
    let video_root = root.join("Videos").join(platform_name);
    found += find_videos_in(&video_root, &plain, sctx);

    log::debug!("{MSG_PREFIX} {found} media files bound for `{platform_name}`");
    found
}

/// Files under `dir`, recursively, in sorted order. A missing directory yields nothing.
fn files_in(dir: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(walkdir::DirEntry::into_path)
}

fn find_assets_in(
    dir: &Path,
    kind: AssetKind,
    has_num_suffix: bool,
    index: &TitleIndex,
    sctx: &mut SearchContext,
) -> usize {
    let mut found = 0;
    for path in files_in(dir) {
        let Some(base) = complete_base_name(&path) else {
            continue;
        };
        let title = if has_num_suffix {
            strip_number_suffix(&base)
        } else {
            base.as_str()
        };
        let Some(id) = index.get(title) else {
            continue;
        };
        if sctx.set_asset_maybe(id, kind, path) {
            found += 1;
        }
    }
    found
}

fn find_videos_in(dir: &Path, index: &TitleIndex, sctx: &mut SearchContext) -> usize {
    let mut found = 0;
    for path in files_in(dir) {
        let Some(base) = complete_base_name(&path) else {
            continue;
        };
        let matched = video_title_candidates(&base)
            .iter()
            .find_map(|title| index.get(title));
        if let Some(id) = matched {
            if sctx.set_asset_maybe(id, AssetKind::Video, path) {
                found += 1;
            }
        }
    }
    found
}
