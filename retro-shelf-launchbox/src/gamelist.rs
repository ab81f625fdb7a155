//! Per-platform game lists (`Data/Platforms/<platform>.xml`).
//!
//! A game list holds `<Game>` records and `<AdditionalApplication>` records.
//! Games are stored as they are read. Additional applications may point at
//! games declared further down, so they are collected and attached once the
//! whole document has been walked.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use retro_shelf_core::{Game, GameFile, GameId, RATING_EPSILON, SearchContext, push_unique};

use crate::MSG_PREFIX;
use crate::error::ProviderError;
use crate::launch::{self, LaunchFallback};
use crate::paths;
use crate::registry::{Emulator, EmulatorId, Platform};
use crate::xml::ElementReader;

/// Everything a game list is interpreted against.
#[derive(Debug, Clone, Copy)]
pub struct PlatformScope<'a> {
    /// Installation root; relative paths in the document resolve against it.
    pub root: &'a Path,
    pub platform: &'a Platform,
    pub emulators: &'a HashMap<EmulatorId, Emulator>,
    pub fallback: LaunchFallback,
}

/// Counters for one or more ingested documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Entries that created a new game
    pub games_added: usize,
    /// Entries that resolved to a game already in the catalog
    pub games_merged: usize,
    /// Additional applications appended to a game's files; renames of a
    /// file the game already has are not counted
    pub additional_apps: usize,
    /// Entries rejected for a missing field, a dangling reference or a missing file
    pub entries_skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GameField {
    Id,
    Path,
    Title,
    Release,
    Developer,
    Publisher,
    Notes,
    PlayMode,
    Genre,
    Stars,
    Emulator,
    EmulatorParams,
}

impl GameField {
    fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "ID" => Self::Id,
            "ApplicationPath" => Self::Path,
            "Title" => Self::Title,
            "ReleaseDate" => Self::Release,
            "Developer" => Self::Developer,
            "Publisher" => Self::Publisher,
            "Notes" => Self::Notes,
            "PlayMode" => Self::PlayMode,
            "Genre" => Self::Genre,
            "CommunityStarRating" => Self::Stars,
            "Emulator" => Self::Emulator,
            "CommandLine" => Self::EmulatorParams,
            _ => return None,
        })
    }
}

/// Non-empty field values of one `<Game>` record.
#[derive(Debug, Clone, Default)]
struct GameFields {
    id: Option<String>,
    path: Option<String>,
    title: Option<String>,
    release: Option<String>,
    developer: Option<String>,
    publisher: Option<String>,
    notes: Option<String>,
    play_mode: Option<String>,
    genre: Option<String>,
    stars: Option<String>,
    emulator: Option<String>,
    emulator_params: Option<String>,
}

impl GameFields {
    /// Store a value unless the record already declared this field.
    fn set(&mut self, field: GameField, value: String) {
        let slot = match field {
            GameField::Id => &mut self.id,
            GameField::Path => &mut self.path,
            GameField::Title => &mut self.title,
            GameField::Release => &mut self.release,
            GameField::Developer => &mut self.developer,
            GameField::Publisher => &mut self.publisher,
            GameField::Notes => &mut self.notes,
            GameField::PlayMode => &mut self.play_mode,
            GameField::Genre => &mut self.genre,
            GameField::Stars => &mut self.stars,
            GameField::Emulator => &mut self.emulator,
            GameField::EmulatorParams => &mut self.emulator_params,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppField {
    Id,
    GameId,
    Path,
    Name,
}

impl AppField {
    fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "Id" => Self::Id,
            "GameID" => Self::GameId,
            "ApplicationPath" => Self::Path,
            "Name" => Self::Name,
            _ => return None,
        })
    }
}

/// Non-empty field values of one `<AdditionalApplication>` record.
#[derive(Debug, Clone, Default)]
struct AdditionalAppFields {
    id: Option<String>,
    game_id: Option<String>,
    path: Option<String>,
    name: Option<String>,
}

impl AdditionalAppFields {
    fn set(&mut self, field: AppField, value: String) {
        let slot = match field {
            AppField::Id => &mut self.id,
            AppField::GameId => &mut self.game_id,
            AppField::Path => &mut self.path,
            AppField::Name => &mut self.name,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }
}

/// Read the game list of `scope.platform` into the catalog.
pub fn process_platform_xml(
    scope: &PlatformScope<'_>,
    sctx: &mut SearchContext,
    stats: &mut IngestStats,
) -> Result<(), ProviderError> {
    let source = scope.platform.xml_path.as_path();
    let file = File::open(source).map_err(|e| ProviderError::open(source, e))?;
    ingest_document(BufReader::new(file), source, scope, sctx, stats)
}

/// Read one game list document into the catalog. `source` is only used in messages.
///
/// Games stored before a syntax error or a premature end stay in the catalog, and additional
/// applications read up to that point are still attached.
pub fn ingest_document<R: BufRead>(
    reader: R,
    source: &Path,
    scope: &PlatformScope<'_>,
    sctx: &mut SearchContext,
    stats: &mut IngestStats,
) -> Result<(), ProviderError> {
    let mut xml = ElementReader::new(reader, source);
    xml.expect_root("LaunchBox")?;

    sctx.get_or_create_collection(&scope.platform.name);

    let mut pending_apps = Vec::new();
    let mut gameid_map = HashMap::new();
    let walked = walk_entries(
        &mut xml,
        source,
        scope,
        sctx,
        stats,
        &mut pending_apps,
        &mut gameid_map,
    );

    for app in pending_apps {
        store_additional_app(app, source, scope.root, &gameid_map, sctx, stats);
    }
    walked
}

fn walk_entries<R: BufRead>(
    xml: &mut ElementReader<R>,
    source: &Path,
    scope: &PlatformScope<'_>,
    sctx: &mut SearchContext,
    stats: &mut IngestStats,
    pending_apps: &mut Vec<AdditionalAppFields>,
    gameid_map: &mut HashMap<String, GameId>,
) -> Result<(), ProviderError> {
    while let Some(name) = xml.next_start()? {
        match name.as_str() {
            "Game" => {
                let fields = read_game_fields(xml)?;
                store_game_entry(fields, source, scope, sctx, stats, gameid_map);
            }
            "AdditionalApplication" => pending_apps.push(read_app_fields(xml)?),
            _ => xml.skip()?,
        }
    }
    Ok(())
}

fn read_game_fields<R: BufRead>(xml: &mut ElementReader<R>) -> Result<GameFields, ProviderError> {
    let mut fields = GameFields::default();
    while let Some(tag) = xml.next_start()? {
        let Some(field) = GameField::from_tag(&tag) else {
            xml.skip()?;
            continue;
        };
        let text = xml.read_text()?;
        if !text.is_empty() {
            fields.set(field, text);
        }
    }
    Ok(fields)
}

fn read_app_fields<R: BufRead>(
    xml: &mut ElementReader<R>,
) -> Result<AdditionalAppFields, ProviderError> {
    let mut fields = AdditionalAppFields::default();
    while let Some(tag) = xml.next_start()? {
        let Some(field) = AppField::from_tag(&tag) else {
            xml.skip()?;
            continue;
        };
        let text = xml.read_text()?;
        if !text.is_empty() {
            fields.set(field, text);
        }
    }
    Ok(fields)
}

/// Resolve a document path to the canonical path of an existing file.
fn existing_file(root: &Path, raw: &str) -> Option<PathBuf> {
    paths::canonical(&paths::resolve(root, raw))
}

fn store_game_entry(
    fields: GameFields,
    source: &Path,
    scope: &PlatformScope<'_>,
    sctx: &mut SearchContext,
    stats: &mut IngestStats,
    gameid_map: &mut HashMap<String, GameId>,
) {
    let Some(ext_id) = fields.id.as_deref() else {
        log::warn!("{MSG_PREFIX} in `{}`, a game has no ID, entry ignored", source.display());
        stats.entries_skipped += 1;
        return;
    };
    let Some(raw_path) = fields.path.as_deref() else {
        log::warn!(
            "{MSG_PREFIX} in `{}`, game `{ext_id}` has no path, entry ignored",
            source.display()
        );
        stats.entries_skipped += 1;
        return;
    };
    let Some(can_path) = existing_file(scope.root, raw_path) else {
        log::warn!(
            "{MSG_PREFIX} in `{}`, game file `{raw_path}` doesn't seem to exist, entry ignored",
            source.display()
        );
        stats.entries_skipped += 1;
        return;
    };

    let (game_id, created) =
        sctx.create_or_get_game(can_path.clone(), || Game::new(GameFile::new(can_path)));
    let Some(game) = sctx.game_mut(game_id) else {
        return;
    };

    merge_fields(game, &fields);
    if game.launch_cmd.is_empty() {
        match launch_command(&fields, scope) {
            Some((cmd, workdir)) => {
                game.launch_cmd = cmd;
                game.launch_workdir = Some(workdir);
            }
            None => log::warn!("{MSG_PREFIX} game '{}' has no launch command", game.title),
        }
    }

    if created {
        stats.games_added += 1;
    } else {
        log::debug!(
            "{MSG_PREFIX} game `{ext_id}` in `{}` refers to known game {game_id}, merged",
            source.display()
        );
        stats.games_merged += 1;
    }

    sctx.add_collection_child(&scope.platform.name, game_id);
    gameid_map.entry(ext_id.to_string()).or_insert(game_id);
}

/// Apply one record's fields to a game.
fn merge_fields(game: &mut Game, fields: &GameFields) {
    if let Some(title) = &fields.title {
        game.title.clone_from(title);
    }
    if let Some(notes) = &fields.notes {
        if game.description.is_empty() {
            game.description.clone_from(notes);
        }
    }
    if let Some(developer) = &fields.developer {
        push_unique(&mut game.developers, developer.as_str());
    }
    if let Some(publisher) = &fields.publisher {
        push_unique(&mut game.publishers, publisher.as_str());
    }
    if let Some(genre) = &fields.genre {
        push_unique(&mut game.genres, genre.as_str());
    }
    if let Some(play_mode) = &fields.play_mode {
        for mode in play_mode.split(';').map(str::trim).filter(|m| !m.is_empty()) {
            push_unique(&mut game.genres, mode);
        }
    }
    if game.release_date.is_none() {
        game.release_date = fields.release.as_deref().and_then(parse_release_date);
    }
    if let Some(rating) = fields.stars.as_deref().and_then(parse_rating) {
        if !game.is_rated() || rating > game.rating {
            game.rating = rating;
        }
    }
}

fn launch_command(fields: &GameFields, scope: &PlatformScope<'_>) -> Option<(String, PathBuf)> {
    let default_emu = scope.emulators.get(&scope.platform.default_emu_id)?;
    let emulator = match fields.emulator.as_deref() {
        Some(id) => scope.emulators.get(id).unwrap_or_else(|| {
            log::debug!("{MSG_PREFIX} unknown emulator `{id}`, using the platform default");
            default_emu
        }),
        None => default_emu,
    };
    let params = launch::command_params(
        fields.emulator_params.as_deref(),
        &scope.platform.cmd_params,
        scope.fallback,
        default_emu,
        emulator,
    );
    launch::build_launch_command(&emulator.app_path, &params)
}

/// Parse `YYYY-MM-DD`, also when it starts a timestamp (`2004-02-09T00:00:00-08:00`).
fn parse_release_date(text: &str) -> Option<NaiveDate> {
    let date = text.get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Convert a 0-5 star rating to the 0.0-1.0 range. Anything below
/// [`RATING_EPSILON`] is unrated and becomes 0.
fn parse_rating(text: &str) -> Option<f32> {
    let stars: f32 = text.parse().ok()?;
    if !stars.is_finite() {
        return None;
    }
    let rating = (stars / 5.0).clamp(0.0, 1.0);
    Some(if rating < RATING_EPSILON { 0.0 } else { rating })
}

fn store_additional_app(
    app: AdditionalAppFields,
    source: &Path,
    root: &Path,
    gameid_map: &HashMap<String, GameId>,
    sctx: &mut SearchContext,
    stats: &mut IngestStats,
) {
    let Some(app_id) = app.id.as_deref() else {
        log::warn!(
            "{MSG_PREFIX} in `{}`, an additional application entry has no ID, entry ignored",
            source.display()
        );
        stats.entries_skipped += 1;
        return;
    };
    let Some(ext_game_id) = app.game_id.as_deref() else {
        log::warn!(
            "{MSG_PREFIX} in `{}`, additional application entry `{app_id}` has no GameID field, entry ignored",
            source.display()
        );
        stats.entries_skipped += 1;
        return;
    };
    let Some(&game_id) = gameid_map.get(ext_game_id) else {
        log::warn!(
            "{MSG_PREFIX} in `{}`, additional application entry `{app_id}` refers to nonexisting game `{ext_game_id}`, entry ignored",
            source.display()
        );
        stats.entries_skipped += 1;
        return;
    };
    let Some(raw_path) = app.path.as_deref() else {
        log::warn!(
            "{MSG_PREFIX} in `{}`, additional application entry `{app_id}` has no path, entry ignored",
            source.display()
        );
        stats.entries_skipped += 1;
        return;
    };
    let Some(can_path) = existing_file(root, raw_path) else {
        log::warn!(
            "{MSG_PREFIX} in `{}`, additional application entry `{app_id}` refers to nonexisting file `{raw_path}`, entry ignored",
            source.display()
        );
        stats.entries_skipped += 1;
        return;
    };

    let Some(game) = sctx.game_mut(game_id) else {
        return;
    };
    match game.find_file_mut(&can_path) {
        Some(file) => {
            if app.name.is_some() {
                file.name = app.name;
            }
        }
        None => {
            game.files.push(GameFile {
                path: can_path.clone(),
                name: app.name,
            });
            stats.additional_apps += 1;
        }
    }

    sctx.register_path(can_path, game_id);
}

#[cfg(test)]
#[path = "tests/gamelist_tests.rs"]
mod tests;
