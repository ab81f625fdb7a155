//! The run-scoped catalog store shared by all metadata providers.
//!
//! Providers run one after another against the same [`SearchContext`]. The
//! store is plain owned data; if providers ever run in parallel, wrap it in a
//! single-writer lock or give each provider its own store and merge afterwards.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::asset::AssetKind;
use crate::model::{Game, GameId};

/// A named group of games (one per platform), in first-encountered order.
///
/// Children are not deduplicated: a source listing the same file twice puts
/// the game in the collection twice.
#[derive(Debug, Clone, Serialize)]
pub struct Collection {
    pub name: String,
    children: Vec<GameId>,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn children(&self) -> &[GameId] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Shared catalog: game table, path identity index and collections.
///
/// Invariants:
/// - a canonical path maps to at most one game id for the lifetime of the store;
/// - every id listed in a collection exists in the game table;
/// - asset slots are write-once (see [`AssetMap`](crate::AssetMap)).
#[derive(Debug, Default, Serialize)]
pub struct SearchContext {
    games: BTreeMap<GameId, Game>,
    collections: BTreeMap<String, Collection>,
    #[serde(skip)]
    path_to_gameid: HashMap<PathBuf, GameId>,
    #[serde(skip)]
    next_id: usize,
}

impl SearchContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the game owning a canonical path.
    pub fn game_id_for_path(&self, path: &Path) -> Option<GameId> {
        self.path_to_gameid.get(path).copied()
    }

    /// Return the game owning `canonical_path`, creating it with `make` if the
    /// path is new.
    ///
    /// The second value is `true` when a game was created.
    pub fn create_or_get_game(
        &mut self,
        canonical_path: PathBuf,
        make: impl FnOnce() -> Game,
    ) -> (GameId, bool) {
        match self.path_to_gameid.entry(canonical_path) {
            Entry::Occupied(existing) => (*existing.get(), false),
            Entry::Vacant(slot) => {
                let id = GameId(self.next_id);
                self.next_id += 1;
                self.games.insert(id, make());
                slot.insert(id);
                (id, true)
            }
        }
    }

    /// Point another canonical path at an existing game.
    ///
    /// A path that already belongs to a game keeps its owner. Returns `true`
    /// if the path was newly registered.
    pub fn register_path(&mut self, canonical_path: PathBuf, id: GameId) -> bool {
        if !self.games.contains_key(&id) {
            log::debug!(
                "refusing to register `{}` for unknown game {id}",
                canonical_path.display()
            );
            return false;
        }
        match self.path_to_gameid.entry(canonical_path) {
            Entry::Occupied(existing) => {
                if *existing.get() != id {
                    log::debug!(
                        "`{}` already belongs to game {}, not rebinding to {id}",
                        existing.key().display(),
                        existing.get()
                    );
                }
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
                true
            }
        }
    }

    pub fn game(&self, id: GameId) -> Option<&Game> {
        self.games.get(&id)
    }

    pub fn game_mut(&mut self, id: GameId) -> Option<&mut Game> {
        self.games.get_mut(&id)
    }

    /// All games in id order.
    pub fn games(&self) -> impl Iterator<Item = (GameId, &Game)> {
        self.games.iter().map(|(id, game)| (*id, game))
    }

    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    /// The path identity index, sorted by path.
    pub fn path_entries(&self) -> Vec<(&Path, GameId)> {
        let mut entries: Vec<(&Path, GameId)> = self
            .path_to_gameid
            .iter()
            .map(|(path, id)| (path.as_path(), *id))
            .collect();
        entries.sort();
        entries
    }

    pub fn get_or_create_collection(&mut self, name: &str) -> &mut Collection {
        self.collections
            .entry(name.to_string())
            .or_insert_with(|| Collection::new(name))
    }

    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    /// Append a game to a collection, creating the collection if needed.
    ///
    /// Returns `false` (and changes nothing) if the game does not exist.
    pub fn add_collection_child(&mut self, name: &str, id: GameId) -> bool {
        if !self.games.contains_key(&id) {
            log::debug!("refusing to add unknown game {id} to collection `{name}`");
            return false;
        }
        self.get_or_create_collection(name).children.push(id);
        true
    }

    /// Children of a collection; empty if the collection does not exist.
    pub fn collection_children(&self, name: &str) -> &[GameId] {
        self.collections
            .get(name)
            .map(Collection::children)
            .unwrap_or_default()
    }

    /// All collections in name order.
    pub fn collections(&self) -> impl Iterator<Item = &Collection> {
        self.collections.values()
    }

    pub fn collection_count(&self) -> usize {
        self.collections.len()
    }

    pub fn asset(&self, id: GameId, kind: AssetKind) -> Option<&Path> {
        self.games.get(&id).and_then(|game| game.assets.get(kind))
    }

    /// Bind an asset file to a game's slot unless the slot is already filled.
    ///
    /// Returns `true` if the file was stored.
    pub fn set_asset_maybe(&mut self, id: GameId, kind: AssetKind, path: impl Into<PathBuf>) -> bool {
        match self.games.get_mut(&id) {
            Some(game) => game.assets.add_file_maybe(kind, path),
            None => false,
        }
    }
}

#[cfg(test)]
#[path = "tests/context_tests.rs"]
mod tests;
