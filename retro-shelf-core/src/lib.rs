//! Game catalog model and the run-scoped catalog store.
//!
//! Metadata providers fold their sources into one [`SearchContext`]; the
//! frontend reads the populated store afterwards. This crate does no I/O.

pub mod asset;
pub mod context;
pub mod model;

pub use asset::{AssetKind, AssetMap};
pub use context::{Collection, SearchContext};
pub use model::{Game, GameFile, GameId, RATING_EPSILON, push_unique};
