//! The replicated game record store.
//!
//! Each game lives under its `gameId` as one complete [`GameState`]. Writers
//! replace the whole record and must name the version they read: a write
//! against a stale version is refused instead of silently overwriting a move
//! someone else made.

use cardparty_engine::game::GameState;
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

pub type GameId = String;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Game not found: {0}")]
    NotFound(GameId),
    #[error("Version conflict: record is at version {expected}, write was based on {found}")]
    VersionConflict { expected: u64, found: u64 },
    #[error("Malformed game state: {0}")]
    MalformedState(String),
    #[error("Game {0} is finished")]
    GameFinished(GameId),
    #[error("Game storage poisoned")]
    StoragePoisoned,
}

#[derive(Debug, Default)]
pub struct GameStore {
    games: RwLock<HashMap<GameId, GameState>>,
}

impl GameStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, game_id: &str) -> Result<GameState, StoreError> {
        let guard = self.games.read().map_err(|_| StoreError::StoragePoisoned)?;
        guard
            .get(game_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(game_id.to_string()))
    }

    pub fn version(&self, game_id: &str) -> Result<u64, StoreError> {
        let guard = self.games.read().map_err(|_| StoreError::StoragePoisoned)?;
        guard
            .get(game_id)
            .map(|state| state.version)
            .ok_or_else(|| StoreError::NotFound(game_id.to_string()))
    }

    /// Replaces the record for `game_id` with `state`.
    ///
    /// `state.version` is the version the writer based its change on; it must
    /// equal the stored version (0 for a game not yet stored). The stored
    /// copy gets `version + 1`, and that copy is returned.
    pub fn put(&self, game_id: &str, mut state: GameState) -> Result<GameState, StoreError> {
        if state.game_id != game_id {
            return Err(StoreError::MalformedState(format!(
                "gameId {} does not match {game_id}",
                state.game_id
            )));
        }
        state
            .validate()
            .map_err(|err| StoreError::MalformedState(err.to_string()))?;

        let mut guard = self.games.write().map_err(|_| StoreError::StoragePoisoned)?;
        let current = match guard.get(game_id) {
            Some(existing) if existing.is_game_over => {
                return Err(StoreError::GameFinished(game_id.to_string()));
            }
            Some(existing) => existing.version,
            None => 0,
        };
        if state.version != current {
            return Err(StoreError::VersionConflict {
                expected: current,
                found: state.version,
            });
        }

        state.version = current + 1;
        guard.insert(game_id.to_string(), state.clone());
        Ok(state)
    }

    pub fn delete(&self, game_id: &str) -> Result<GameState, StoreError> {
        let mut guard = self.games.write().map_err(|_| StoreError::StoragePoisoned)?;
        guard
            .remove(game_id)
            .ok_or_else(|| StoreError::NotFound(game_id.to_string()))
    }

    /// Stored game ids, sorted.
    pub fn ids(&self) -> Vec<GameId> {
        let mut ids: Vec<_> = match self.games.read() {
            Ok(guard) => guard.keys().cloned().collect(),
            Err(_) => Vec::new(),
        };
        ids.sort();
        ids
    }
}
