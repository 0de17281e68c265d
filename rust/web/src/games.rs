//! The game service: every accepted change to a shared game record passes
//! through here on its way to the store.
//!
//! A change is computed by the engine against the record as read, written
//! back with a compare-and-swap on the record's version, journalled, and
//! then broadcast to subscribers. Automated seats are driven by a background
//! task that re-checks the version before committing its proposal.

use crate::ai::OpponentAdapter;
use crate::errors::{ErrorSeverity, IntoErrorResponse};
use crate::events::{EventBus, GameEvent, PlayerInfo};
use crate::store::{GameId, GameStore, StoreError};
use cardparty_engine::engine::{
    legal_card_ids, Engine, Move, Transition, TurnEvent, MAX_TABLE_SIZE,
};
use cardparty_engine::errors::GameError;
use cardparty_engine::game::GameState;
use cardparty_engine::logger::{MoveJournal, MoveRecord};
use cardparty_engine::opponent::{resolve_proposal, OpponentRequest};
use cardparty_engine::player::{Player, Seat};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use uuid::Uuid;
use warp::http::StatusCode;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGame {
    pub player_name: String,
    #[serde(default)]
    pub automated_opponents: usize,
    pub max_players: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGame {
    pub player_name: String,
    #[serde(default)]
    pub automated: bool,
}

/// The committed record after a move, and what the move did.
#[derive(Debug, Clone, Serialize)]
pub struct MoveOutcome {
    pub state: GameState,
    pub events: Vec<TurnEvent>,
}

#[derive(Debug, Error)]
pub enum GameServiceError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Player {0} is not seated in this game")]
    PlayerNotFound(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Engine lock poisoned")]
    EnginePoisoned,
}

impl IntoErrorResponse for GameServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            GameServiceError::Game(err) => match err {
                GameError::NoCardsAvailable
                | GameError::GameOver
                | GameError::GameFull { .. }
                | GameError::AlreadySeated(_) => StatusCode::CONFLICT,
                _ => StatusCode::BAD_REQUEST,
            },
            GameServiceError::Store(err) => match err {
                StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                StoreError::VersionConflict { .. } | StoreError::GameFinished(_) => {
                    StatusCode::CONFLICT
                }
                StoreError::MalformedState(_) => StatusCode::BAD_REQUEST,
                StoreError::StoragePoisoned => StatusCode::INTERNAL_SERVER_ERROR,
            },
            GameServiceError::PlayerNotFound(_) => StatusCode::NOT_FOUND,
            GameServiceError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GameServiceError::EnginePoisoned => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            GameServiceError::Game(err) => match err {
                GameError::NotPlayersTurn { .. } => "not_players_turn",
                GameError::ColorRequired { .. } | GameError::InvalidColorChoice(_) => {
                    "color_required"
                }
                GameError::CardNotInHand { .. }
                | GameError::CardNotPlayable { .. }
                | GameError::PassNotAllowed => "illegal_move",
                GameError::NoCardsAvailable => "no_cards_available",
                GameError::GameOver => "game_over",
                GameError::GameFull { .. } => "game_full",
                GameError::AlreadySeated(_) => "already_seated",
                GameError::InvalidPlayerCount { .. } => "invalid_player_count",
                GameError::MalformedState(_) => "malformed_state",
            },
            GameServiceError::Store(err) => match err {
                StoreError::NotFound(_) => "game_not_found",
                StoreError::VersionConflict { .. } => "version_conflict",
                StoreError::MalformedState(_) => "malformed_state",
                StoreError::GameFinished(_) => "game_finished",
                StoreError::StoragePoisoned => "storage_poisoned",
            },
            GameServiceError::PlayerNotFound(_) => "player_not_found",
            GameServiceError::InvalidRequest(_) => "invalid_request",
            GameServiceError::EnginePoisoned => "engine_poisoned",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            GameServiceError::Store(StoreError::VersionConflict { expected, found }) => {
                Some(serde_json::json!({ "expected": expected, "found": found }))
            }
            GameServiceError::Store(StoreError::NotFound(id))
            | GameServiceError::Store(StoreError::GameFinished(id)) => {
                Some(serde_json::json!({ "gameId": id }))
            }
            GameServiceError::Game(GameError::NotPlayersTurn { expected, actual }) => {
                Some(serde_json::json!({ "expected": expected, "actual": actual }))
            }
            _ => None,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            GameServiceError::Store(StoreError::StoragePoisoned)
            | GameServiceError::EnginePoisoned => ErrorSeverity::Critical,
            _ => ErrorSeverity::Client,
        }
    }
}

pub struct GameManager {
    store: Arc<GameStore>,
    event_bus: Arc<EventBus>,
    engine: Mutex<Engine>,
    adapter: OpponentAdapter,
    journal: Option<Mutex<MoveJournal>>,
    autoplay: bool,
    default_max_players: usize,
}

impl std::fmt::Debug for GameManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameManager")
            .field("games", &self.store.ids().len())
            .field("adapter", &self.adapter)
            .field("journal", &self.journal.is_some())
            .field("autoplay", &self.autoplay)
            .field("default_max_players", &self.default_max_players)
            .finish()
    }
}

impl GameManager {
    pub fn new(
        store: Arc<GameStore>,
        event_bus: Arc<EventBus>,
        engine: Engine,
        adapter: OpponentAdapter,
    ) -> Self {
        tracing::info!(seed = engine.seed(), opponent = adapter.name(), "game engine ready");
        Self {
            store,
            event_bus,
            engine: Mutex::new(engine),
            adapter,
            journal: None,
            autoplay: true,
            default_max_players: 4,
        }
    }

    pub fn with_journal(mut self, journal: MoveJournal) -> Self {
        self.journal = Some(Mutex::new(journal));
        self
    }

    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    pub fn with_default_max_players(mut self, max_players: usize) -> Self {
        self.default_max_players = max_players;
        self
    }

    pub fn store(&self) -> Arc<GameStore> {
        Arc::clone(&self.store)
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    pub fn get_game(&self, game_id: &str) -> Result<GameState, GameServiceError> {
        Ok(self.store.get(game_id)?)
    }

    /// Deals a new game with the requesting player in the first seat and
    /// any automated opponents after them.
    pub fn create_game(&self, request: CreateGame) -> Result<GameState, GameServiceError> {
        let name = request.player_name.trim();
        if name.is_empty() {
            return Err(GameServiceError::InvalidRequest("playerName must not be empty".into()));
        }
        let max_players = request.max_players.unwrap_or(self.default_max_players);
        if !(2..=MAX_TABLE_SIZE).contains(&max_players) {
            return Err(GameServiceError::InvalidRequest(format!(
                "maxPlayers must be between 2 and {MAX_TABLE_SIZE}"
            )));
        }

        let mut seats = vec![Seat::human(new_player_id(), name)];
        for n in 1..=request.automated_opponents {
            seats.push(Seat::automated(format!("bot-{n}"), format!("Bot {n}")));
        }

        let game_id = Uuid::new_v4().to_string();
        let state = self.engine()?.new_game(game_id.clone(), seats, max_players)?;
        let stored = self.store.put(&game_id, state)?;

        tracing::info!(
            game_id = %game_id,
            players = stored.players.len(),
            max_players,
            version = stored.version,
            "game created"
        );
        self.event_bus.broadcast(
            &game_id,
            GameEvent::GameCreated {
                game_id: game_id.clone(),
                players: stored.players.iter().map(PlayerInfo::from).collect(),
                version: stored.version,
            },
        );
        Ok(stored)
    }

    /// Seats a new player at the end of the table. Returns the new player
    /// and the committed record.
    pub fn join_game(
        &self,
        game_id: &str,
        request: JoinGame,
    ) -> Result<(Player, GameState), GameServiceError> {
        let name = request.player_name.trim();
        if name.is_empty() {
            return Err(GameServiceError::InvalidRequest("playerName must not be empty".into()));
        }
        let current = self.store.get(game_id)?;
        let seat = if request.automated {
            Seat::automated(new_player_id(), name)
        } else {
            Seat::human(new_player_id(), name)
        };
        let transition = self.engine()?.seat_player(&current, seat)?;
        let stored = self.commit(game_id, current.version, None, transition)?;

        let player = stored
            .players
            .last()
            .cloned()
            .ok_or_else(|| GameError::MalformedState("no players seated".into()))?;
        tracing::info!(
            game_id = %game_id,
            player_id = %player.id,
            version = stored.version,
            "player joined"
        );
        self.event_bus.broadcast(
            game_id,
            GameEvent::PlayerJoined {
                game_id: game_id.to_string(),
                player: PlayerInfo::from(&player),
                version: stored.version,
            },
        );
        Ok((player, stored))
    }

    /// Applies `mv` to the stored record. With `base_version` set, the move
    /// is refused unless the record is still at that version.
    pub fn submit_move(
        &self,
        game_id: &str,
        base_version: Option<u64>,
        mv: Move,
    ) -> Result<MoveOutcome, GameServiceError> {
        let current = self.store.get(game_id)?;
        if let Some(base) = base_version {
            if base != current.version {
                return Err(StoreError::VersionConflict {
                    expected: current.version,
                    found: base,
                }
                .into());
            }
        }
        let transition = self.engine()?.apply(&current, &mv)?;
        let events = transition.events.clone();
        let state = self.commit(game_id, current.version, Some(&mv), transition)?;
        Ok(MoveOutcome { state, events })
    }

    /// Full-record replacement from a client that computed the successor
    /// itself. The record must be internally consistent and based on the
    /// stored version.
    pub fn replace_state(
        &self,
        game_id: &str,
        state: GameState,
    ) -> Result<GameState, GameServiceError> {
        let base = state.version;
        let stored = self.store.put(game_id, state)?;
        tracing::info!(
            game_id = %game_id,
            base_version = base,
            version = stored.version,
            "game record replaced"
        );
        self.publish(&stored, &[]);
        Ok(stored)
    }

    pub fn delete_game(&self, game_id: &str) -> Result<(), GameServiceError> {
        self.store.delete(game_id)?;
        tracing::info!(game_id = %game_id, "game deleted");
        self.event_bus.broadcast(
            game_id,
            GameEvent::GameEnded {
                game_id: game_id.to_string(),
                reason: "deleted".into(),
            },
        );
        self.event_bus.drop_game(game_id);
        Ok(())
    }

    /// Ids of the cards `player_id` may play now; empty when it is not their
    /// turn.
    pub fn legal_moves(&self, game_id: &str, player_id: &str) -> Result<Vec<String>, GameServiceError> {
        let state = self.store.get(game_id)?;
        if state.player(player_id).is_none() {
            return Err(GameServiceError::PlayerNotFound(player_id.to_string()));
        }
        Ok(legal_card_ids(&state, player_id))
    }

    pub fn game_ids(&self) -> Vec<GameId> {
        self.store.ids()
    }

    /// Plays one turn for the automated player whose turn it is.
    ///
    /// Returns `Ok(None)` when there is nothing to do: the game is over, the
    /// current player is not automated, or the record moved on while the
    /// opponent was thinking (its proposal is then discarded).
    pub async fn run_automated_turn(
        &self,
        game_id: &str,
    ) -> Result<Option<MoveOutcome>, GameServiceError> {
        let observed = self.store.get(game_id)?;
        if !is_automated_turn(&observed) {
            return Ok(None);
        }
        let request = OpponentRequest::from_state(&observed)?;

        let think_time = self.adapter.think_time();
        if !think_time.is_zero() {
            tokio::time::sleep(think_time).await;
        }
        let proposal = self.adapter.propose(request).await;

        let current = self.store.get(game_id)?;
        if current.version != observed.version {
            tracing::debug!(
                game_id = %game_id,
                observed = observed.version,
                current = current.version,
                "discarding stale opponent proposal"
            );
            return Ok(None);
        }

        let (mv, transition) = {
            let mut engine = self.engine()?;
            let mv = resolve_proposal(&current, &proposal, engine.rng_mut())?;
            match engine.apply(&current, &mv) {
                Ok(transition) => (mv, transition),
                Err(GameError::NoCardsAvailable) => {
                    let pass = Move::Pass {
                        player_id: mv.player_id().to_string(),
                    };
                    let transition = engine.apply(&current, &pass)?;
                    (pass, transition)
                }
                Err(err) => return Err(err.into()),
            }
        };

        let events = transition.events.clone();
        match self.commit(game_id, current.version, Some(&mv), transition) {
            Ok(state) => Ok(Some(MoveOutcome { state, events })),
            Err(GameServiceError::Store(StoreError::VersionConflict { .. })) => {
                tracing::debug!(game_id = %game_id, "record changed before opponent move landed");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Starts a background task that keeps playing automated turns until a
    /// human is to move or the game ends. Does nothing with autoplay off.
    pub fn schedule_automated_turns(self: &Arc<Self>, game_id: &str) {
        if !self.autoplay {
            return;
        }
        let due = self
            .store
            .get(game_id)
            .map(|state| is_automated_turn(&state))
            .unwrap_or(false);
        if !due {
            return;
        }

        let manager = Arc::clone(self);
        let game_id = game_id.to_string();
        tokio::spawn(async move {
            loop {
                match manager.run_automated_turn(&game_id).await {
                    Ok(Some(_)) => continue,
                    // A discarded proposal or a lost swap leaves the turn unplayed;
                    // keep going while an automated seat is still up.
                    Ok(None) => {
                        let due = manager
                            .store
                            .get(&game_id)
                            .map(|state| is_automated_turn(&state))
                            .unwrap_or(false);
                        if !due {
                            break;
                        }
                    }
                    Err(GameServiceError::Store(StoreError::NotFound(_))) => break,
                    Err(err) => {
                        tracing::warn!(game_id = %game_id, error = %err, "automated turn failed");
                        manager.event_bus.broadcast(
                            &game_id,
                            GameEvent::Error {
                                game_id: game_id.clone(),
                                message: err.to_string(),
                            },
                        );
                        break;
                    }
                }
            }
        });
    }

    fn engine(&self) -> Result<MutexGuard<'_, Engine>, GameServiceError> {
        self.engine.lock().map_err(|_| GameServiceError::EnginePoisoned)
    }

    /// Writes `transition.state` over the record read at `base_version`,
    /// then journals and broadcasts the result.
    fn commit(
        &self,
        game_id: &str,
        base_version: u64,
        mv: Option<&Move>,
        transition: Transition,
    ) -> Result<GameState, GameServiceError> {
        let Transition { mut state, events } = transition;
        state.version = base_version;
        let stored = self.store.put(game_id, state)?;

        if let Some(mv) = mv {
            tracing::debug!(
                game_id = %game_id,
                player_id = %mv.player_id(),
                version = stored.version,
                events = events.len(),
                "move committed"
            );
            self.write_journal(MoveRecord::new(game_id, stored.version, mv.clone(), events.clone()));
        }
        self.publish(&stored, &events);
        Ok(stored)
    }

    fn write_journal(&self, record: MoveRecord) {
        let Some(journal) = &self.journal else {
            return;
        };
        let result = match journal.lock() {
            Ok(mut journal) => journal.write(&record),
            Err(_) => {
                tracing::error!(game_id = %record.game_id, "journal lock poisoned");
                return;
            }
        };
        if let Err(err) = result {
            tracing::warn!(game_id = %record.game_id, error = %err, "failed to journal move");
        }
    }

    fn publish(&self, state: &GameState, events: &[TurnEvent]) {
        for event in events {
            self.event_bus.broadcast(
                &state.game_id,
                GameEvent::Turn {
                    game_id: state.game_id.clone(),
                    version: state.version,
                    event: event.clone(),
                },
            );
        }
        self.event_bus
            .broadcast(&state.game_id, GameEvent::state_updated(state));
        if let Some(winner) = &state.winner {
            tracing::info!(game_id = %state.game_id, winner = %winner.id, "game over");
            self.event_bus.broadcast(
                &state.game_id,
                GameEvent::GameOver {
                    game_id: state.game_id.clone(),
                    winner: PlayerInfo::from(winner),
                },
            );
        }
    }
}

fn is_automated_turn(state: &GameState) -> bool {
    !state.is_game_over && state.current_player().is_some_and(|p| p.is_automated)
}

fn new_player_id() -> String {
    format!("player-{}", Uuid::new_v4().simple())
}
