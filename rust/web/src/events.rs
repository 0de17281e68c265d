use crate::store::GameId;
use cardparty_engine::engine::TurnEvent;
use cardparty_engine::game::GameState;
use cardparty_engine::player::Player;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::mpsc;

// Bounded so a stalled client cannot grow memory; it is dropped instead.
const EVENT_CHANNEL_BUFFER: usize = 256;

pub type EventSender = mpsc::Sender<GameEvent>;
pub type EventReceiver = mpsc::Receiver<GameEvent>;

/// A live subscription. Dropping it unsubscribes.
pub struct EventSubscription {
    bus: EventBus,
    game_id: GameId,
    subscriber_id: usize,
    pub receiver: EventReceiver,
}

impl EventSubscription {
    pub fn receiver(&mut self) -> &mut EventReceiver {
        &mut self.receiver
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.game_id, self.subscriber_id);
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

type Subscribers = HashMap<GameId, Vec<(usize, EventSender)>>;

#[derive(Debug, Default)]
struct EventBusInner {
    subscribers: RwLock<Subscribers>,
    next_id: AtomicUsize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, game_id: GameId) -> EventSubscription {
        let (subscriber_id, receiver) = self.subscribe_raw(game_id.clone());
        EventSubscription {
            bus: self.clone(),
            game_id,
            subscriber_id,
            receiver,
        }
    }

    fn subscribe_raw(&self, game_id: GameId) -> (usize, EventReceiver) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_BUFFER);
        let id = self.inner.next_id.fetch_add(1, Ordering::AcqRel);
        self.write().entry(game_id.clone()).or_default().push((id, tx));

        tracing::info!(
            game_id = %game_id,
            subscriber_id = id,
            "client subscribed to game events"
        );

        (id, rx)
    }

    pub fn broadcast(&self, game_id: &str, event: GameEvent) {
        tracing::debug!(
            game_id = %game_id,
            event_type = event.kind(),
            "broadcasting game event"
        );

        let Some(list) = self.read().get(game_id).cloned() else {
            tracing::trace!(game_id = %game_id, "no subscribers for game");
            return;
        };

        let mut failed = Vec::new();
        for (id, sender) in list {
            // try_send: a full or closed channel drops the subscriber
            if let Err(e) = sender.try_send(event.clone()) {
                tracing::warn!(
                    game_id = %game_id,
                    subscriber_id = id,
                    error = %e,
                    "failed to send event to subscriber"
                );
                failed.push(id);
            }
        }
        if !failed.is_empty() {
            self.remove_subscribers(game_id, &failed);
        }
    }

    pub fn unsubscribe(&self, game_id: &str, subscriber_id: usize) {
        self.remove_subscribers(game_id, &[subscriber_id]);
    }

    /// Disconnects every subscriber of `game_id`.
    pub fn drop_game(&self, game_id: &str) {
        self.write().remove(game_id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.read().values().map(|list| list.len()).sum()
    }

    fn remove_subscribers(&self, game_id: &str, ids: &[usize]) {
        let mut guard = self.write();
        if let Some(list) = guard.get_mut(game_id) {
            list.retain(|(id, _)| !ids.contains(id));
            if list.is_empty() {
                guard.remove(game_id);
            }
        }
    }

    // A panic while holding the lock leaves the map itself intact.
    fn read(&self) -> RwLockReadGuard<'_, Subscribers> {
        self.inner
            .subscribers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Subscribers> {
        self.inner
            .subscribers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Public view of a seat: hand sizes only, never card faces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    pub id: String,
    pub name: String,
    pub cards: usize,
    pub is_automated: bool,
}

impl From<&Player> for PlayerInfo {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            cards: player.hand.len(),
            is_automated: player.is_automated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum GameEvent {
    GameCreated {
        game_id: GameId,
        players: Vec<PlayerInfo>,
        version: u64,
    },
    PlayerJoined {
        game_id: GameId,
        player: PlayerInfo,
        version: u64,
    },
    /// One engine event (card played, cards drawn, reversal, skip,
    /// reshuffle, pass) from an accepted move.
    Turn {
        game_id: GameId,
        version: u64,
        event: TurnEvent,
    },
    StateUpdated {
        game_id: GameId,
        version: u64,
        current_player_id: String,
        turn_message: String,
    },
    GameOver {
        game_id: GameId,
        winner: PlayerInfo,
    },
    GameEnded {
        game_id: GameId,
        reason: String,
    },
    Error {
        game_id: GameId,
        message: String,
    },
}

impl GameEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            GameEvent::GameCreated { .. } => "game_created",
            GameEvent::PlayerJoined { .. } => "player_joined",
            GameEvent::Turn { .. } => "turn",
            GameEvent::StateUpdated { .. } => "state_updated",
            GameEvent::GameOver { .. } => "game_over",
            GameEvent::GameEnded { .. } => "game_ended",
            GameEvent::Error { .. } => "error",
        }
    }

    pub fn state_updated(state: &GameState) -> Self {
        GameEvent::StateUpdated {
            game_id: state.game_id.clone(),
            version: state.version,
            current_player_id: state
                .current_player()
                .map(|p| p.id.clone())
                .unwrap_or_default(),
            turn_message: state.turn_message.clone(),
        }
    }
}
