use crate::cards::{deck_composition, Card, Color, DECK_SIZE};
use crate::errors::GameError;
use crate::player::Player;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Seating traversal order, toggled by Reverse.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Clockwise,
    Counterclockwise,
}

impl Direction {
    /// Signed seat offset of one turn step.
    pub fn step(self) -> isize {
        match self {
            Direction::Clockwise => 1,
            Direction::Counterclockwise => -1,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Direction::Clockwise => Direction::Counterclockwise,
            Direction::Counterclockwise => Direction::Clockwise,
        }
    }

    /// Seat index one step away from `index` at a table of `seats` players.
    pub fn advance(self, index: usize, seats: usize) -> usize {
        if seats == 0 {
            return 0;
        }
        (index as isize + self.step()).rem_euclid(seats as isize) as usize
    }
}

/// The shared game record. This is exactly what is replicated between
/// clients, so every field is part of the JSON contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub game_id: String,
    pub players: Vec<Player>,
    /// Draw pile; the head is the next card drawn.
    pub deck: Vec<Card>,
    /// Discard pile; the tail is the active top card.
    pub discard_pile: Vec<Card>,
    pub current_player_index: usize,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub is_game_over: bool,
    #[serde(default)]
    pub winner: Option<Player>,
    #[serde(default)]
    pub active_color: Option<Color>,
    #[serde(default)]
    pub turn_message: String,
    pub max_players: usize,
    /// Number of writes the shared store has accepted for this record.
    #[serde(default)]
    pub version: u64,
}

impl GameState {
    pub fn top_card(&self) -> Option<&Card> {
        self.discard_pile.last()
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_player_index)
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn player_index(&self, player_id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.id == player_id)
    }

    pub fn next_index(&self, from: usize) -> usize {
        self.direction.advance(from, self.players.len())
    }

    /// Cards across deck, discard pile and every hand.
    pub fn total_cards(&self) -> usize {
        self.deck.len()
            + self.discard_pile.len()
            + self.players.iter().map(|p| p.hand.len()).sum::<usize>()
    }

    fn all_cards(&self) -> impl Iterator<Item = &Card> {
        self.deck
            .iter()
            .chain(self.discard_pile.iter())
            .chain(self.players.iter().flat_map(|p| p.hand.iter()))
    }

    /// Checks the record against every game invariant. Used on records that
    /// arrive from outside the engine before they are accepted.
    pub fn validate(&self) -> Result<(), GameError> {
        let malformed = |reason: String| Err(GameError::MalformedState(reason));

        if self.game_id.trim().is_empty() {
            return malformed("gameId is empty".into());
        }
        if self.players.is_empty() {
            return malformed("no players seated".into());
        }
        if self.players.len() > self.max_players {
            return malformed(format!(
                "{} players exceed maxPlayers {}",
                self.players.len(),
                self.max_players
            ));
        }
        if self.current_player_index >= self.players.len() {
            return malformed(format!(
                "currentPlayerIndex {} out of range for {} players",
                self.current_player_index,
                self.players.len()
            ));
        }
        let mut player_ids = HashSet::new();
        for player in &self.players {
            if !player_ids.insert(player.id.as_str()) {
                return malformed(format!("player id {} is seated twice", player.id));
            }
        }

        let total = self.total_cards();
        if total != DECK_SIZE {
            return malformed(format!("{total} cards in play, expected {DECK_SIZE}"));
        }
        let mut card_ids = HashSet::with_capacity(DECK_SIZE);
        let mut counts: HashMap<_, usize> = HashMap::new();
        for card in self.all_cards() {
            if !card_ids.insert(card.id.as_str()) {
                return malformed(format!("card id {} appears more than once", card.id));
            }
            *counts.entry((card.color, card.value)).or_insert(0) += 1;
        }
        if counts != deck_composition() {
            return malformed("card composition does not match a complete deck".into());
        }

        let Some(top) = self.top_card() else {
            return malformed("discard pile is empty".into());
        };
        match (top.is_wild(), self.active_color) {
            (false, Some(color)) => {
                return malformed(format!("activeColor {color} set while top card is {top}"));
            }
            (true, None) => return malformed(format!("no activeColor for top card {top}")),
            (true, Some(color)) if color.is_wild() => {
                return malformed("activeColor cannot be Wild".into());
            }
            _ => {}
        }

        match (&self.winner, self.is_game_over) {
            (Some(winner), true) => {
                let seated = self.player(&winner.id);
                if !seated.is_some_and(|p| p.hand.is_empty()) {
                    return malformed(format!("winner {} does not hold an empty hand", winner.id));
                }
            }
            (None, false) => {
                if let Some(player) = self.players.iter().find(|p| p.hand.is_empty()) {
                    return malformed(format!("{} has no cards but the game is running", player.id));
                }
            }
            (None, true) => return malformed("game is over without a winner".into()),
            (Some(_), false) => return malformed("winner set on a running game".into()),
        }
        Ok(())
    }
}
