use crate::cards::Card;
use serde::{Deserialize, Serialize};

/// Number of cards each player receives when seated.
pub const STARTING_HAND: usize = 7;

/// A seated player. The hand is owned exclusively by this record; a card id
/// never appears in two hands at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub hand: Vec<Card>,
    #[serde(default)]
    pub is_automated: bool,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>, is_automated: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            hand: Vec::with_capacity(STARTING_HAND),
            is_automated,
        }
    }

    pub fn holds(&self, card_id: &str) -> bool {
        self.hand.iter().any(|c| c.id == card_id)
    }

    /// Removes and returns the card with `card_id`, keeping the order of the
    /// remaining cards stable for rendering.
    pub fn take_card(&mut self, card_id: &str) -> Option<Card> {
        let pos = self.hand.iter().position(|c| c.id == card_id)?;
        Some(self.hand.remove(pos))
    }
}

/// Who to seat at a table: the engine deals the cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_automated: bool,
}

impl Seat {
    pub fn human(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_automated: false,
        }
    }

    pub fn automated(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_automated: true,
        }
    }

    pub(crate) fn into_player(self) -> Player {
        Player::new(self.id, self.name, self.is_automated)
    }
}
