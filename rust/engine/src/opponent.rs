//! The boundary to automated-opponent decision sources.
//!
//! A decision source sees only the plain-text view in [`OpponentRequest`] and
//! answers with an [`OpponentResponse`]. Responses are untrusted: they go
//! through [`resolve_proposal`], which re-checks them against the real hand
//! and the legality rules before anything is applied.

use crate::cards::{Color, PLAYABLE_COLORS};
use crate::engine::Move;
use crate::errors::GameError;
use crate::game::{Direction, GameState};
use crate::rules::can_play;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpponentRequest {
    /// "Color Value" labels of the cards in hand.
    pub hand: Vec<String>,
    pub top_card: String,
    pub current_player: String,
    pub direction: Direction,
    /// Color named for a Wild top card.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_color: Option<Color>,
}

impl OpponentRequest {
    /// View of `state` for whoever holds the turn.
    pub fn from_state(state: &GameState) -> Result<Self, GameError> {
        let player = state
            .current_player()
            .ok_or_else(|| GameError::MalformedState("no player at currentPlayerIndex".into()))?;
        let top = state
            .top_card()
            .ok_or_else(|| GameError::MalformedState("discard pile is empty".into()))?;
        Ok(Self {
            hand: player.hand.iter().map(|c| c.label()).collect(),
            top_card: top.label(),
            current_player: player.name.clone(),
            direction: state.direction,
            active_color: state.active_color,
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpponentAction {
    Play,
    Draw,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpponentResponse {
    pub action: OpponentAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_to_play: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chosen_color: Option<Color>,
}

impl OpponentResponse {
    pub fn draw() -> Self {
        Self {
            action: OpponentAction::Draw,
            card_to_play: None,
            chosen_color: None,
        }
    }

    pub fn play(label: impl Into<String>, chosen_color: Option<Color>) -> Self {
        Self {
            action: OpponentAction::Play,
            card_to_play: Some(label.into()),
            chosen_color,
        }
    }
}

/// Turns a proposal into a move for the current player.
///
/// A `play` proposal survives only if the named card is really in the hand
/// and [`can_play`] accepts it; anything else becomes a draw. Wild cards take
/// the proposed color when it is a playable one, otherwise a random one.
pub fn resolve_proposal<R: Rng + ?Sized>(
    state: &GameState,
    response: &OpponentResponse,
    rng: &mut R,
) -> Result<Move, GameError> {
    let player = state
        .current_player()
        .ok_or_else(|| GameError::MalformedState("no player at currentPlayerIndex".into()))?;
    let top = state
        .top_card()
        .ok_or_else(|| GameError::MalformedState("discard pile is empty".into()))?;
    let draw = Move::DrawCard {
        player_id: player.id.clone(),
    };

    let (OpponentAction::Play, Some(label)) = (response.action, response.card_to_play.as_deref()) else {
        return Ok(draw);
    };
    let Some(card) = player
        .hand
        .iter()
        .find(|c| c.matches_label(label) && can_play(c, top, state.active_color, &player.hand))
    else {
        return Ok(draw);
    };

    let chosen_color = if card.is_wild() {
        match response.chosen_color {
            Some(color) if !color.is_wild() => Some(color),
            _ => PLAYABLE_COLORS.choose(rng).copied(),
        }
    } else {
        None
    };
    Ok(Move::PlayCard {
        player_id: player.id.clone(),
        card_id: card.id.clone(),
        chosen_color,
    })
}
