//! First-match strategy.
//!
//! Plays the first hand card that matches the top card by color or value.
//! With no match it falls back to a Wild (plain Wild before Draw Four) and
//! names the color it holds most of; with nothing at all it draws.

use crate::{faces, matches_top, AIOpponent, Face};
use cardparty_engine::cards::{Color, Value, PLAYABLE_COLORS};
use cardparty_engine::opponent::{OpponentRequest, OpponentResponse};

/// Deterministic opponent: the same request always yields the same answer.
///
/// ```rust
/// use cardparty_ai::baseline::BaselineAI;
/// use cardparty_ai::AIOpponent;
/// use cardparty_engine::game::Direction;
/// use cardparty_engine::opponent::{OpponentAction, OpponentRequest};
///
/// let request = OpponentRequest {
///     hand: vec!["Blue 3".into(), "Red 9".into()],
///     top_card: "Red 7".into(),
///     current_player: "Bot".into(),
///     direction: Direction::Clockwise,
///     active_color: None,
/// };
/// let answer = BaselineAI::new().propose(&request);
/// assert_eq!(answer.action, OpponentAction::Play);
/// assert_eq!(answer.card_to_play.as_deref(), Some("Red 9"));
/// ```
#[derive(Debug, Clone)]
pub struct BaselineAI;

impl BaselineAI {
    pub fn new() -> Self {
        Self
    }

    /// Color held most often among non-Wild cards; ties go to the earlier
    /// color in [`PLAYABLE_COLORS`] order, an empty hand to Red.
    fn favourite_color(hand: &[Face<'_>]) -> Color {
        let mut best = (Color::Red, 0usize);
        for color in PLAYABLE_COLORS {
            let held = hand.iter().filter(|f| f.color == color).count();
            if held > best.1 {
                best = (color, held);
            }
        }
        best.0
    }
}

impl Default for BaselineAI {
    fn default() -> Self {
        Self::new()
    }
}

impl AIOpponent for BaselineAI {
    fn propose(&self, request: &OpponentRequest) -> OpponentResponse {
        let hand = faces(request);

        if let Some(face) = hand.iter().find(|f| matches_top(f, request)) {
            return OpponentResponse::play(face.label, None);
        }

        let wild = hand
            .iter()
            .find(|f| f.value == Value::Wild)
            .or_else(|| hand.iter().find(|f| f.value == Value::DrawFour));
        match wild {
            Some(face) => OpponentResponse::play(face.label, Some(Self::favourite_color(&hand))),
            None => OpponentResponse::draw(),
        }
    }

    fn name(&self) -> &str {
        "BaselineAI"
    }
}
