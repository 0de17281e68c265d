//! # cardparty-ai: Automated Opponents
//!
//! Decision sources for automated seats. An opponent only ever sees the
//! plain-text [`OpponentRequest`] view of a game and answers with an
//! [`OpponentResponse`]; the engine re-validates every answer before applying
//! it, so an opponent can be wrong without breaking the game.
//!
//! ## Core Components
//!
//! - [`AIOpponent`] - Trait every decision source implements
//! - [`baseline`] - First-match strategy
//! - [`random`] - Uniformly random legal-looking strategy
//! - [`create_ai`] - Factory resolving a strategy name
//!
//! ## Quick Start
//!
//! ```rust
//! use cardparty_ai::{create_ai, AIOpponent};
//! use cardparty_engine::engine::Engine;
//! use cardparty_engine::opponent::{resolve_proposal, OpponentRequest};
//! use cardparty_engine::player::Seat;
//!
//! let mut engine = Engine::new(Some(42));
//! let state = engine
//!     .new_game("demo", vec![Seat::automated("bot", "Bot"), Seat::human("p1", "Ada")], 4)
//!     .expect("deal");
//!
//! let ai = create_ai("baseline").expect("known strategy");
//! let request = OpponentRequest::from_state(&state).expect("request");
//! let proposal = ai.propose(&request);
//! let mv = resolve_proposal(&state, &proposal, engine.rng_mut()).expect("resolve");
//! assert_eq!(mv.player_id(), "bot");
//! ```

use cardparty_engine::cards::{parse_label, Color, Value};
use cardparty_engine::opponent::{OpponentRequest, OpponentResponse};

pub mod baseline;
pub mod random;

/// Strategy names accepted by [`create_ai`].
pub const STRATEGIES: [&str; 2] = ["baseline", "random"];

/// A source of moves for an automated seat.
///
/// # Example Implementation
///
/// ```rust
/// use cardparty_ai::AIOpponent;
/// use cardparty_engine::opponent::{OpponentRequest, OpponentResponse};
///
/// struct AlwaysDraw;
///
/// impl AIOpponent for AlwaysDraw {
///     fn propose(&self, _request: &OpponentRequest) -> OpponentResponse {
///         OpponentResponse::draw()
///     }
///
///     fn name(&self) -> &str {
///         "AlwaysDraw"
///     }
/// }
/// ```
pub trait AIOpponent: Send + Sync {
    /// Proposes a move for the player described by `request`. The proposal is
    /// untrusted and may name a card that turns out not to be playable.
    fn propose(&self, request: &OpponentRequest) -> OpponentResponse;

    fn name(&self) -> &str;
}

/// Creates the opponent registered under `ai_type`, or `None` for an
/// unknown name.
///
/// ```rust
/// use cardparty_ai::create_ai;
///
/// assert_eq!(create_ai("baseline").map(|ai| ai.name().to_string()), Some("BaselineAI".into()));
/// assert!(create_ai("oracle").is_none());
/// ```
pub fn create_ai(ai_type: &str) -> Option<Box<dyn AIOpponent>> {
    match ai_type.trim().to_ascii_lowercase().as_str() {
        "baseline" => Some(Box::new(baseline::BaselineAI::new())),
        "random" => Some(Box::new(random::RandomAI::new(None))),
        _ => None,
    }
}

/// A hand card as the opponent sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Face<'a> {
    pub label: &'a str,
    pub color: Color,
    pub value: Value,
}

/// Parses every readable label in the request's hand, in hand order.
pub(crate) fn faces(request: &OpponentRequest) -> Vec<Face<'_>> {
    request
        .hand
        .iter()
        .filter_map(|label| {
            parse_label(label).map(|(color, value)| Face {
                label: label.as_str(),
                color,
                value,
            })
        })
        .collect()
}

/// Whether `face` matches the top card by color (or the active color after a
/// Wild) or by value. Wild cards are not considered here.
pub(crate) fn matches_top(face: &Face<'_>, request: &OpponentRequest) -> bool {
    if face.color.is_wild() {
        return false;
    }
    let Some((top_color, top_value)) = parse_label(&request.top_card) else {
        return false;
    };
    let color = request.active_color.unwrap_or(top_color);
    face.color == color || (!top_color.is_wild() && face.value == top_value)
}

/// Whether the hand still holds a card of the color in force, which rules
/// out a Wild Draw Four.
pub(crate) fn holds_color_in_force(hand: &[Face<'_>], request: &OpponentRequest) -> bool {
    let Some((top_color, _)) = parse_label(&request.top_card) else {
        return false;
    };
    let color = request.active_color.unwrap_or(top_color);
    hand.iter().any(|face| !face.color.is_wild() && face.color == color)
}
