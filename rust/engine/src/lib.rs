//! # cardparty-engine: Rules Engine for a Shared Card Game
//!
//! Deck construction, legality checks and the turn state machine for an
//! UNO-style game whose state lives in one shared, replicated record.
//! Every transition takes a [`game::GameState`] and hands back its successor,
//! so any number of clients can compute moves against the same record.
//!
//! ## Core Modules
//!
//! - [`cards`] - Colors, values, cards and the 108-card deck
//! - [`deck`] - Fisher-Yates shuffling with a seeded ChaCha20 RNG
//! - [`rules`] - Legality checking (the single source of truth)
//! - [`game`] - The shared game record, turn direction and invariant checks
//! - [`engine`] - Dealing, seating and move application
//! - [`recovery`] - Rebuilding the draw pile from the discard pile
//! - [`opponent`] - Request/response contract for automated opponents
//! - [`player`] - Player records and seats
//! - [`logger`] - JSONL move journal
//! - [`errors`] - Error types for game operations
//!
//! ## Quick Start
//!
//! ```rust
//! use cardparty_engine::engine::{Engine, Move};
//! use cardparty_engine::player::Seat;
//!
//! let mut engine = Engine::new(Some(42));
//! let state = engine
//!     .new_game("table-1", vec![Seat::human("p1", "Ada"), Seat::automated("p2", "Bot")], 4)
//!     .expect("deal");
//!
//! // every player starts with seven cards and the top card is never Wild
//! assert!(state.players.iter().all(|p| p.hand.len() == 7));
//! assert!(!state.top_card().expect("top card").is_wild());
//!
//! let next = engine
//!     .apply(&state, &Move::DrawCard { player_id: "p1".into() })
//!     .expect("draw");
//! assert_eq!(next.state.current_player_index, 1);
//! ```
//!
//! ## Deterministic Gameplay
//!
//! All shuffles are reproducible from the engine seed:
//!
//! ```rust
//! use cardparty_engine::engine::Engine;
//! use cardparty_engine::player::Seat;
//!
//! let seats = || vec![Seat::human("a", "A"), Seat::human("b", "B")];
//! let g1 = Engine::new(Some(9)).new_game("g", seats(), 2).expect("deal");
//! let g2 = Engine::new(Some(9)).new_game("g", seats(), 2).expect("deal");
//! assert_eq!(g1, g2);
//! ```

pub mod cards;
pub mod deck;
pub mod engine;
pub mod errors;
pub mod game;
pub mod logger;
pub mod opponent;
pub mod player;
pub mod recovery;
pub mod rules;
