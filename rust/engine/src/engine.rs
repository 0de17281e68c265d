use crate::cards::{build_deck, Card, Color, Value};
use crate::deck::Shuffler;
use crate::errors::GameError;
use crate::game::{Direction, GameState};
use crate::player::{Player, Seat, STARTING_HAND};
use crate::recovery::{can_draw, replenish_deck};
use crate::rules::{can_play, playable_cards, validate_color_choice};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

/// Largest table the engine will deal for.
pub const MAX_TABLE_SIZE: usize = 10;

/// A move submitted by the player whose turn it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Move {
    /// Play `card_id` from hand. Wild cards need `chosen_color`.
    PlayCard {
        player_id: String,
        card_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        chosen_color: Option<Color>,
    },
    /// Take the head of the draw pile. Drawing ends the turn.
    DrawCard { player_id: String },
    /// Give up the turn; only accepted when nothing can be drawn.
    Pass { player_id: String },
}

impl Move {
    pub fn player_id(&self) -> &str {
        match self {
            Move::PlayCard { player_id, .. }
            | Move::DrawCard { player_id }
            | Move::Pass { player_id } => player_id,
        }
    }
}

/// Side effects of a single transition, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum TurnEvent {
    CardPlayed {
        player_id: String,
        card: Card,
        chosen_color: Option<Color>,
    },
    CardsDrawn { player_id: String, count: usize },
    DirectionReversed { direction: Direction },
    PlayerSkipped { player_id: String },
    DeckReshuffled { cards: usize },
    TurnPassed { player_id: String },
    GameWon { player_id: String },
}

/// Successor state plus what happened on the way there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: GameState,
    pub events: Vec<TurnEvent>,
}

/// The turn engine. Owns the randomness used for dealing and reshuffling;
/// game records themselves are plain data passed in and handed back.
///
/// # Examples
///
/// ```
/// use cardparty_engine::engine::{Engine, Move};
/// use cardparty_engine::player::Seat;
///
/// let mut engine = Engine::new(Some(7));
/// let state = engine
///     .new_game("demo", vec![Seat::human("p1", "Ada"), Seat::human("p2", "Lin")], 4)
///     .expect("deal");
/// assert_eq!(state.total_cards(), 108);
///
/// let next = engine
///     .apply(&state, &Move::DrawCard { player_id: "p1".into() })
///     .expect("draw");
/// assert_eq!(next.state.players[0].hand.len(), 8);
/// assert_eq!(next.state.current_player_index, 1);
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    shuffler: Shuffler,
}

impl Engine {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            shuffler: Shuffler::new(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.shuffler.seed()
    }

    pub fn rng_mut(&mut self) -> &mut ChaCha20Rng {
        self.shuffler.rng_mut()
    }

    /// Shuffles a fresh deck, deals each seat a starting hand in seating
    /// order and flips the first non-Wild card onto the discard pile.
    pub fn new_game(
        &mut self,
        game_id: impl Into<String>,
        seats: Vec<Seat>,
        max_players: usize,
    ) -> Result<GameState, GameError> {
        let count = seats.len();
        if count == 0 || count > max_players || max_players > MAX_TABLE_SIZE {
            return Err(GameError::InvalidPlayerCount {
                count,
                max: max_players.min(MAX_TABLE_SIZE),
            });
        }

        let mut deck = build_deck();
        self.shuffler.shuffle(&mut deck);

        let mut players: Vec<Player> = seats.into_iter().map(Seat::into_player).collect();
        for player in &mut players {
            player.hand = deck.drain(..STARTING_HAND).collect();
        }

        let mut flipped_wilds = Vec::new();
        let top = loop {
            if deck.is_empty() {
                return Err(GameError::NoCardsAvailable);
            }
            let card = deck.remove(0);
            if card.is_wild() {
                flipped_wilds.push(card);
            } else {
                break card;
            }
        };
        if !flipped_wilds.is_empty() {
            deck.extend(flipped_wilds);
            self.shuffler.shuffle(&mut deck);
        }

        let turn_message = format!("{}'s turn!", players[0].name);
        Ok(GameState {
            game_id: game_id.into(),
            players,
            deck,
            discard_pile: vec![top],
            current_player_index: 0,
            direction: Direction::Clockwise,
            is_game_over: false,
            winner: None,
            active_color: None,
            turn_message,
            max_players,
            version: 0,
        })
    }

    /// Seats a late arrival at the end of the seating order and deals them a
    /// starting hand.
    pub fn seat_player(&mut self, state: &GameState, seat: Seat) -> Result<Transition, GameError> {
        if state.is_game_over {
            return Err(GameError::GameOver);
        }
        if state.players.len() >= state.max_players {
            return Err(GameError::GameFull {
                max: state.max_players,
            });
        }
        if state.player(&seat.id).is_some() {
            return Err(GameError::AlreadySeated(seat.id));
        }

        let mut next = state.clone();
        let mut events = Vec::new();
        let mut player = seat.into_player();
        while player.hand.len() < STARTING_HAND {
            match self.take_card(&mut next, &mut events) {
                Ok(card) => player.hand.push(card),
                Err(GameError::NoCardsAvailable) => break,
                Err(err) => return Err(err),
            }
        }
        if player.hand.is_empty() {
            return Err(GameError::NoCardsAvailable);
        }
        events.push(TurnEvent::CardsDrawn {
            player_id: player.id.clone(),
            count: player.hand.len(),
        });
        next.players.push(player);
        Ok(Transition {
            state: next,
            events,
        })
    }

    /// Applies one move by the current player and returns the successor.
    /// `state` itself is never modified; on error nothing has happened.
    pub fn apply(&mut self, state: &GameState, mv: &Move) -> Result<Transition, GameError> {
        if state.is_game_over {
            return Err(GameError::GameOver);
        }
        let current = state
            .current_player()
            .ok_or_else(|| GameError::MalformedState("no player at currentPlayerIndex".into()))?;
        if current.id != mv.player_id() {
            return Err(GameError::NotPlayersTurn {
                expected: current.id.clone(),
                actual: mv.player_id().to_string(),
            });
        }

        let mut next = state.clone();
        let mut events = Vec::new();
        match mv {
            Move::PlayCard {
                card_id,
                chosen_color,
                ..
            } => self.play_card(&mut next, card_id, *chosen_color, &mut events)?,
            Move::DrawCard { .. } => self.draw_card(&mut next, &mut events)?,
            Move::Pass { .. } => Self::pass(&mut next, &mut events)?,
        }
        Ok(Transition {
            state: next,
            events,
        })
    }

    fn play_card(
        &mut self,
        state: &mut GameState,
        card_id: &str,
        chosen_color: Option<Color>,
        events: &mut Vec<TurnEvent>,
    ) -> Result<(), GameError> {
        let mover = state.current_player_index;
        let top = state
            .top_card()
            .cloned()
            .ok_or_else(|| GameError::MalformedState("discard pile is empty".into()))?;

        let player_id = state.players[mover].id.clone();
        let not_in_hand = || GameError::CardNotInHand {
            player_id: player_id.clone(),
            card_id: card_id.to_string(),
        };
        let active_color = {
            let hand = &state.players[mover].hand;
            let card = hand.iter().find(|c| c.id == card_id).ok_or_else(not_in_hand)?;
            if !can_play(card, &top, state.active_color, hand) {
                return Err(GameError::CardNotPlayable {
                    card: card.label(),
                    top: top.label(),
                });
            }
            validate_color_choice(card, chosen_color)?
        };
        let card = state.players[mover]
            .take_card(card_id)
            .ok_or_else(not_in_hand)?;

        let value = card.value;
        state.discard_pile.push(card.clone());
        state.active_color = active_color;
        events.push(TurnEvent::CardPlayed {
            player_id: player_id.clone(),
            card,
            chosen_color: active_color,
        });

        if state.players[mover].hand.is_empty() {
            state.is_game_over = true;
            state.winner = Some(state.players[mover].clone());
            state.turn_message = format!("{} wins!", state.players[mover].name);
            events.push(TurnEvent::GameWon { player_id });
            return Ok(());
        }

        let mut from = mover;
        let mut notice = None;
        match value {
            Value::Reverse => {
                state.direction = state.direction.reversed();
                events.push(TurnEvent::DirectionReversed {
                    direction: state.direction,
                });
                // heads-up: reversing hands the turn straight back to the mover
                if state.players.len() == 2 {
                    from = state.next_index(from);
                }
            }
            Value::Skip => {
                from = state.next_index(from);
                events.push(TurnEvent::PlayerSkipped {
                    player_id: state.players[from].id.clone(),
                });
                notice = Some(format!("{} was skipped!", state.players[from].name));
            }
            Value::DrawTwo | Value::DrawFour => {
                from = state.next_index(from);
                let drawn = self.penalty_draw(state, from, value.draw_penalty(), events);
                events.push(TurnEvent::PlayerSkipped {
                    player_id: state.players[from].id.clone(),
                });
                let noun = if drawn == 1 { "card" } else { "cards" };
                notice = Some(format!("{} drew {drawn} {noun}!", state.players[from].name));
            }
            _ => {}
        }

        state.current_player_index = state.next_index(from);
        state.turn_message = Self::turn_message(state, notice);
        Ok(())
    }

    fn draw_card(&mut self, state: &mut GameState, events: &mut Vec<TurnEvent>) -> Result<(), GameError> {
        let card = self.take_card(state, events)?;
        let mover = state.current_player_index;
        state.players[mover].hand.push(card);
        events.push(TurnEvent::CardsDrawn {
            player_id: state.players[mover].id.clone(),
            count: 1,
        });
        let notice = format!("{} drew a card.", state.players[mover].name);
        state.current_player_index = state.next_index(mover);
        state.turn_message = Self::turn_message(state, Some(notice));
        Ok(())
    }

    fn pass(state: &mut GameState, events: &mut Vec<TurnEvent>) -> Result<(), GameError> {
        if can_draw(state) {
            return Err(GameError::PassNotAllowed);
        }
        let mover = state.current_player_index;
        events.push(TurnEvent::TurnPassed {
            player_id: state.players[mover].id.clone(),
        });
        let notice = format!("{} passed.", state.players[mover].name);
        state.current_player_index = state.next_index(mover);
        state.turn_message = Self::turn_message(state, Some(notice));
        Ok(())
    }

    /// Gives up to `count` cards to the player at `victim`, stopping early if
    /// the table runs out of cards. Returns how many were handed over.
    fn penalty_draw(
        &mut self,
        state: &mut GameState,
        victim: usize,
        count: usize,
        events: &mut Vec<TurnEvent>,
    ) -> usize {
        let mut drawn = 0;
        while drawn < count {
            match self.take_card(state, events) {
                Ok(card) => {
                    state.players[victim].hand.push(card);
                    drawn += 1;
                }
                Err(_) => break,
            }
        }
        events.push(TurnEvent::CardsDrawn {
            player_id: state.players[victim].id.clone(),
            count: drawn,
        });
        drawn
    }

    /// Pops the head of the draw pile, reclaiming the discard pile first
    /// when the draw pile is empty.
    fn take_card(&mut self, state: &mut GameState, events: &mut Vec<TurnEvent>) -> Result<Card, GameError> {
        if state.deck.is_empty() {
            let reclaimed = replenish_deck(state, self.shuffler.rng_mut())?;
            events.push(TurnEvent::DeckReshuffled { cards: reclaimed });
        }
        if state.deck.is_empty() {
            return Err(GameError::NoCardsAvailable);
        }
        Ok(state.deck.remove(0))
    }

    fn turn_message(state: &GameState, notice: Option<String>) -> String {
        let next = &state.players[state.current_player_index].name;
        match notice {
            Some(notice) => format!("{notice} {next}'s turn..."),
            None => format!("{next}'s turn..."),
        }
    }
}

/// Ids of the cards `player_id` could legally play right now. Empty when it
/// is not that player's turn or the game is over.
pub fn legal_card_ids(state: &GameState, player_id: &str) -> Vec<String> {
    let Some(top) = state.top_card() else {
        return Vec::new();
    };
    match state.current_player() {
        Some(current) if current.id == player_id && !state.is_game_over => {
            playable_cards(&current.hand, top, state.active_color)
                .into_iter()
                .map(|c| c.id.clone())
                .collect()
        }
        _ => Vec::new(),
    }
}
