#![allow(dead_code)]

use cardparty_engine::cards::{build_deck, Card, Color, Value};
use cardparty_engine::game::{Direction, GameState};
use cardparty_engine::player::Player;

pub type Face = (Color, Value);

/// Builds a running game with the given hands and top card. Every remaining
/// card of a full deck goes to the draw pile, so the record is conserved.
pub fn rigged(hands: &[&[Face]], top: Face, active_color: Option<Color>) -> GameState {
    let mut pool = build_deck();
    let mut players = Vec::new();
    for (i, faces) in hands.iter().enumerate() {
        let mut player = Player::new(format!("p{i}"), format!("Player {i}"), false);
        for &(color, value) in faces.iter() {
            player.hand.push(take(&mut pool, color, value));
        }
        players.push(player);
    }
    let top = take(&mut pool, top.0, top.1);
    GameState {
        game_id: "test-game".into(),
        max_players: players.len().max(4),
        players,
        deck: pool,
        discard_pile: vec![top],
        current_player_index: 0,
        direction: Direction::Clockwise,
        is_game_over: false,
        winner: None,
        active_color,
        turn_message: String::new(),
        version: 0,
    }
}

pub fn take(pool: &mut Vec<Card>, color: Color, value: Value) -> Card {
    let pos = pool
        .iter()
        .position(|c| c.color == color && c.value == value)
        .unwrap_or_else(|| panic!("no {color} {value} left in pool"));
    pool.remove(pos)
}

/// Moves the whole draw pile under the top card of the discard pile.
pub fn exhaust_deck(state: &mut GameState) {
    let top = state.discard_pile.pop().expect("top card");
    state.discard_pile.append(&mut state.deck);
    state.discard_pile.push(top);
}

/// Moves the whole draw pile into the hand of player `index`.
pub fn deck_into_hand(state: &mut GameState, index: usize) {
    let mut cards = std::mem::take(&mut state.deck);
    state.players[index].hand.append(&mut cards);
}

pub fn card_id(state: &GameState, player: usize, face: Face) -> String {
    state.players[player]
        .hand
        .iter()
        .find(|c| c.color == face.0 && c.value == face.1)
        .map(|c| c.id.clone())
        .unwrap_or_else(|| panic!("player {player} holds no {} {}", face.0, face.1))
}
