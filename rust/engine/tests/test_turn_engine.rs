mod common;

use cardparty_engine::cards::{Color, Value};
use cardparty_engine::engine::{Engine, Move, TurnEvent, MAX_TABLE_SIZE};
use cardparty_engine::errors::GameError;
use cardparty_engine::game::Direction;
use cardparty_engine::player::Seat;
use common::{card_id, rigged};

use Color::{Blue, Green, Red, Wild, Yellow};

fn play(state: &cardparty_engine::game::GameState, player: usize, face: common::Face, color: Option<Color>) -> Move {
    Move::PlayCard {
        player_id: state.players[player].id.clone(),
        card_id: card_id(state, player, face),
        chosen_color: color,
    }
}

fn seats(n: usize) -> Vec<Seat> {
    (0..n).map(|i| Seat::human(format!("p{i}"), format!("Player {i}"))).collect()
}

#[test]
fn new_game_deals_seven_and_flips_a_non_wild() {
    for seed in 0..200u64 {
        let mut engine = Engine::new(Some(seed));
        let state = engine.new_game("g", seats(4), 4).expect("deal");
        assert!(state.players.iter().all(|p| p.hand.len() == 7), "seed {seed}");
        assert_eq!(state.discard_pile.len(), 1);
        assert!(!state.top_card().expect("top").is_wild(), "seed {seed}");
        assert_eq!(state.deck.len(), 108 - 28 - 1);
        assert_eq!(state.active_color, None);
        assert_eq!(state.direction, Direction::Clockwise);
        assert_eq!(state.current_player_index, 0);
        assert_eq!(state.turn_message, "Player 0's turn!");
        state.validate().expect("fresh game is valid");
    }
}

#[test]
fn new_game_is_deterministic_per_seed() {
    let a = Engine::new(Some(77)).new_game("g", seats(3), 4).expect("deal");
    let b = Engine::new(Some(77)).new_game("g", seats(3), 4).expect("deal");
    let c = Engine::new(Some(78)).new_game("g", seats(3), 4).expect("deal");
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn new_game_rejects_bad_table_sizes() {
    let mut engine = Engine::new(Some(1));
    assert!(matches!(
        engine.new_game("g", Vec::new(), 4),
        Err(GameError::InvalidPlayerCount { count: 0, .. })
    ));
    assert!(matches!(
        engine.new_game("g", seats(5), 4),
        Err(GameError::InvalidPlayerCount { count: 5, max: 4 })
    ));
    assert!(engine.new_game("g", seats(11), 11).is_err());
    let full = engine
        .new_game("g", seats(MAX_TABLE_SIZE), MAX_TABLE_SIZE)
        .expect("ten players fit");
    assert_eq!(full.deck.len(), 108 - 70 - 1);
}

#[test]
fn plain_card_advances_clockwise() {
    let state = rigged(&[&[(Red, Value::Five), (Blue, Value::One)], &[(Green, Value::Two)], &[(Yellow, Value::Three)]], (Red, Value::Seven), None);
    let mut engine = Engine::new(Some(1));
    let t = engine.apply(&state, &play(&state, 0, (Red, Value::Five), None)).expect("legal");
    assert_eq!(t.state.current_player_index, 1);
    assert_eq!(t.state.top_card().map(|c| (c.color, c.value)), Some((Red, Value::Five)));
    assert_eq!(t.state.players[0].hand.len(), 1);
    assert_eq!(t.state.turn_message, "Player 1's turn...");
    assert!(matches!(t.events.as_slice(), [TurnEvent::CardPlayed { .. }]));
    t.state.validate().expect("valid");
}

#[test]
fn reverse_with_two_players_returns_turn_to_mover() {
    let state = rigged(&[&[(Red, Value::Reverse), (Blue, Value::One)], &[(Green, Value::Two)]], (Red, Value::Seven), None);
    let t = Engine::new(Some(1))
        .apply(&state, &play(&state, 0, (Red, Value::Reverse), None))
        .expect("legal");
    assert_eq!(t.state.direction, Direction::Counterclockwise);
    assert_eq!(t.state.current_player_index, 0);
}

#[test]
fn reverse_with_three_players_goes_backwards() {
    let state = rigged(
        &[&[(Red, Value::Reverse), (Blue, Value::One)], &[(Green, Value::Two)], &[(Yellow, Value::Two)]],
        (Red, Value::Seven),
        None,
    );
    let t = Engine::new(Some(1))
        .apply(&state, &play(&state, 0, (Red, Value::Reverse), None))
        .expect("legal");
    assert_eq!(t.state.direction, Direction::Counterclockwise);
    assert_eq!(t.state.current_player_index, 2);
    assert!(t
        .events
        .contains(&TurnEvent::DirectionReversed { direction: Direction::Counterclockwise }));
}

#[test]
fn skip_jumps_over_next_player() {
    let state = rigged(
        &[&[(Red, Value::Skip), (Blue, Value::One)], &[(Green, Value::Two)], &[(Yellow, Value::Two)]],
        (Red, Value::Seven),
        None,
    );
    let t = Engine::new(Some(1))
        .apply(&state, &play(&state, 0, (Red, Value::Skip), None))
        .expect("legal");
    assert_eq!(t.state.current_player_index, 2);
    assert!(t.events.contains(&TurnEvent::PlayerSkipped { player_id: "p1".into() }));
    assert_eq!(t.state.turn_message, "Player 1 was skipped! Player 2's turn...");
}

#[test]
fn draw_two_penalises_and_skips_next_player() {
    let state = rigged(
        &[&[(Red, Value::DrawTwo), (Blue, Value::One)], &[(Green, Value::Two)], &[(Yellow, Value::Two)]],
        (Red, Value::Seven),
        None,
    );
    let deck_before = state.deck.len();
    let t = Engine::new(Some(1))
        .apply(&state, &play(&state, 0, (Red, Value::DrawTwo), None))
        .expect("legal");
    assert_eq!(t.state.players[1].hand.len(), 3);
    assert_eq!(t.state.deck.len(), deck_before - 2);
    assert_eq!(t.state.current_player_index, 2);
    assert_eq!(t.state.turn_message, "Player 1 drew 2 cards! Player 2's turn...");
    t.state.validate().expect("valid");
}

#[test]
fn draw_two_counterclockwise_hits_previous_seat() {
    let mut state = rigged(
        &[&[(Green, Value::Two)], &[(Red, Value::DrawTwo), (Blue, Value::One)], &[(Yellow, Value::Two)]],
        (Red, Value::Seven),
        None,
    );
    state.current_player_index = 1;
    state.direction = Direction::Counterclockwise;
    let t = Engine::new(Some(1))
        .apply(&state, &play(&state, 1, (Red, Value::DrawTwo), None))
        .expect("legal");
    assert_eq!(t.state.players[0].hand.len(), 3);
    assert_eq!(t.state.current_player_index, 2);
}

#[test]
fn wild_requires_a_color_and_sets_it() {
    let state = rigged(&[&[(Wild, Value::Wild), (Blue, Value::One)], &[(Green, Value::Two)]], (Red, Value::Seven), None);
    let mut engine = Engine::new(Some(1));

    let missing = engine.apply(&state, &play(&state, 0, (Wild, Value::Wild), None));
    assert!(matches!(missing, Err(GameError::ColorRequired { .. })));
    let wild_color = engine.apply(&state, &play(&state, 0, (Wild, Value::Wild), Some(Wild)));
    assert!(matches!(wild_color, Err(GameError::InvalidColorChoice(Wild))));

    let t = engine
        .apply(&state, &play(&state, 0, (Wild, Value::Wild), Some(Green)))
        .expect("legal");
    assert_eq!(t.state.active_color, Some(Green));
    assert_eq!(t.state.current_player_index, 1);
    t.state.validate().expect("valid");

    // the chosen color governs, and a non-Wild play clears it
    let t2 = engine
        .apply(&t.state, &play(&t.state, 1, (Green, Value::Two), None))
        .expect("green on green wild");
    assert_eq!(t2.state.active_color, None);
    t2.state.validate().expect("valid");
}

#[test]
fn draw_four_bluff_is_rejected() {
    let state = rigged(
        &[&[(Wild, Value::DrawFour), (Red, Value::One)], &[(Green, Value::Two)]],
        (Red, Value::Seven),
        None,
    );
    let err = Engine::new(Some(1))
        .apply(&state, &play(&state, 0, (Wild, Value::DrawFour), Some(Blue)))
        .unwrap_err();
    assert!(matches!(err, GameError::CardNotPlayable { .. }));
    assert!(err.is_illegal_move());
}

#[test]
fn draw_four_penalises_four_and_sets_color() {
    let state = rigged(
        &[&[(Wild, Value::DrawFour), (Blue, Value::One)], &[(Green, Value::Two)], &[(Yellow, Value::Two)]],
        (Red, Value::Seven),
        None,
    );
    let t = Engine::new(Some(1))
        .apply(&state, &play(&state, 0, (Wild, Value::DrawFour), Some(Blue)))
        .expect("legal");
    assert_eq!(t.state.players[1].hand.len(), 5);
    assert_eq!(t.state.active_color, Some(Blue));
    assert_eq!(t.state.current_player_index, 2);
}

#[test]
fn playing_last_card_wins() {
    let state = rigged(&[&[(Red, Value::Five)], &[(Green, Value::Two)]], (Red, Value::Seven), None);
    let mut engine = Engine::new(Some(1));
    let t = engine.apply(&state, &play(&state, 0, (Red, Value::Five), None)).expect("legal");
    assert!(t.state.is_game_over);
    assert_eq!(t.state.winner.as_ref().map(|w| w.id.as_str()), Some("p0"));
    assert_eq!(t.state.current_player_index, 0);
    assert_eq!(t.state.turn_message, "Player 0 wins!");
    assert!(t.events.contains(&TurnEvent::GameWon { player_id: "p0".into() }));
    t.state.validate().expect("finished game is valid");

    let after = engine.apply(&t.state, &Move::DrawCard { player_id: "p1".into() });
    assert_eq!(after, Err(GameError::GameOver));
}

#[test]
fn winning_with_draw_two_applies_no_penalty() {
    let state = rigged(&[&[(Red, Value::DrawTwo)], &[(Green, Value::Two)]], (Red, Value::Seven), None);
    let t = Engine::new(Some(1))
        .apply(&state, &play(&state, 0, (Red, Value::DrawTwo), None))
        .expect("legal");
    assert!(t.state.is_game_over);
    assert_eq!(t.state.players[1].hand.len(), 1);
}

#[test]
fn out_of_turn_and_foreign_cards_are_rejected_without_change() {
    let state = rigged(&[&[(Red, Value::Five), (Blue, Value::One)], &[(Red, Value::Two)]], (Red, Value::Seven), None);
    let snapshot = state.clone();
    let mut engine = Engine::new(Some(1));

    let wrong_turn = engine.apply(&state, &play(&state, 1, (Red, Value::Two), None));
    assert_eq!(
        wrong_turn,
        Err(GameError::NotPlayersTurn {
            expected: "p0".into(),
            actual: "p1".into()
        })
    );

    let foreign = Move::PlayCard {
        player_id: "p0".into(),
        card_id: card_id(&state, 1, (Red, Value::Two)),
        chosen_color: None,
    };
    assert!(matches!(
        engine.apply(&state, &foreign),
        Err(GameError::CardNotInHand { .. })
    ));

    let illegal = engine.apply(&state, &play(&state, 0, (Blue, Value::One), None));
    assert!(matches!(illegal, Err(GameError::CardNotPlayable { .. })));
    assert_eq!(state, snapshot);
}

#[test]
fn draw_ends_the_turn() {
    let state = rigged(&[&[(Blue, Value::One)], &[(Green, Value::Two)]], (Red, Value::Seven), None);
    let head = state.deck[0].clone();
    let t = Engine::new(Some(1))
        .apply(&state, &Move::DrawCard { player_id: "p0".into() })
        .expect("draw");
    assert_eq!(t.state.players[0].hand.last(), Some(&head));
    assert_eq!(t.state.current_player_index, 1);
    assert_eq!(t.state.turn_message, "Player 0 drew a card. Player 1's turn...");
    t.state.validate().expect("valid");
}

#[test]
fn pass_requires_an_empty_table() {
    let state = rigged(&[&[(Blue, Value::One)], &[(Green, Value::Two)]], (Red, Value::Seven), None);
    let mut engine = Engine::new(Some(1));
    assert_eq!(
        engine.apply(&state, &Move::Pass { player_id: "p0".into() }),
        Err(GameError::PassNotAllowed)
    );
}

#[test]
fn seating_a_late_player_deals_seven() {
    let mut engine = Engine::new(Some(3));
    let state = engine.new_game("g", seats(2), 3).expect("deal");
    let t = engine
        .seat_player(&state, Seat::automated("bot", "Bot"))
        .expect("room for one more");
    assert_eq!(t.state.players.len(), 3);
    assert_eq!(t.state.players[2].hand.len(), 7);
    assert!(t.state.players[2].is_automated);
    t.state.validate().expect("valid");

    assert_eq!(
        engine.seat_player(&t.state, Seat::human("late", "Late")).map(|_| ()),
        Err(GameError::GameFull { max: 3 })
    );
    assert_eq!(
        engine.seat_player(&state, Seat::human("p0", "Again")).map(|_| ()),
        Err(GameError::AlreadySeated("p0".into()))
    );
}
