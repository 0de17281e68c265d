mod common;

use cardparty_engine::cards::{Color, Value, PLAYABLE_COLORS};
use cardparty_engine::engine::Move;
use cardparty_engine::game::Direction;
use cardparty_engine::opponent::{resolve_proposal, OpponentAction, OpponentRequest, OpponentResponse};
use common::{card_id, rigged};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use Color::{Blue, Green, Red, Wild};

fn rng() -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(11)
}

#[test]
fn request_shows_labels_only() {
    let state = rigged(&[&[(Red, Value::Five), (Wild, Value::DrawFour)], &[(Green, Value::Two)]], (Blue, Value::Skip), None);
    let request = OpponentRequest::from_state(&state).expect("running game");
    assert_eq!(request.hand, vec!["Red 5", "Wild Draw Four"]);
    assert_eq!(request.top_card, "Blue Skip");
    assert_eq!(request.current_player, "Player 0");
    assert_eq!(request.direction, Direction::Clockwise);

    let json = serde_json::to_value(&request).expect("serialize");
    assert_eq!(json["topCard"], "Blue Skip");
    assert_eq!(json["currentPlayer"], "Player 0");
}

#[test]
fn response_parses_from_wire_format() {
    let response: OpponentResponse =
        serde_json::from_str(r#"{"action":"play","cardToPlay":"Red 5"}"#).expect("parse");
    assert_eq!(response.action, OpponentAction::Play);
    assert_eq!(response.card_to_play.as_deref(), Some("Red 5"));

    let draw: OpponentResponse = serde_json::from_str(r#"{"action":"draw"}"#).expect("parse");
    assert_eq!(draw, OpponentResponse::draw());
}

#[test]
fn legal_proposal_becomes_play() {
    let state = rigged(&[&[(Red, Value::Five), (Blue, Value::One)], &[(Green, Value::Two)]], (Red, Value::Seven), None);
    let mv = resolve_proposal(&state, &OpponentResponse::play("red 5", None), &mut rng()).expect("resolve");
    assert_eq!(
        mv,
        Move::PlayCard {
            player_id: "p0".into(),
            card_id: card_id(&state, 0, (Red, Value::Five)),
            chosen_color: None,
        }
    );
}

#[test]
fn illegal_or_unknown_proposals_become_draws() {
    let state = rigged(&[&[(Red, Value::Five), (Blue, Value::One)], &[(Green, Value::Two)]], (Red, Value::Seven), None);
    let draw = Move::DrawCard { player_id: "p0".into() };
    for label in ["Blue 1", "Green 9", "Wild Wild", ""] {
        let mv = resolve_proposal(&state, &OpponentResponse::play(label, None), &mut rng()).expect("resolve");
        assert_eq!(mv, draw, "proposal {label:?}");
    }
    let missing_card = OpponentResponse {
        action: OpponentAction::Play,
        card_to_play: None,
        chosen_color: None,
    };
    assert_eq!(resolve_proposal(&state, &missing_card, &mut rng()).expect("resolve"), draw);
    assert_eq!(resolve_proposal(&state, &OpponentResponse::draw(), &mut rng()).expect("resolve"), draw);
}

#[test]
fn wild_proposal_keeps_or_picks_a_color() {
    let state = rigged(&[&[(Wild, Value::Wild), (Blue, Value::One)], &[(Green, Value::Two)]], (Red, Value::Seven), None);

    let mv = resolve_proposal(&state, &OpponentResponse::play("Wild Wild", Some(Green)), &mut rng()).expect("resolve");
    assert!(matches!(mv, Move::PlayCard { chosen_color: Some(Green), .. }));

    for proposed in [None, Some(Wild)] {
        let mv = resolve_proposal(&state, &OpponentResponse::play("Wild Wild", proposed), &mut rng()).expect("resolve");
        let Move::PlayCard { chosen_color: Some(color), .. } = mv else {
            panic!("expected a wild play with a color, got {mv:?}");
        };
        assert!(PLAYABLE_COLORS.contains(&color));
    }
}

#[test]
fn bluffed_draw_four_proposal_becomes_draw() {
    let state = rigged(&[&[(Wild, Value::DrawFour), (Red, Value::One)], &[(Green, Value::Two)]], (Red, Value::Seven), None);
    let mv = resolve_proposal(&state, &OpponentResponse::play("Wild Draw Four", Some(Blue)), &mut rng()).expect("resolve");
    assert_eq!(mv, Move::DrawCard { player_id: "p0".into() });
}
