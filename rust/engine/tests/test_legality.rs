use cardparty_engine::cards::{Card, Color, Value};
use cardparty_engine::rules::can_play;

fn card(id: &str, color: Color, value: Value) -> Card {
    Card::new(id, color, value)
}

#[test]
fn matching_color_is_legal() {
    let top = card("t", Color::Red, Value::Seven);
    assert!(can_play(&card("a", Color::Red, Value::Five), &top, None, &[]));
}

#[test]
fn mismatched_color_and_value_is_illegal() {
    let top = card("t", Color::Red, Value::Seven);
    assert!(!can_play(&card("a", Color::Blue, Value::Five), &top, None, &[]));
}

#[test]
fn draw_four_blocked_by_matching_color_in_hand() {
    let top = card("t", Color::Red, Value::Seven);
    let draw_four = card("w", Color::Wild, Value::DrawFour);
    let hand = vec![card("r", Color::Red, Value::One), draw_four.clone()];
    assert!(!can_play(&draw_four, &top, None, &hand));
}

#[test]
fn draw_four_allowed_without_matching_color() {
    let top = card("t", Color::Red, Value::Seven);
    let draw_four = card("w", Color::Wild, Value::DrawFour);
    // a matching value does not count against the Draw Four
    let hand = vec![card("b", Color::Blue, Value::Seven), draw_four.clone()];
    assert!(can_play(&draw_four, &top, None, &hand));
}

#[test]
fn active_color_governs_after_wild() {
    let top = card("t", Color::Wild, Value::Wild);
    let yellow = card("y", Color::Yellow, Value::Two);
    assert!(can_play(&yellow, &top, Some(Color::Yellow), &[]));
    assert!(!can_play(&yellow, &top, Some(Color::Green), &[]));
}
