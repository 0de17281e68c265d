use crate::cards::{Card, Color, Value};
use crate::errors::GameError;

/// Decides whether `card` may be played on `top`.
///
/// A plain Wild is always legal. A Wild Draw Four is legal only when `hand`
/// holds no card of the color currently in force (`active_color` if a Wild
/// set one, otherwise the top card's color). Any other card must match the
/// active color when one is set, or else the top card's color or value.
///
/// # Examples
///
/// ```
/// use cardparty_engine::cards::{Card, Color, Value};
/// use cardparty_engine::rules::can_play;
///
/// let top = Card::new("t", Color::Red, Value::Seven);
/// let red_five = Card::new("a", Color::Red, Value::Five);
/// let blue_five = Card::new("b", Color::Blue, Value::Five);
///
/// assert!(can_play(&red_five, &top, None, &[]));
/// assert!(!can_play(&blue_five, &top, None, &[]));
/// ```
///
/// ```
/// use cardparty_engine::cards::{Card, Color, Value};
/// use cardparty_engine::rules::can_play;
///
/// let top = Card::new("t", Color::Red, Value::Seven);
/// let draw_four = Card::new("w", Color::Wild, Value::DrawFour);
/// let red_two = Card::new("r", Color::Red, Value::Two);
/// let green_two = Card::new("g", Color::Green, Value::Two);
///
/// assert!(!can_play(&draw_four, &top, None, &[red_two, draw_four.clone()]));
/// assert!(can_play(&draw_four, &top, None, &[green_two, draw_four.clone()]));
/// ```
pub fn can_play(card: &Card, top: &Card, active_color: Option<Color>, hand: &[Card]) -> bool {
    if card.is_wild() {
        if card.value == Value::DrawFour {
            let in_force = active_color.unwrap_or(top.color);
            return !hand.iter().any(|c| c.color == in_force);
        }
        return true;
    }
    match active_color {
        Some(color) => card.color == color,
        None => card.color == top.color || card.value == top.value,
    }
}

/// Cards from `hand` that [`can_play`] accepts, in hand order.
pub fn playable_cards<'a>(hand: &'a [Card], top: &Card, active_color: Option<Color>) -> Vec<&'a Card> {
    hand.iter()
        .filter(|card| can_play(card, top, active_color, hand))
        .collect()
}

/// Resolves the color a play puts in force. Wild cards need a playable color;
/// any color supplied with a regular card is ignored.
pub fn validate_color_choice(card: &Card, chosen: Option<Color>) -> Result<Option<Color>, GameError> {
    if !card.is_wild() {
        return Ok(None);
    }
    match chosen {
        None => Err(GameError::ColorRequired { card: card.label() }),
        Some(Color::Wild) => Err(GameError::InvalidColorChoice(Color::Wild)),
        Some(color) => Ok(Some(color)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(color: Color, value: Value) -> Card {
        Card::new(format!("{color}-{value}"), color, value)
    }

    #[test]
    fn active_color_overrides_top_card() {
        let top = card(Color::Wild, Value::Wild);
        let green = card(Color::Green, Value::Three);
        let blue = card(Color::Blue, Value::Wild);
        assert!(can_play(&green, &top, Some(Color::Green), &[]));
        assert!(!can_play(&card(Color::Red, Value::Three), &top, Some(Color::Green), &[]));
        // matching the Wild's value does not help once a color is in force
        assert!(!can_play(&blue, &top, Some(Color::Green), &[]));
    }

    #[test]
    fn value_match_is_enough_without_active_color() {
        let top = card(Color::Red, Value::Skip);
        assert!(can_play(&card(Color::Yellow, Value::Skip), &top, None, &[]));
        assert!(!can_play(&card(Color::Yellow, Value::Reverse), &top, None, &[]));
    }

    #[test]
    fn draw_four_checks_active_color_not_top_color() {
        let top = card(Color::Wild, Value::Wild);
        let draw_four = card(Color::Wild, Value::DrawFour);
        let hand = vec![card(Color::Red, Value::One), draw_four.clone()];
        assert!(can_play(&draw_four, &top, Some(Color::Blue), &hand));
        assert!(!can_play(&draw_four, &top, Some(Color::Red), &hand));
    }

    #[test]
    fn plain_wild_is_always_legal() {
        let top = card(Color::Red, Value::Four);
        let hand = vec![card(Color::Red, Value::One)];
        assert!(can_play(&card(Color::Wild, Value::Wild), &top, None, &hand));
    }

    #[test]
    fn playable_cards_filters_hand() {
        let top = card(Color::Blue, Value::Nine);
        let hand = vec![
            card(Color::Blue, Value::One),
            card(Color::Red, Value::Two),
            card(Color::Yellow, Value::Nine),
        ];
        let legal: Vec<_> = playable_cards(&hand, &top, None)
            .into_iter()
            .map(|c| c.label())
            .collect();
        assert_eq!(legal, vec!["Blue 1", "Yellow 9"]);
    }

    #[test]
    fn color_choice_rules() {
        let wild = card(Color::Wild, Value::Wild);
        let red = card(Color::Red, Value::One);
        assert_eq!(validate_color_choice(&red, Some(Color::Blue)), Ok(None));
        assert_eq!(validate_color_choice(&wild, Some(Color::Blue)), Ok(Some(Color::Blue)));
        assert!(matches!(
            validate_color_choice(&wild, None),
            Err(GameError::ColorRequired { .. })
        ));
        assert_eq!(
            validate_color_choice(&wild, Some(Color::Wild)),
            Err(GameError::InvalidColorChoice(Color::Wild))
        );
    }
}
