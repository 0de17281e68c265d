use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Card color. `Wild` marks the colorless Wild family; the other four are
/// the colors a player may name when resolving a Wild card.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
    Wild,
}

/// Colors a Wild card may be resolved to.
pub const PLAYABLE_COLORS: [Color; 4] = [Color::Red, Color::Green, Color::Blue, Color::Yellow];

impl Color {
    pub fn is_wild(self) -> bool {
        matches!(self, Color::Wild)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Color::Red => "Red",
            Color::Green => "Green",
            Color::Blue => "Blue",
            Color::Yellow => "Yellow",
            Color::Wild => "Wild",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Face value of a card. Serialized with the printed face text so stored
/// records read `"7"` or `"Draw Two"` rather than variant names.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Value {
    #[serde(rename = "0")]
    Zero,
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    Skip,
    Reverse,
    #[serde(rename = "Draw Two")]
    DrawTwo,
    Wild,
    #[serde(rename = "Draw Four")]
    DrawFour,
}

impl Value {
    pub fn from_number(n: u8) -> Option<Value> {
        NUMBERS.get(n as usize).copied()
    }

    /// Number of cards the next player must take when this card is played.
    pub fn draw_penalty(self) -> usize {
        match self {
            Value::DrawTwo => 2,
            Value::DrawFour => 4,
            _ => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Value::Zero => "0",
            Value::One => "1",
            Value::Two => "2",
            Value::Three => "3",
            Value::Four => "4",
            Value::Five => "5",
            Value::Six => "6",
            Value::Seven => "7",
            Value::Eight => "8",
            Value::Nine => "9",
            Value::Skip => "Skip",
            Value::Reverse => "Reverse",
            Value::DrawTwo => "Draw Two",
            Value::Wild => "Wild",
            Value::DrawFour => "Draw Four",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const NUMBERS: [Value; 10] = [
    Value::Zero,
    Value::One,
    Value::Two,
    Value::Three,
    Value::Four,
    Value::Five,
    Value::Six,
    Value::Seven,
    Value::Eight,
    Value::Nine,
];

const ACTIONS: [Value; 3] = [Value::Skip, Value::Reverse, Value::DrawTwo];

/// A single card. Cards never change after construction; the `id` is what
/// tracks a physical card as it moves between deck, hands and discard pile.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub color: Color,
    pub value: Value,
}

impl Card {
    pub fn new(id: impl Into<String>, color: Color, value: Value) -> Self {
        Self {
            id: id.into(),
            color,
            value,
        }
    }

    pub fn is_wild(&self) -> bool {
        self.color.is_wild()
    }

    /// "Color Value" text used at the opponent boundary, e.g. `Red 7`.
    pub fn label(&self) -> String {
        format!("{} {}", self.color, self.value)
    }

    pub fn matches_label(&self, label: &str) -> bool {
        self.label().eq_ignore_ascii_case(label.trim())
    }
}

/// Parses a "Color Value" label back into its face. Case-insensitive.
pub fn parse_label(label: &str) -> Option<(Color, Value)> {
    let (color, value) = label.trim().split_once(' ')?;
    let color = PLAYABLE_COLORS
        .into_iter()
        .chain([Color::Wild])
        .find(|c| c.as_str().eq_ignore_ascii_case(color))?;
    let value = NUMBERS
        .into_iter()
        .chain(ACTIONS)
        .chain([Value::Wild, Value::DrawFour])
        .find(|v| v.as_str().eq_ignore_ascii_case(value.trim()))?;
    Some((color, value))
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color, self.value)
    }
}

/// Total number of cards in a complete deck.
pub const DECK_SIZE: usize = 108;

/// Builds the full 108-card deck in a fixed order with ids `card-0..card-107`.
///
/// Per color: one `0`, two each of `1`-`9`, two each of Skip, Reverse and
/// Draw Two. Then four Wild and four Wild Draw Four.
///
/// ```
/// use cardparty_engine::cards::{build_deck, DECK_SIZE};
///
/// let deck = build_deck();
/// assert_eq!(deck.len(), DECK_SIZE);
/// ```
pub fn build_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    let mut next_id = 0usize;
    let mut push = |deck: &mut Vec<Card>, color: Color, value: Value| {
        deck.push(Card::new(format!("card-{next_id}"), color, value));
        next_id += 1;
    };

    for color in PLAYABLE_COLORS {
        push(&mut deck, color, Value::Zero);
        for value in NUMBERS.iter().skip(1).chain(ACTIONS.iter()) {
            push(&mut deck, color, *value);
            push(&mut deck, color, *value);
        }
    }
    for _ in 0..4 {
        push(&mut deck, Color::Wild, Value::Wild);
        push(&mut deck, Color::Wild, Value::DrawFour);
    }
    deck
}

/// Expected count of every (color, value) pair in a complete deck.
pub fn deck_composition() -> HashMap<(Color, Value), usize> {
    let mut counts = HashMap::new();
    for card in build_deck() {
        *counts.entry((card.color, card.value)).or_insert(0) += 1;
    }
    counts
}
