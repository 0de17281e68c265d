use crate::deck::shuffle;
use crate::errors::GameError;
use crate::game::GameState;
use rand::Rng;

/// Turns the discard pile, minus its top card, into a freshly shuffled draw
/// pile. Returns how many cards were reclaimed.
///
/// Fails with [`GameError::NoCardsAvailable`] and leaves `state` untouched
/// when the discard pile holds at most the top card.
pub fn replenish_deck<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) -> Result<usize, GameError> {
    if state.discard_pile.len() <= 1 {
        return Err(GameError::NoCardsAvailable);
    }
    let Some(top) = state.discard_pile.pop() else {
        return Err(GameError::NoCardsAvailable);
    };
    let mut reclaimed = std::mem::replace(&mut state.discard_pile, vec![top]);
    shuffle(&mut reclaimed, rng);
    let count = reclaimed.len();
    state.deck.extend(reclaimed);
    Ok(count)
}

/// Whether a draw request could currently be satisfied.
pub fn can_draw(state: &GameState) -> bool {
    !state.deck.is_empty() || state.discard_pile.len() > 1
}
