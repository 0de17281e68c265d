//! Random strategy: any card that looks playable, picked uniformly.

use std::sync::Mutex;

use crate::{faces, holds_color_in_force, matches_top, AIOpponent};
use cardparty_engine::cards::{Value, PLAYABLE_COLORS};
use cardparty_engine::opponent::{OpponentRequest, OpponentResponse};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;

#[derive(Debug)]
pub struct RandomAI {
    rng: Mutex<StdRng>,
}

impl RandomAI {
    /// Seeded for reproducible play; `None` draws entropy from the OS.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng: Mutex::new(rng) }
    }
}

impl AIOpponent for RandomAI {
    fn propose(&self, request: &OpponentRequest) -> OpponentResponse {
        let hand = faces(request);
        let draw_four_allowed = !holds_color_in_force(&hand, request);
        let candidates: Vec<_> = hand
            .iter()
            .filter(|f| match f.value {
                Value::DrawFour => draw_four_allowed,
                _ => f.color.is_wild() || matches_top(f, request),
            })
            .collect();
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match candidates.choose(&mut *rng) {
            Some(face) if face.color.is_wild() => {
                OpponentResponse::play(face.label, PLAYABLE_COLORS.choose(&mut *rng).copied())
            }
            Some(face) => OpponentResponse::play(face.label, None),
            None => OpponentResponse::draw(),
        }
    }

    fn name(&self) -> &str {
        "RandomAI"
    }
}
