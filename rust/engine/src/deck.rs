use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Fisher-Yates shuffle: walks from the last index down to 1 and swaps each
/// slot with a uniformly chosen slot at or below it.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Seeded randomness source for everything the engine shuffles or picks.
#[derive(Debug, Clone)]
pub struct Shuffler {
    seed: u64,
    rng: ChaCha20Rng,
}

impl Shuffler {
    /// Creates a shuffler from `seed`, or from a fresh random seed when `None`.
    /// The seed actually used is kept so a game can be replayed.
    pub fn new(seed: Option<u64>) -> Self {
        Self::new_with_seed(seed.unwrap_or_else(rand::random))
    }

    pub fn new_with_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        shuffle(items, &mut self.rng);
    }

    pub fn rng_mut(&mut self) -> &mut ChaCha20Rng {
        &mut self.rng
    }
}
