//! Turn order bookkeeping.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

/// Ordered participants of the current phase plus whose turn it is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TurnManager {
    order: Vec<String>,
    cursor: usize,
    passes: usize,
}

impl TurnManager {
    /// Start a fresh order with the cursor on the first participant.
    pub fn new(order: Vec<String>) -> Self {
        Self {
            order,
            cursor: 0,
            passes: 0,
        }
    }

    /// Participant whose turn it is, or `None` when nobody takes part.
    pub fn current(&self) -> Option<&str> {
        if self.order.is_empty() {
            return None;
        }
        self.order
            .get(self.cursor % self.order.len())
            .map(String::as_str)
    }

    /// Participants in turn order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Zero-based position of the current participant.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Consecutive passes recorded so far.
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Move to the next participant; returns `true` when the order wrapped around.
    pub fn advance(&mut self) -> bool {
        if self.order.is_empty() {
            return true;
        }
        self.cursor += 1;
        if self.cursor >= self.order.len() {
            self.cursor = 0;
            return true;
        }
        false
    }

    /// Count a pass; returns `true` once every participant has passed in a row.
    pub fn record_pass(&mut self) -> bool {
        self.passes += 1;
        self.passes >= self.order.len()
    }

    /// Any action other than a pass breaks the streak.
    pub fn reset_passes(&mut self) {
        self.passes = 0;
    }
}

/// Seeded randomness used to break exact ties in player turn order.
#[derive(Debug, Clone)]
pub struct TieBreaker {
    seed: u64,
    rng: ChaCha8Rng,
}

impl TieBreaker {
    /// Tie breaker whose choices are fully determined by `seed`.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seed the tie breaker was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Shuffle `items` in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

impl PartialEq for TieBreaker {
    fn eq(&self, other: &Self) -> bool {
        self.seed == other.seed
            && self.rng.get_stream() == other.rng.get_stream()
            && self.rng.get_word_pos() == other.rng.get_word_pos()
    }
}

impl Eq for TieBreaker {}
