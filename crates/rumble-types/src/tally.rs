use serde::{Deserialize, Serialize};

use crate::moves::Outcome;

/// Cumulative round counters for one arena session.
///
/// Draws are never stored; they are derived from `rounds - wins - losses`,
/// so `rounds >= wins + losses` holds by construction. Counters only move
/// forward, one round at a time, until an explicit reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchTally {
    pub wins: u32,
    pub losses: u32,
    pub rounds: u32,
}

impl MatchTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one completed round into the tally and returns the updated
    /// counters.
    pub fn record(&mut self, outcome: Outcome) -> MatchTally {
        self.rounds += 1;
        match outcome {
            Outcome::Victory => self.wins += 1,
            Outcome::Defeat => self.losses += 1,
            Outcome::Draw => {}
        }
        *self
    }

    /// Derived draw count.
    pub fn draws(&self) -> u32 {
        self.rounds - self.wins - self.losses
    }

    /// Zeroes every counter, regardless of prior state.
    pub fn reset(&mut self) -> MatchTally {
        *self = MatchTally::default();
        *self
    }
}
