use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three arena symbols. The set is closed; anything outside it is
/// unrepresentable by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Rock,
    Paper,
    Scissors,
}

impl Move {
    /// The full move set, in pick-screen order.
    pub const ALL: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

    /// The unique move this one defeats. The mapping forms a single 3-cycle:
    /// rock crushes scissors, paper covers rock, scissors cut paper.
    pub fn defeats(self) -> Move {
        match self {
            Move::Rock => Move::Scissors,
            Move::Paper => Move::Rock,
            Move::Scissors => Move::Paper,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Move::Rock => "ROCK",
            Move::Paper => "PAPER",
            Move::Scissors => "SCISSORS",
        };
        write!(f, "{label}")
    }
}

/// Result of one round, seen from the player's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Victory,
    Defeat,
    Draw,
}

impl Outcome {
    /// The same round seen from the opposing side.
    pub fn flip(self) -> Outcome {
        match self {
            Outcome::Victory => Outcome::Defeat,
            Outcome::Defeat => Outcome::Victory,
            Outcome::Draw => Outcome::Draw,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Outcome::Victory => "VICTORY",
            Outcome::Defeat => "DEFEAT",
            Outcome::Draw => "DRAW",
        };
        write!(f, "{label}")
    }
}

/// Resolves a round from the player's perspective. Total and pure: equal
/// moves draw, a move beats exactly the one it defeats, everything else
/// loses.
pub fn resolve(player: Move, opponent: Move) -> Outcome {
    if player == opponent {
        Outcome::Draw
    } else if player.defeats() == opponent {
        Outcome::Victory
    } else {
        Outcome::Defeat
    }
}
