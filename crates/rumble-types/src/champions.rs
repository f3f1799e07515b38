use crate::moves::{Move, Outcome};

/// Display metadata for the champion fronting a move on the pick screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Champion {
    pub id: Move,
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

pub const ROCK_CHAMPION: Champion = Champion {
    id: Move::Rock,
    name: "Malphite",
    title: "Shard of the Monolith",
    description: "Unstoppable force. Crushes Scissors.",
};

pub const PAPER_CHAMPION: Champion = Champion {
    id: Move::Paper,
    name: "Twisted Fate",
    title: "The Card Master",
    description: "It's all in the cards. Covers Rock.",
};

pub const SCISSORS_CHAMPION: Champion = Champion {
    id: Move::Scissors,
    name: "Gwen",
    title: "The Hallowed Seamstress",
    description: "Snip snip! Cuts Paper.",
};

impl Move {
    /// Champion presented for this move.
    pub fn champion(self) -> &'static Champion {
        match self {
            Move::Rock => &ROCK_CHAMPION,
            Move::Paper => &PAPER_CHAMPION,
            Move::Scissors => &SCISSORS_CHAMPION,
        }
    }
}

/// Short stock clips the presentation layer plays around a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Select,
    Victory,
    Defeat,
    Draw,
    Commentary,
}

impl SoundCue {
    /// Clip to play once a round resolves.
    pub fn for_outcome(outcome: Outcome) -> SoundCue {
        match outcome {
            Outcome::Victory => SoundCue::Victory,
            Outcome::Defeat => SoundCue::Defeat,
            Outcome::Draw => SoundCue::Draw,
        }
    }

    pub fn clip_url(self) -> &'static str {
        match self {
            SoundCue::Select => {
                "https://assets.mixkit.co/sfx/preview/mixkit-modern-technology-select-3124.mp3"
            }
            SoundCue::Victory => {
                "https://assets.mixkit.co/sfx/preview/mixkit-ethereal-fairy-win-sound-2019.mp3"
            }
            SoundCue::Defeat => {
                "https://assets.mixkit.co/sfx/preview/mixkit-arcade-retro-game-over-213.mp3"
            }
            SoundCue::Draw => {
                "https://assets.mixkit.co/sfx/preview/mixkit-sci-fi-positive-notification-266.mp3"
            }
            SoundCue::Commentary => {
                "https://assets.mixkit.co/sfx/preview/mixkit-software-interface-start-2574.mp3"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_move_has_a_champion() {
        for mv in Move::ALL {
            let champion = mv.champion();
            assert_eq!(champion.id, mv);
            assert!(!champion.name.is_empty());
        }
    }

    #[test]
    fn outcome_cues_are_distinct() {
        let victory = SoundCue::for_outcome(Outcome::Victory);
        let defeat = SoundCue::for_outcome(Outcome::Defeat);
        let draw = SoundCue::for_outcome(Outcome::Draw);
        assert_ne!(victory.clip_url(), defeat.clip_url());
        assert_ne!(defeat.clip_url(), draw.clip_url());
    }
}
