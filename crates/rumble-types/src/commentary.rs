use serde::{Deserialize, Serialize};

use crate::moves::{Move, Outcome};

/// Immutable snapshot of one resolved round, used to build a single
/// commentary prompt. Carries the round generation so late responses can be
/// recognized as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentaryRequest {
    pub round: u64,
    pub player_move: Move,
    pub opponent_move: Move,
    pub outcome: Outcome,
}

impl CommentaryRequest {
    pub fn new(round: u64, player_move: Move, opponent_move: Move, outcome: Outcome) -> Self {
        Self {
            round,
            player_move,
            opponent_move,
            outcome,
        }
    }
}

/// Base64-encoded 16-bit little-endian PCM as returned by the speech
/// service, plus the two parameters needed to interpret it. Consumed exactly
/// once by the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechPayload {
    pub data: String,
    pub sample_rate_hz: u32,
    pub channel_count: usize,
}
