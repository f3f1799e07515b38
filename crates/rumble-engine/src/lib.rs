//! Opponent move selection abstraction.

use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;
use rand::Rng;
use rumble_types::{moves::Move, Result, RumbleError};
use tokio::time::{sleep, Duration};
use tracing::info;

#[async_trait]
pub trait OpponentBrain: Send + Sync {
    async fn warm_up(&mut self) -> Result<()>;
    /// Picks the opponent's move for the given round.
    async fn choose(&self, round: u64) -> Result<Move>;
}

/// The stock opponent: uniform over the move set, no memory of prior rounds.
/// The staged delay exists purely so the reveal does not feel instantaneous.
pub struct RandomBrain {
    thinking_delay: Duration,
}

impl RandomBrain {
    pub fn new(thinking_delay_ms: u64) -> Self {
        Self {
            thinking_delay: Duration::from_millis(thinking_delay_ms),
        }
    }
}

#[async_trait]
impl OpponentBrain for RandomBrain {
    async fn warm_up(&mut self) -> Result<()> {
        info!("Random brain warm-up");
        Ok(())
    }

    async fn choose(&self, round: u64) -> Result<Move> {
        sleep(self.thinking_delay).await;
        let pick = {
            let mut rng = rand::rng();
            Move::ALL[rng.random_range(0..Move::ALL.len())]
        };
        info!("Opponent picked {} for round {}", pick, round);
        Ok(pick)
    }
}

/// Plays a fixed sequence of moves; used by tests to force matchups.
pub struct ScriptedBrain {
    moves: Mutex<VecDeque<Move>>,
}

impl ScriptedBrain {
    pub fn new(moves: impl IntoIterator<Item = Move>) -> Self {
        Self {
            moves: Mutex::new(moves.into_iter().collect()),
        }
    }
}

#[async_trait]
impl OpponentBrain for ScriptedBrain {
    async fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }

    async fn choose(&self, round: u64) -> Result<Move> {
        let mut moves = self
            .moves
            .lock()
            .map_err(|_| engine_error("failed to lock scripted moves"))?;
        moves
            .pop_front()
            .ok_or_else(|| engine_error(format!("script exhausted at round {round}")))
    }
}

/// Generate an error aligned with engine semantics.
pub fn engine_error(message: impl Into<String>) -> RumbleError {
    RumbleError::Engine(message.into())
}
