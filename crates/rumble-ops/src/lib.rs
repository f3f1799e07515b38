//! Operational helpers: logging setup and in-memory match transcripts.

use std::{path::PathBuf, sync::Arc};

use rumble_types::{
    config::OpsConfig,
    events::{RoundEvent, SystemEvent},
    Result, RumbleError,
};
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

pub fn init_tracing(config: &OpsConfig) -> Result<()> {
    let filter = EnvFilter::try_new(config.log_level.clone())
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|err| RumbleError::Ops(format!("failed to create log filter: {err}")))?;

    fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| RumbleError::Ops(format!("tracing init error: {err}")))?;
    Ok(())
}

/// In-memory transcript of a session: every published event plus the
/// resolved rounds in order.
#[derive(Clone, Default)]
pub struct TranscriptStore {
    events: Arc<Mutex<Vec<SystemEvent>>>,
    rounds: Arc<Mutex<Vec<RoundEvent>>>,
}

impl TranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_event(&self, event: SystemEvent) -> Result<()> {
        self.events.lock().await.push(event);
        Ok(())
    }

    pub async fn record_round(&self, round: RoundEvent) -> Result<()> {
        self.rounds.lock().await.push(round);
        Ok(())
    }

    pub async fn snapshot_events(&self) -> Vec<SystemEvent> {
        self.events.lock().await.clone()
    }

    pub async fn snapshot_rounds(&self) -> Vec<RoundEvent> {
        self.rounds.lock().await.clone()
    }
}

pub fn ensure_transcript_dir(path: &str) -> Result<PathBuf> {
    let dir = PathBuf::from(path);
    std::fs::create_dir_all(&dir)
        .map_err(|err| RumbleError::Ops(format!("failed to create transcript dir: {err}")))?;
    info!("Transcript directory ready at {:?}", dir);
    Ok(dir)
}
