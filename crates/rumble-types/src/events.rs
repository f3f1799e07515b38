use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::moves::{Move, Outcome};
use crate::tally::MatchTally;

/// High-level event bus message kinds moving through the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Lifecycle,
    Round,
    Commentary,
    Ops,
}

/// Immutable event envelope for logging, the feed, and replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemEvent {
    pub id: Uuid,
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    pub payload: EventPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    Lifecycle(LifecycleEvent),
    Round(RoundEvent),
    Commentary(CommentaryEvent),
    Ops(OpsEvent),
    Unknown(serde_json::Value),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub phase: LifecyclePhase,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LifecyclePhase {
    Boot,
    Ready,
    MatchStart,
    MatchEnd,
    Shutdown,
}

/// Published when a round has fully resolved: opponent move chosen, outcome
/// computed, tally updated. Commentary arrives later, if at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundEvent {
    pub round: u64,
    pub player_move: Move,
    pub opponent_move: Move,
    pub outcome: Outcome,
    pub tally: MatchTally,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentaryEvent {
    pub round: u64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpsEvent {
    pub message: String,
    pub tags: Vec<String>,
}

impl SystemEvent {
    pub fn new(kind: EventKind, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            timestamp: Utc::now(),
            payload,
        }
    }
}
