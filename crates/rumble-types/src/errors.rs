use thiserror::Error;

pub type Result<T, E = RumbleError> = std::result::Result<T, E>;

/// Unified error type covering common failure scenarios across subsystems.
///
/// `Decode` is kept separate from `Caster`: a transport failure means the
/// service was unreachable, a decode failure means it answered with a
/// malformed payload. Callers downgrade both to "no commentary/audio this
/// round" rather than letting them reach game flow.
#[derive(Debug, Error)]
pub enum RumbleError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("engine error: {0}")]
    Engine(String),
    #[error("caster error: {0}")]
    Caster(String),
    #[error("audio decode error: {0}")]
    Decode(String),
    #[error("audio error: {0}")]
    Audio(String),
    #[error("feed error: {0}")]
    Feed(String),
    #[error("session error: {0}")]
    Session(String),
    #[error("operational error: {0}")]
    Ops(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
