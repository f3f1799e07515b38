use std::{env, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{Result, RumbleError};

/// Environment variable consulted when the config file carries no key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CasterConfig {
    /// Optional credential for the generative-language service. Absence is a
    /// supported mode: the caster falls back to canned lines and no speech.
    pub api_key: Option<String>,
    pub model: String,
    pub speech_model: String,
    pub voice: String,
    /// Whether to request synthesized speech for each commentary line.
    pub speech: bool,
}

impl CasterConfig {
    /// Credential from the config file, or from the environment as a
    /// fallback. Decided once at client construction, never re-derived.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.is_empty())
            .or_else(|| env::var(API_KEY_ENV).ok().filter(|key| !key.is_empty()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    pub volume: f32,
    pub muted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Staged "thinking" delay before the opponent reveals its move.
    pub opponent_delay_ms: u64,
    /// Rounds played by the exhibition runner.
    pub exhibition_rounds: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpsConfig {
    pub log_level: String,
    pub transcript_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RumbleConfig {
    pub caster: CasterConfig,
    pub audio: AudioConfig,
    pub session: SessionConfig,
    pub ops: OpsConfig,
}

impl RumbleConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref).map_err(|err| {
            RumbleError::Configuration(format!(
                "unable to read config file {}: {err}",
                path_ref.display()
            ))
        })?;
        toml::from_str(&contents).map_err(|err| {
            RumbleError::Configuration(format!(
                "failed to parse config file {}: {err}",
                path_ref.display()
            ))
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.caster.model.is_empty() {
            return Err(RumbleError::Configuration(
                "caster.model must not be empty".into(),
            ));
        }
        if self.caster.speech && self.caster.speech_model.is_empty() {
            return Err(RumbleError::Configuration(
                "caster.speech_model must not be empty when speech is enabled".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err(RumbleError::Configuration(
                "audio.volume must be between 0.0 and 1.0".into(),
            ));
        }
        if self.session.exhibition_rounds == 0 {
            return Err(RumbleError::Configuration(
                "session.exhibition_rounds must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
