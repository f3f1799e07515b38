//! Shoutcaster clients: live Gemini-backed commentary and speech synthesis,
//! plus a silent offline stand-in.
//!
//! Commentary is decorative, so this layer never fails outward: a missing
//! credential, a transport error, or an empty response all collapse into a
//! fixed fallback line, and speech synthesis degrades to `None`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use rumble_types::{
    commentary::{CommentaryRequest, SpeechPayload},
    config::CasterConfig,
    Result, RumbleError,
};
use tracing::warn;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Shown when no credential is configured; no network call is attempted.
pub const FALLBACK_NO_KEY: &str = "The arena is silent... (API Key missing)";
/// Shown when the service answers without usable text.
pub const FALLBACK_EMPTY: &str = "A stunning display of skill!";
/// Shown when the request itself fails.
pub const FALLBACK_UNAVAILABLE: &str = "The casters are speechless!";

/// Gemini TTS returns 16-bit mono PCM at this rate unless the response says
/// otherwise.
pub const SPEECH_SAMPLE_RATE_HZ: u32 = 24_000;
pub const SPEECH_CHANNEL_COUNT: usize = 1;

#[async_trait]
pub trait Shoutcaster: Send + Sync {
    /// One-sentence reaction to a resolved round. Infallible by contract.
    async fn commentate(&self, request: &CommentaryRequest) -> String;
    /// Best-effort speech for a commentary line.
    async fn synthesize(&self, text: &str) -> Option<SpeechPayload>;
}

/// Builds the shoutcaster prompt, embedding both champion display names,
/// their move symbols, and the outcome.
pub fn build_prompt(request: &CommentaryRequest) -> String {
    let player = request.player_move.champion();
    let opponent = request.opponent_move.champion();
    format!(
        "You are a hyper-energetic League of Legends shoutcaster (like Phreak or CaptainFlowers).\n\
         The player selected {} (representing {}).\n\
         The opponent selected {} (representing {}).\n\
         The result is a {} for the player.\n\n\
         Write a ONE sentence, high-energy reaction to this specific interaction.\n\
         Reference the champions' abilities or lore if possible (e.g., Malphite's Unstoppable Force, \
         Twisted Fate's Gold Card, Gwen's Hallowed Mist/Scissors).\n\
         Keep it short and punchy.",
        player.name, request.player_move, opponent.name, request.opponent_move, request.outcome
    )
}

/// Live client for the Gemini generateContent API. Credential presence is
/// decided once at construction.
pub struct GeminiCaster {
    client: Client,
    credential: Option<String>,
    model: String,
    speech_model: String,
    voice: String,
    speech: bool,
    api_base: String,
}

impl GeminiCaster {
    pub fn new(config: &CasterConfig) -> Self {
        Self::with_credential(config.resolve_api_key(), config)
    }

    /// Construction seam for tests that must not touch the ambient
    /// environment.
    pub fn with_credential(credential: Option<String>, config: &CasterConfig) -> Self {
        Self {
            client: Client::new(),
            credential,
            model: config.model.clone(),
            speech_model: config.speech_model.clone(),
            voice: config.voice.clone(),
            speech: config.speech,
            api_base: GEMINI_API_BASE.to_string(),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    async fn generate_text(&self, key: &str, prompt: &str) -> Result<Option<String>> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: None,
        };
        let response = self.post_generate(key, &self.model, &body).await?;
        Ok(response.first_text())
    }

    async fn generate_speech(&self, key: &str, text: &str) -> Result<Option<SpeechPayload>> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text }],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["AUDIO"],
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig { voice_name: &self.voice },
                    },
                }),
            }),
        };
        let response = self.post_generate(key, &self.speech_model, &body).await?;

        let Some(inline) = response.first_inline_data() else {
            return Ok(None);
        };
        let sample_rate_hz = inline
            .mime_type
            .as_deref()
            .and_then(parse_sample_rate)
            .unwrap_or(SPEECH_SAMPLE_RATE_HZ);
        Ok(Some(SpeechPayload {
            data: inline.data,
            sample_rate_hz,
            channel_count: SPEECH_CHANNEL_COUNT,
        }))
    }

    async fn post_generate(
        &self,
        key: &str,
        model: &str,
        body: &GenerateContentRequest<'_>,
    ) -> Result<GenerateContentResponse> {
        let url = format!("{}/models/{}:generateContent", self.api_base, model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", key)
            .json(body)
            .send()
            .await
            .map_err(|err| caster_error(format!("request to {model} failed: {err}")))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|err| caster_error(format!("failed to read {model} response: {err}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&response_text)
                .map(|e| e.error.message)
                .unwrap_or(response_text);
            return Err(caster_error(format!(
                "{model} returned {}: {message}",
                status.as_u16()
            )));
        }

        serde_json::from_str(&response_text)
            .map_err(|err| caster_error(format!("failed to parse {model} response: {err}")))
    }
}

#[async_trait]
impl Shoutcaster for GeminiCaster {
    async fn commentate(&self, request: &CommentaryRequest) -> String {
        let Some(key) = self.credential.clone() else {
            return FALLBACK_NO_KEY.to_string();
        };
        let prompt = build_prompt(request);
        match self.generate_text(&key, &prompt).await {
            Ok(text) => commentary_from_text(text),
            Err(err) => {
                warn!("Commentary request for round {} failed: {err}", request.round);
                FALLBACK_UNAVAILABLE.to_string()
            }
        }
    }

    async fn synthesize(&self, text: &str) -> Option<SpeechPayload> {
        if !self.speech {
            return None;
        }
        let key = self.credential.clone()?;
        match self.generate_speech(&key, text).await {
            Ok(payload) => payload,
            Err(err) => {
                warn!("Speech synthesis failed: {err}");
                None
            }
        }
    }
}

/// Offline stand-in used when the arena should stay quiet; mirrors the null
/// implementations the other subsystem seams carry.
pub struct SilentCaster;

#[async_trait]
impl Shoutcaster for SilentCaster {
    async fn commentate(&self, request: &CommentaryRequest) -> String {
        format!(
            "{} meets {} and the crowd holds its breath!",
            request.player_move.champion().name,
            request.opponent_move.champion().name
        )
    }

    async fn synthesize(&self, _text: &str) -> Option<SpeechPayload> {
        None
    }
}

/// Applies the trim-then-fallback rule to a service text field.
fn commentary_from_text(text: Option<String>) -> String {
    match text {
        Some(text) if !text.trim().is_empty() => text.trim().to_string(),
        _ => FALLBACK_EMPTY.to_string(),
    }
}

/// Pulls the rate out of a mime type such as `audio/L16;codec=pcm;rate=24000`.
fn parse_sample_rate(mime_type: &str) -> Option<u32> {
    mime_type
        .split(';')
        .filter_map(|part| part.trim().strip_prefix("rate="))
        .find_map(|rate| rate.parse().ok())
}

/// Generate an error aligned with caster semantics.
pub fn caster_error(message: impl Into<String>) -> RumbleError {
    RumbleError::Caster(message.into())
}

/// Request body sent to the generateContent endpoint.
#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig<'a> {
    #[serde(rename = "responseModalities")]
    response_modalities: Vec<&'a str>,
    #[serde(rename = "speechConfig", skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig<'a>>,
}

#[derive(Serialize)]
struct SpeechConfig<'a> {
    #[serde(rename = "voiceConfig")]
    voice_config: VoiceConfig<'a>,
}

#[derive(Serialize)]
struct VoiceConfig<'a> {
    #[serde(rename = "prebuiltVoiceConfig")]
    prebuilt_voice_config: PrebuiltVoiceConfig<'a>,
}

#[derive(Serialize)]
struct PrebuiltVoiceConfig<'a> {
    #[serde(rename = "voiceName")]
    voice_name: &'a str,
}

/// Top-level response from the generateContent endpoint.
#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
    #[serde(rename = "inlineData")]
    inline_data: Option<InlineData>,
}

/// Inline binary payload carried by a speech response.
#[derive(Deserialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: Option<String>,
    data: String,
}

/// Error response shape shared by the Gemini endpoints.
#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl GenerateContentResponse {
    fn first_text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn first_inline_data(self) -> Option<InlineData> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .find_map(|part| part.inline_data)
    }
}
