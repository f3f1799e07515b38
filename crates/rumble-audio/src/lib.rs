//! Speech payload decoding and the audio playback seam.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rumble_types::{
    champions::SoundCue,
    commentary::SpeechPayload,
    config::AudioConfig,
    Result, RumbleError,
};
use tracing::info;

/// Decoded, playback-ready audio: one normalized `f32` buffer per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    pub sample_rate_hz: u32,
    pub channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn frame_count(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }
}

/// Decodes a base64 payload of interleaved signed 16-bit little-endian PCM
/// into per-channel buffers normalized by 1/32768 (so -32768 maps to exactly
/// -1.0 and +32767 stays just below +1.0).
///
/// A trailing byte that is not a whole sample, or trailing samples that do
/// not fill a whole frame, are truncated rather than read past. An empty
/// payload decodes to a zero-frame buffer; malformed base64 is a
/// [`RumbleError::Decode`].
pub fn decode_pcm(
    base64_payload: &str,
    sample_rate_hz: u32,
    channel_count: usize,
) -> Result<AudioBuffer> {
    if channel_count == 0 {
        return Err(decode_error("channel count must be greater than zero"));
    }

    let bytes = STANDARD
        .decode(base64_payload)
        .map_err(|err| decode_error(format!("invalid base64 payload: {err}")))?;

    let samples: Vec<i16> = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    let frame_count = samples.len() / channel_count;
    let mut channels = vec![Vec::with_capacity(frame_count); channel_count];
    for frame in 0..frame_count {
        for (channel, buffer) in channels.iter_mut().enumerate() {
            let sample = samples[frame * channel_count + channel];
            buffer.push(f32::from(sample) / 32768.0);
        }
    }

    Ok(AudioBuffer {
        sample_rate_hz,
        channels,
    })
}

/// Convenience wrapper for payloads exactly as the speech service hands
/// them over.
pub fn decode_payload(payload: &SpeechPayload) -> Result<AudioBuffer> {
    decode_pcm(&payload.data, payload.sample_rate_hz, payload.channel_count)
}

#[async_trait]
pub trait AudioSink: Send + Sync {
    async fn play_buffer(&self, buffer: AudioBuffer) -> Result<()>;
    async fn play_clip(&self, cue: SoundCue) -> Result<()>;
}

/// Sink for headless runs: honors the mute switch and logs what a real
/// output device would play.
pub struct ConsoleSink {
    config: AudioConfig,
}

impl ConsoleSink {
    pub fn new(config: AudioConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl AudioSink for ConsoleSink {
    async fn play_buffer(&self, buffer: AudioBuffer) -> Result<()> {
        if self.config.muted {
            return Ok(());
        }
        info!(
            "Playing {} frames x {} channels at {} Hz (volume {})",
            buffer.frame_count(),
            buffer.channel_count(),
            buffer.sample_rate_hz,
            self.config.volume
        );
        Ok(())
    }

    async fn play_clip(&self, cue: SoundCue) -> Result<()> {
        if self.config.muted {
            return Ok(());
        }
        info!("Playing clip {:?} from {}", cue, cue.clip_url());
        Ok(())
    }
}

/// Generate an error aligned with decoder semantics.
pub fn decode_error(message: impl Into<String>) -> RumbleError {
    RumbleError::Decode(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Quantizes normalized samples back into interleaved little-endian
    /// 16-bit PCM and base64-encodes them, the inverse of `decode_pcm`.
    fn encode_pcm(channels: &[Vec<f32>]) -> String {
        let frame_count = channels.first().map_or(0, Vec::len);
        let mut bytes = Vec::new();
        for frame in 0..frame_count {
            for channel in channels {
                let quantized = (channel[frame] * 32768.0)
                    .clamp(f32::from(i16::MIN), f32::from(i16::MAX))
                    as i16;
                bytes.extend_from_slice(&quantized.to_le_bytes());
            }
        }
        STANDARD.encode(bytes)
    }

    fn ramp(frame_count: usize, offset: f32) -> Vec<f32> {
        (0..frame_count)
            .map(|i| ((i as f32 / 128.0 + offset).sin() * 0.8).clamp(-1.0, 0.99))
            .collect()
    }

    #[test]
    fn round_trip_recovers_samples_within_quantization_error() {
        for channel_count in [1usize, 2] {
            for frame_count in [0usize, 1, 100] {
                let original: Vec<Vec<f32>> = (0..channel_count)
                    .map(|c| ramp(frame_count, c as f32))
                    .collect();
                let encoded = encode_pcm(&original);

                let decoded = decode_pcm(&encoded, 24000, channel_count).expect("decode");
                assert_eq!(decoded.channel_count(), channel_count);
                assert_eq!(decoded.frame_count(), frame_count);

                for (expected, actual) in original.iter().zip(&decoded.channels) {
                    for (e, a) in expected.iter().zip(actual) {
                        assert!(
                            (e - a).abs() <= 1.0 / 32768.0,
                            "sample drifted: expected {e}, got {a}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn invalid_base64_is_a_decode_error() {
        let err = decode_pcm("not*base64!", 24000, 1).unwrap_err();
        assert!(matches!(err, RumbleError::Decode(_)), "got {err:?}");
    }

    #[test]
    fn empty_payload_is_a_zero_frame_buffer() {
        let buffer = decode_pcm("", 24000, 2).expect("empty payload decodes");
        assert_eq!(buffer.frame_count(), 0);
        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.sample_rate_hz, 24000);
    }

    #[test]
    fn trailing_partial_frame_is_truncated() {
        // Three samples across two channels: one full frame plus a dangling
        // half frame.
        let bytes: Vec<u8> = [100i16, -200, 300]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        let buffer = decode_pcm(&STANDARD.encode(bytes), 24000, 2).expect("decode");
        assert_eq!(buffer.frame_count(), 1);
        assert_eq!(buffer.channels[0], vec![100.0 / 32768.0]);
        assert_eq!(buffer.channels[1], vec![-200.0 / 32768.0]);
    }

    #[test]
    fn trailing_odd_byte_is_truncated() {
        let bytes = vec![0u8, 64, 0, 192, 7];
        let buffer = decode_pcm(&STANDARD.encode(bytes), 24000, 1).expect("decode");
        assert_eq!(buffer.frame_count(), 2);
    }

    #[test]
    fn normalization_endpoints_are_asymmetric() {
        let bytes: Vec<u8> = [i16::MIN, i16::MAX]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        let buffer = decode_pcm(&STANDARD.encode(bytes), 24000, 1).expect("decode");
        assert_eq!(buffer.channels[0][0], -1.0);
        assert_eq!(buffer.channels[0][1], 32767.0 / 32768.0);
        assert!(buffer.channels[0][1] < 1.0);
    }

    #[test]
    fn stereo_deinterleaves_by_frame() {
        let bytes: Vec<u8> = [1i16, -1, 2, -2, 3, -3]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        let buffer = decode_pcm(&STANDARD.encode(bytes), 44100, 2).expect("decode");
        assert_eq!(buffer.frame_count(), 3);
        let left: Vec<i32> = buffer.channels[0]
            .iter()
            .map(|s| (s * 32768.0) as i32)
            .collect();
        let right: Vec<i32> = buffer.channels[1]
            .iter()
            .map(|s| (s * 32768.0) as i32)
            .collect();
        assert_eq!(left, vec![1, 2, 3]);
        assert_eq!(right, vec![-1, -2, -3]);
    }

    #[test]
    fn zero_channels_is_rejected() {
        let err = decode_pcm("", 24000, 0).unwrap_err();
        assert!(matches!(err, RumbleError::Decode(_)));
    }

    #[tokio::test]
    async fn muted_sink_swallows_playback() {
        let sink = ConsoleSink::new(AudioConfig {
            volume: 0.4,
            muted: true,
        });
        sink.play_clip(SoundCue::Select).await.expect("muted clip");
        sink.play_buffer(AudioBuffer {
            sample_rate_hz: 24000,
            channels: vec![vec![0.0]],
        })
        .await
        .expect("muted buffer");
    }
}
