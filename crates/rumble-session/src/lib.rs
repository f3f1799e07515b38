//! Arena session orchestration: one round at a time, with commentary layered
//! on top as a non-blocking, best-effort decoration.
//!
//! Round resolution is synchronous: the opponent move, outcome, and tally are
//! final before `play_round` returns. The commentary task runs detached and
//! applies its result only if the session is still on the round it was
//! spawned for; late responses from a superseded round are discarded.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rand::Rng;
use rumble_audio::{decode_payload, AudioSink};
use rumble_caster::Shoutcaster;
use rumble_engine::OpponentBrain;
use rumble_feed::EventFeed;
use rumble_ops::{ensure_transcript_dir, init_tracing, TranscriptStore};
use rumble_types::{
    champions::SoundCue,
    commentary::CommentaryRequest,
    config::{RumbleConfig, SessionConfig},
    events::{
        CommentaryEvent, EventKind, EventPayload, LifecycleEvent, LifecyclePhase, RoundEvent,
        SystemEvent,
    },
    moves::{resolve, Move, Outcome},
    tally::MatchTally,
    Result, RumbleError,
};
use tracing::{debug, info, warn};

/// What a renderer reads to draw the shoutcaster box.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentaryBoard {
    /// Round the board currently belongs to; doubles as the staleness
    /// generation for in-flight requests.
    pub round: u64,
    pub text: Option<String>,
    pub loading: bool,
}

/// Synchronous result of one completed round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundReport {
    pub round: u64,
    pub player_move: Move,
    pub opponent_move: Move,
    pub outcome: Outcome,
    pub tally: MatchTally,
}

pub struct Session<B, S, A, F>
where
    B: OpponentBrain,
    S: Shoutcaster + 'static,
    A: AudioSink + 'static,
    F: EventFeed + Clone + 'static,
{
    brain: B,
    caster: Arc<S>,
    sink: Arc<A>,
    feed: F,
    transcript: TranscriptStore,
    config: SessionConfig,
    tally: MatchTally,
    round: u64,
    board: Arc<Mutex<CommentaryBoard>>,
}

impl<B, S, A, F> Session<B, S, A, F>
where
    B: OpponentBrain,
    S: Shoutcaster + 'static,
    A: AudioSink + 'static,
    F: EventFeed + Clone + 'static,
{
    pub fn new(
        config: SessionConfig,
        brain: B,
        caster: S,
        sink: A,
        feed: F,
        transcript: TranscriptStore,
    ) -> Self {
        Self {
            brain,
            caster: Arc::new(caster),
            sink: Arc::new(sink),
            feed,
            transcript,
            config,
            tally: MatchTally::new(),
            round: 0,
            board: Arc::new(Mutex::new(CommentaryBoard::default())),
        }
    }

    pub async fn boot(&mut self, full_config: &RumbleConfig) -> Result<()> {
        init_tracing(&full_config.ops)?;
        ensure_transcript_dir(&full_config.ops.transcript_dir)?;

        self.brain.warm_up().await?;
        self.feed.run().await?;

        let lifecycle = SystemEvent::new(
            EventKind::Lifecycle,
            EventPayload::Lifecycle(LifecycleEvent {
                phase: LifecyclePhase::Boot,
                details: Some("arena boot complete".into()),
            }),
        );
        self.publish(lifecycle).await?;
        Ok(())
    }

    /// Plays one round. The returned report is final; commentary for it may
    /// still arrive on the feed afterwards, or never.
    pub async fn play_round(&mut self, player_move: Move) -> Result<RoundReport> {
        self.round += 1;
        let round = self.round;
        self.set_board(CommentaryBoard {
            round,
            text: None,
            loading: true,
        })?;

        if let Err(err) = self.sink.play_clip(SoundCue::Select).await {
            warn!("Select clip playback failed: {err}");
        }

        let opponent_move = self.brain.choose(round).await?;
        let outcome = resolve(player_move, opponent_move);
        let tally = self.tally.record(outcome);
        info!(
            "Round {round}: {} ({player_move}) vs {} ({opponent_move}) -> {outcome}",
            player_move.champion().name,
            opponent_move.champion().name,
        );

        if let Err(err) = self.sink.play_clip(SoundCue::for_outcome(outcome)).await {
            warn!("Outcome clip playback failed: {err}");
        }

        let round_event = RoundEvent {
            round,
            player_move,
            opponent_move,
            outcome,
            tally,
        };
        self.transcript.record_round(round_event.clone()).await?;
        self.publish(SystemEvent::new(
            EventKind::Round,
            EventPayload::Round(round_event),
        ))
        .await?;

        self.spawn_commentary(CommentaryRequest::new(
            round,
            player_move,
            opponent_move,
            outcome,
        ));

        Ok(RoundReport {
            round,
            player_move,
            opponent_move,
            outcome,
            tally,
        })
    }

    /// Zeroes the tally and clears the shoutcaster box. The generation still
    /// advances so any in-flight commentary lands stale.
    pub fn reset(&mut self) -> Result<MatchTally> {
        self.round += 1;
        self.set_board(CommentaryBoard {
            round: self.round,
            text: None,
            loading: false,
        })?;
        Ok(self.tally.reset())
    }

    pub fn tally(&self) -> MatchTally {
        self.tally
    }

    pub fn commentary(&self) -> CommentaryBoard {
        self.board
            .lock()
            .map(|board| board.clone())
            .unwrap_or_default()
    }

    fn set_board(&self, board: CommentaryBoard) -> Result<()> {
        let mut slot = self
            .board
            .lock()
            .map_err(|_| session_error("failed to lock commentary board"))?;
        *slot = board;
        Ok(())
    }

    /// Fires the decorative half of the round: commentary text, then
    /// optional speech. Nothing in here can fail the round; every error is
    /// logged and swallowed.
    fn spawn_commentary(&self, request: CommentaryRequest) {
        let caster = Arc::clone(&self.caster);
        let sink = Arc::clone(&self.sink);
        let board = Arc::clone(&self.board);
        let feed = self.feed.clone();
        let transcript = self.transcript.clone();

        tokio::spawn(async move {
            let text = caster.commentate(&request).await;
            let speech = caster.synthesize(&text).await;

            {
                let Ok(mut board) = board.lock() else { return };
                if board.round != request.round {
                    debug!(
                        "Discarding stale commentary for round {} (now on {})",
                        request.round, board.round
                    );
                    return;
                }
                board.text = Some(text.clone());
                board.loading = false;
            }

            let event = SystemEvent::new(
                EventKind::Commentary,
                EventPayload::Commentary(CommentaryEvent {
                    round: request.round,
                    text,
                }),
            );
            if let Err(err) = transcript.record_event(event.clone()).await {
                warn!("Failed to record commentary: {err}");
            }
            if let Err(err) = feed.publish(event).await {
                warn!("Failed to publish commentary: {err}");
            }
            if let Err(err) = sink.play_clip(SoundCue::Commentary).await {
                warn!("Commentary clip playback failed: {err}");
            }

            if let Some(payload) = speech {
                match decode_payload(&payload) {
                    Ok(buffer) => {
                        if let Err(err) = sink.play_buffer(buffer).await {
                            warn!("Speech playback failed: {err}");
                        }
                    }
                    // Malformed payload from the service: no audio this
                    // round, the round itself already stands.
                    Err(err) => warn!("Speech payload rejected: {err}"),
                }
            }
        });
    }

    async fn publish(&self, event: SystemEvent) -> Result<()> {
        let cloned = event.clone();
        self.feed.publish(event).await?;
        self.transcript.record_event(cloned).await?;
        Ok(())
    }
}

#[async_trait]
pub trait ExhibitionRunner {
    async fn run(&mut self) -> Result<()>;
}

#[async_trait]
impl<B, S, A, F> ExhibitionRunner for Session<B, S, A, F>
where
    B: OpponentBrain,
    S: Shoutcaster + 'static,
    A: AudioSink + 'static,
    F: EventFeed + Clone + 'static,
{
    async fn run(&mut self) -> Result<()> {
        let start_event = SystemEvent::new(
            EventKind::Lifecycle,
            EventPayload::Lifecycle(LifecycleEvent {
                phase: LifecyclePhase::MatchStart,
                details: Some("exhibition match started".into()),
            }),
        );
        self.publish(start_event).await?;

        for _ in 0..self.config.exhibition_rounds {
            let pick = {
                let mut rng = rand::rng();
                Move::ALL[rng.random_range(0..Move::ALL.len())]
            };
            self.play_round(pick).await?;
        }

        let end_event = SystemEvent::new(
            EventKind::Lifecycle,
            EventPayload::Lifecycle(LifecycleEvent {
                phase: LifecyclePhase::MatchEnd,
                details: Some("exhibition match completed".into()),
            }),
        );
        self.publish(end_event).await?;
        Ok(())
    }
}

pub fn session_error(message: impl Into<String>) -> RumbleError {
    RumbleError::Session(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use rumble_audio::AudioBuffer;
    use rumble_caster::SilentCaster;
    use rumble_engine::ScriptedBrain;
    use rumble_feed::LocalFeed;
    use rumble_types::commentary::SpeechPayload;
    use rumble_types::config::AudioConfig;
    use tokio::time::{sleep, Duration};

    fn test_config() -> SessionConfig {
        SessionConfig {
            opponent_delay_ms: 0,
            exhibition_rounds: 3,
        }
    }

    fn quiet_sink() -> rumble_audio::ConsoleSink {
        rumble_audio::ConsoleSink::new(AudioConfig {
            volume: 0.0,
            muted: true,
        })
    }

    /// Caster that waits before answering, for racing rounds against each
    /// other.
    struct SlowCaster {
        delay_ms: u64,
    }

    #[async_trait]
    impl Shoutcaster for SlowCaster {
        async fn commentate(&self, request: &CommentaryRequest) -> String {
            sleep(Duration::from_millis(self.delay_ms)).await;
            format!("commentary for round {}", request.round)
        }

        async fn synthesize(&self, _text: &str) -> Option<SpeechPayload> {
            None
        }
    }

    /// Caster whose speech payload is garbage, to prove decode failures stay
    /// contained.
    struct BrokenSpeechCaster;

    #[async_trait]
    impl Shoutcaster for BrokenSpeechCaster {
        async fn commentate(&self, request: &CommentaryRequest) -> String {
            format!("round {} in the books", request.round)
        }

        async fn synthesize(&self, _text: &str) -> Option<SpeechPayload> {
            Some(SpeechPayload {
                data: "!!not-base64!!".into(),
                sample_rate_hz: 24_000,
                channel_count: 1,
            })
        }
    }

    /// Sink that refuses every playback request.
    struct DeadSink;

    #[async_trait]
    impl AudioSink for DeadSink {
        async fn play_buffer(&self, _buffer: AudioBuffer) -> Result<()> {
            Err(RumbleError::Audio("device unavailable".into()))
        }

        async fn play_clip(&self, _cue: SoundCue) -> Result<()> {
            Err(RumbleError::Audio("device unavailable".into()))
        }
    }

    #[tokio::test]
    async fn forced_matchups_resolve_and_tally() {
        let brain = ScriptedBrain::new([Move::Scissors, Move::Paper, Move::Rock]);
        let mut session = Session::new(
            test_config(),
            brain,
            SilentCaster,
            quiet_sink(),
            LocalFeed::new(16),
            TranscriptStore::new(),
        );

        let report = session.play_round(Move::Rock).await.expect("round 1");
        assert_eq!(report.outcome, Outcome::Victory);
        assert_eq!((report.tally.wins, report.tally.losses, report.tally.rounds), (1, 0, 1));

        session.reset().expect("reset");
        let report = session.play_round(Move::Rock).await.expect("round 2");
        assert_eq!(report.outcome, Outcome::Defeat);
        assert_eq!((report.tally.wins, report.tally.losses, report.tally.rounds), (0, 1, 1));

        session.reset().expect("reset");
        let report = session.play_round(Move::Rock).await.expect("round 3");
        assert_eq!(report.outcome, Outcome::Draw);
        assert_eq!((report.tally.wins, report.tally.losses, report.tally.rounds), (0, 0, 1));
        assert_eq!(report.tally.draws(), 1);
    }

    #[tokio::test]
    async fn tally_accumulates_across_rounds() {
        let brain = ScriptedBrain::new([
            Move::Scissors, // vs Rock: win
            Move::Rock,     // vs Rock: draw
            Move::Paper,    // vs Rock: loss
            Move::Scissors, // vs Paper: loss
        ]);
        let mut session = Session::new(
            test_config(),
            brain,
            SilentCaster,
            quiet_sink(),
            LocalFeed::new(16),
            TranscriptStore::new(),
        );

        for mv in [Move::Rock, Move::Rock, Move::Rock, Move::Paper] {
            session.play_round(mv).await.expect("round");
        }

        let tally = session.tally();
        assert_eq!((tally.wins, tally.losses, tally.rounds), (1, 2, 4));
        assert_eq!(tally.draws(), 1);
    }

    #[tokio::test]
    async fn commentary_lands_on_the_board_and_feed() {
        let brain = ScriptedBrain::new([Move::Scissors]);
        let feed = LocalFeed::new(16);
        let mut commentary_stream = feed.subscribe_kind(EventKind::Commentary);
        let mut session = Session::new(
            test_config(),
            brain,
            SlowCaster { delay_ms: 5 },
            quiet_sink(),
            feed,
            TranscriptStore::new(),
        );

        session.play_round(Move::Rock).await.expect("round");
        assert!(session.commentary().loading);

        let event = commentary_stream.next().await.expect("commentary event");
        match event.payload {
            EventPayload::Commentary(commentary) => {
                assert_eq!(commentary.round, 1);
                assert_eq!(commentary.text, "commentary for round 1");
            }
            other => panic!("unexpected payload {other:?}"),
        }

        let board = session.commentary();
        assert_eq!(board.round, 1);
        assert!(!board.loading);
        assert_eq!(board.text.as_deref(), Some("commentary for round 1"));
    }

    #[tokio::test]
    async fn stale_commentary_is_discarded() {
        let brain = ScriptedBrain::new([Move::Scissors, Move::Paper]);
        let feed = LocalFeed::new(16);
        let mut commentary_stream = feed.subscribe_kind(EventKind::Commentary);
        let mut session = Session::new(
            test_config(),
            brain,
            SlowCaster { delay_ms: 40 },
            quiet_sink(),
            feed,
            TranscriptStore::new(),
        );

        // Second round starts before the first round's commentary resolves.
        session.play_round(Move::Rock).await.expect("round 1");
        session.play_round(Move::Rock).await.expect("round 2");

        // Only the current round's commentary may reach the feed.
        let event = commentary_stream.next().await.expect("commentary event");
        match event.payload {
            EventPayload::Commentary(commentary) => assert_eq!(commentary.round, 2),
            other => panic!("unexpected payload {other:?}"),
        }

        sleep(Duration::from_millis(100)).await;
        let board = session.commentary();
        assert_eq!(board.round, 2);
        assert_eq!(board.text.as_deref(), Some("commentary for round 2"));
    }

    #[tokio::test]
    async fn audio_and_speech_failures_never_break_the_round() {
        let brain = ScriptedBrain::new([Move::Scissors, Move::Paper]);
        let mut session = Session::new(
            test_config(),
            brain,
            BrokenSpeechCaster,
            DeadSink,
            LocalFeed::new(16),
            TranscriptStore::new(),
        );

        let report = session.play_round(Move::Rock).await.expect("round resolves");
        assert_eq!(report.outcome, Outcome::Victory);

        // Let the commentary task hit the broken decode path.
        sleep(Duration::from_millis(50)).await;
        let board = session.commentary();
        assert_eq!(board.text.as_deref(), Some("round 1 in the books"));

        let report = session.play_round(Move::Rock).await.expect("next round");
        assert_eq!(report.tally.rounds, 2);
    }

    #[tokio::test]
    async fn reset_clears_tally_and_board() {
        let brain = ScriptedBrain::new([Move::Scissors]);
        let mut session = Session::new(
            test_config(),
            brain,
            SlowCaster { delay_ms: 1 },
            quiet_sink(),
            LocalFeed::new(16),
            TranscriptStore::new(),
        );

        session.play_round(Move::Rock).await.expect("round");
        sleep(Duration::from_millis(30)).await;
        assert!(session.commentary().text.is_some());

        let tally = session.reset().expect("reset");
        assert_eq!(tally, MatchTally::default());
        let board = session.commentary();
        assert_eq!(board.text, None);
        assert!(!board.loading);
    }

    #[tokio::test]
    async fn exhibition_plays_the_configured_rounds() {
        let brain = ScriptedBrain::new([Move::Rock, Move::Paper, Move::Scissors]);
        let transcript = TranscriptStore::new();
        let mut session = Session::new(
            test_config(),
            brain,
            SilentCaster,
            quiet_sink(),
            LocalFeed::new(16),
            transcript.clone(),
        );

        session.run().await.expect("exhibition");
        let rounds = transcript.snapshot_rounds().await;
        assert_eq!(rounds.len(), 3);
        assert_eq!(session.tally().rounds, 3);
    }
}
