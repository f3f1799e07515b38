use anyhow::Result;
use clap::Parser;
use rumble_audio::ConsoleSink;
use rumble_caster::GeminiCaster;
use rumble_engine::RandomBrain;
use rumble_feed::LocalFeed;
use rumble_ops::TranscriptStore;
use rumble_session::{ExhibitionRunner, Session};
use rumble_types::config::{
    AudioConfig, CasterConfig, OpsConfig, RumbleConfig, SessionConfig,
};
use tokio::time::{sleep, Duration};
use tracing::info;

/// Runs a Rift Rumble exhibition match from the terminal.
#[derive(Parser)]
#[command(name = "rumble-cli")]
struct Args {
    /// Path to the TOML config file.
    #[arg(long, default_value = "configs/dev.toml")]
    config: String,
    /// Override the number of exhibition rounds.
    #[arg(long)]
    rounds: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(&args.config);
    if let Some(rounds) = args.rounds {
        config.session.exhibition_rounds = rounds.max(1);
    }

    let brain = RandomBrain::new(config.session.opponent_delay_ms);
    let caster = GeminiCaster::new(&config.caster);
    if !caster.has_credential() {
        eprintln!("No API key configured; the casters will stay on canned lines.");
    }
    let sink = ConsoleSink::new(config.audio.clone());
    let feed = LocalFeed::new(64);
    let transcript = TranscriptStore::new();

    let mut session = Session::new(
        config.session.clone(),
        brain,
        caster,
        sink,
        feed,
        transcript.clone(),
    );

    session.boot(&config).await?;
    session.run().await?;

    // Give trailing commentary tasks a moment to land before reading back.
    sleep(Duration::from_secs(2)).await;

    for round in transcript.snapshot_rounds().await {
        info!(
            "Round {}: {} vs {} -> {}",
            round.round, round.player_move, round.opponent_move, round.outcome
        );
    }

    let tally = session.tally();
    println!(
        "Final tally: {} wins / {} losses / {} draws over {} rounds",
        tally.wins,
        tally.losses,
        tally.draws(),
        tally.rounds
    );
    if let Some(line) = session.commentary().text {
        println!("Last call: \"{line}\"");
    }
    Ok(())
}

fn load_config(path: &str) -> RumbleConfig {
    match RumbleConfig::from_file(path) {
        Ok(cfg) => {
            if let Err(err) = cfg.validate() {
                eprintln!(
                    "Invalid config in '{path}': {err}. Falling back to internal defaults."
                );
                default_config()
            } else {
                cfg
            }
        }
        Err(err) => {
            eprintln!(
                "Failed to load config from '{path}': {err}. Falling back to internal defaults."
            );
            default_config()
        }
    }
}

fn default_config() -> RumbleConfig {
    let config = RumbleConfig {
        caster: CasterConfig {
            api_key: None,
            model: "gemini-2.5-flash".into(),
            speech_model: "gemini-2.5-flash-preview-tts".into(),
            voice: "Kore".into(),
            speech: false,
        },
        audio: AudioConfig {
            volume: 0.4,
            muted: false,
        },
        session: SessionConfig {
            opponent_delay_ms: 600,
            exhibition_rounds: 5,
        },
        ops: OpsConfig {
            log_level: "info".into(),
            transcript_dir: "transcripts".into(),
        },
    };
    debug_assert!(config.validate().is_ok());
    config
}
