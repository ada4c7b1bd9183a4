use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use engine::app::{AppConfig, run_game};
use winit::dpi::PhysicalSize;

use memoji::agent::{Recording, RecordingWriter};
use memoji::config::{ConfigStore, GameConfig};
use memoji::headful::{FrameRenderer, HeadfulApp};
use memoji::memoji::Memoji;
use memoji::remote::{RemoteServer, drain_remote_commands, snapshot};
use memoji::renderer::TraceRenderer;
use memoji::session::Session;
use memoji::telemetry;

const DEFAULT_REMOTE_PORT: u16 = 4000;
const HEADLESS_FRAME: Duration = Duration::from_millis(16);

/// Memory matching with emoji pairs.
#[derive(Debug, Parser)]
#[command(name = "memoji", version)]
struct Args {
    /// Config file; defaults to MEMOJI_CONFIG_PATH or the user config dir.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    seed: Option<u64>,

    /// Number of cards; must be even.
    #[arg(long)]
    board_size: Option<usize>,

    /// Round length in seconds.
    #[arg(long)]
    duration: Option<u32>,

    /// Serve the HTTP remote-control API on 127.0.0.1:<port>.
    #[arg(long)]
    remote_port: Option<u16>,

    /// No window; serve the remote API and tick on wall time.
    #[arg(long)]
    headless: bool,

    /// Write every input of this session to a replayable JSON file.
    #[arg(long, value_name = "PATH")]
    record: Option<PathBuf>,

    /// Replay a recording without a window and print the final round state as JSON.
    #[arg(long, value_name = "PATH", conflicts_with_all = ["record", "headless"])]
    replay: Option<PathBuf>,
}

impl Args {
    fn apply(&self, config: &mut GameConfig) {
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(board_size) = self.board_size {
            config.board_size = board_size;
        }
        if let Some(duration) = self.duration {
            config.round_duration_seconds = duration;
        }
    }
}

fn main() -> Result<()> {
    telemetry::init_tracing();
    let args = Args::parse();

    if let Some(path) = &args.replay {
        return replay(path);
    }

    let store = match &args.config {
        Some(path) => ConfigStore::at(path),
        None => ConfigStore::from_env(),
    };
    let mut config = store
        .load()
        .with_context(|| format!("loading config from {}", store.path().display()))?;
    args.apply(&mut config);
    if args.record.is_some() && config.seed.is_none() {
        // A recording is only replayable from a known deal.
        config.seed = Some(rand::random());
    }
    let recorder = args
        .record
        .as_ref()
        .map(|path| RecordingWriter::new(path, config.clone()));

    let game = Memoji::new(&config).context("invalid game configuration")?;
    tracing::info!(
        cards = game.cards().len(),
        duration = config.round_duration_seconds,
        "memoji ready"
    );

    if args.headless {
        let port = args.remote_port.unwrap_or(DEFAULT_REMOTE_PORT);
        let server = RemoteServer::start(port)
            .with_context(|| format!("binding remote api on port {port}"))?;
        let mut session = Session::new(game, TraceRenderer);
        if recorder.is_some() {
            session = session.record_inputs();
        }
        run_headless(session, server, recorder);
        return Ok(());
    }

    let remote = args
        .remote_port
        .map(RemoteServer::start)
        .transpose()
        .context("starting remote api")?;

    let mut session = Session::new(game, FrameRenderer::default());
    let app = match recorder {
        Some(writer) => {
            session = session.record_inputs();
            HeadfulApp::new(session, remote).with_recorder(writer)
        }
        None => HeadfulApp::new(session, remote),
    };
    run_game(
        AppConfig {
            title: "Memoji".to_string(),
            desired_size: PhysicalSize::new(720, 760),
            clamp_to_monitor: true,
        },
        app,
    )
    .map_err(|err| anyhow!("window loop failed: {err}"))
}

fn replay(path: &Path) -> Result<()> {
    let recording = Recording::load_json_file(path)
        .with_context(|| format!("loading recording from {}", path.display()))?;
    let runner = recording
        .replay()
        .context("recording holds an invalid game configuration")?;
    tracing::info!(inputs = runner.frame(), "replayed recording");

    let json = serde_json::to_string_pretty(&snapshot(runner.state()))
        .context("serializing round state")?;
    println!("{json}");
    Ok(())
}

fn run_headless(
    mut session: Session<TraceRenderer>,
    mut server: RemoteServer,
    mut recorder: Option<RecordingWriter>,
) {
    tracing::info!(addr = %server.addr, "running headless");
    let mut last = Instant::now();
    loop {
        drain_remote_commands(Some(&mut server), &mut session);

        let now = Instant::now();
        session.advance(now.saturating_duration_since(last));
        last = now;

        if let (Some(writer), Some(inputs)) = (&mut recorder, session.recording()) {
            if let Err(err) = writer.sync(inputs) {
                tracing::warn!(%err, path = %writer.path().display(), "failed to write recording");
            }
        }

        thread::sleep(HEADLESS_FRAME);
    }
}
