use std::{
    fs, io,
    path::{Path, PathBuf},
};

use engine::{GameLogic, HeadlessRunner, InputLog};
use serde::{Deserialize, Serialize};

use crate::card::CardId;
use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::memoji::Memoji;

/// Inputs a headless runner can record and replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "action")]
pub enum AgentInput {
    Select {
        #[serde(rename = "cardId")]
        card_id: CardId,
    },
    Tick,
    Restart,
}

/// Deterministic game logic for [`engine::HeadlessRunner`].
///
/// The initial deal is built once at construction so every replay starts from the same board.
#[derive(Debug, Clone)]
pub struct MemojiLogic {
    initial: Memoji,
}

impl MemojiLogic {
    /// Unseeded configs get seed 0; replays need a fixed RNG.
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        let mut config = config.clone();
        config.seed.get_or_insert(0);
        Ok(Self {
            initial: Memoji::new(&config)?,
        })
    }

    pub fn from_game(initial: Memoji) -> Self {
        Self { initial }
    }
}

impl GameLogic for MemojiLogic {
    type State = Memoji;
    type Input = AgentInput;

    fn initial_state(&self) -> Self::State {
        self.initial.clone()
    }

    fn step(&self, state: &Self::State, input: Self::Input) -> Self::State {
        let mut next = state.clone();
        apply_input(&mut next, input);
        next
    }
}

/// A recorded session: the config that dealt the first board plus every input since.
///
/// The config always carries a seed, so replaying reaches the same board and the same restarts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    pub config: GameConfig,
    pub inputs: InputLog<AgentInput>,
}

impl Recording {
    pub fn save_json_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, text)
    }

    pub fn load_json_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        serde_json::from_slice(&bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub fn replay(&self) -> Result<HeadlessRunner<MemojiLogic>, ConfigError> {
        let logic = MemojiLogic::new(&self.config)?;
        Ok(HeadlessRunner::replay(logic, &self.inputs))
    }
}

/// Rewrites a recording file whenever the input log has grown.
#[derive(Debug)]
pub struct RecordingWriter {
    path: PathBuf,
    config: GameConfig,
    written: Option<usize>,
}

impl RecordingWriter {
    pub fn new(path: impl Into<PathBuf>, config: GameConfig) -> Self {
        Self {
            path: path.into(),
            config,
            written: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns whether the file was written.
    pub fn sync(&mut self, inputs: &InputLog<AgentInput>) -> io::Result<bool> {
        if self.written == Some(inputs.len()) {
            return Ok(false);
        }
        let recording = Recording {
            config: self.config.clone(),
            inputs: inputs.clone(),
        };
        recording.save_json_file(&self.path)?;
        self.written = Some(inputs.len());
        Ok(true)
    }
}

fn apply_input(game: &mut Memoji, input: AgentInput) {
    match input {
        AgentInput::Select { card_id } => {
            if let Err(err) = game.handle_card_selected(card_id) {
                tracing::warn!(%err, "agent selected an invalid card");
            }
        }
        AgentInput::Tick => {
            game.tick();
        }
        AgentInput::Restart => game.request_restart(),
    }
}
