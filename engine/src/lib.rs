pub mod app;
pub mod clock;
pub mod render;
pub mod surface;

use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// An input-driven state machine that can be stepped without a window.
pub trait GameLogic {
    type State;
    type Input;

    fn initial_state(&self) -> Self::State;
    fn step(&self, state: &Self::State, input: Self::Input) -> Self::State;
}

/// Ordered record of every input fed to a runner since its last reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputLog<I> {
    inputs: Vec<I>,
}

impl<I> Default for InputLog<I> {
    fn default() -> Self {
        Self { inputs: Vec::new() }
    }
}

impl<I> InputLog<I> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, input: I) {
        self.inputs.push(input);
    }

    pub fn inputs(&self) -> &[I] {
        &self.inputs
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn clear(&mut self) {
        self.inputs.clear();
    }
}

impl<I: Serialize> InputLog<I> {
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
}

impl<I: DeserializeOwned> InputLog<I> {
    pub fn load_json_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        serde_json::from_slice(&bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

impl<I> FromIterator<I> for InputLog<I> {
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
        Self {
            inputs: iter.into_iter().collect(),
        }
    }
}

/// Steps a [`GameLogic`] and keeps the input log needed to reproduce the current state.
#[derive(Debug)]
pub struct HeadlessRunner<G: GameLogic> {
    game: G,
    state: G::State,
    log: InputLog<G::Input>,
}

impl<G> HeadlessRunner<G>
where
    G: GameLogic,
    G::Input: Clone,
{
    pub fn new(game: G) -> Self {
        let state = game.initial_state();
        Self {
            game,
            state,
            log: InputLog::new(),
        }
    }

    /// Rebuilds a runner by feeding `log` through a fresh initial state.
    pub fn replay(game: G, log: &InputLog<G::Input>) -> Self {
        let mut runner = Self::new(game);
        runner.run(log.inputs().iter().cloned());
        runner
    }

    /// Number of inputs applied since the last reset.
    pub fn frame(&self) -> usize {
        self.log.len()
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn state(&self) -> &G::State {
        &self.state
    }

    pub fn log(&self) -> &InputLog<G::Input> {
        &self.log
    }

    pub fn step(&mut self, input: G::Input) -> usize {
        self.state = self.game.step(&self.state, input.clone());
        self.log.push(input);
        self.log.len()
    }

    pub fn run<I>(&mut self, inputs: I) -> usize
    where
        I: IntoIterator<Item = G::Input>,
    {
        let mut last_frame = self.frame();
        for input in inputs {
            last_frame = self.step(input);
        }
        last_frame
    }

    pub fn reset(&mut self) {
        self.state = self.game.initial_state();
        self.log.clear();
    }
}
