use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigStoreError};
use crate::symbol::{Symbol, default_alphabet, distinct};

pub const DEFAULT_BOARD_SIZE: usize = 16;
pub const DEFAULT_ROUND_DURATION_SECS: u32 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    #[serde(default = "default_alphabet")]
    pub alphabet: Vec<Symbol>,
    #[serde(default = "default_board_size")]
    pub board_size: usize,
    #[serde(default = "default_round_duration")]
    pub round_duration_seconds: u32,
    /// Fixed RNG seed; every deal of the session becomes reproducible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            alphabet: default_alphabet(),
            board_size: default_board_size(),
            round_duration_seconds: default_round_duration(),
            seed: None,
        }
    }
}

/// A configuration that passed [`GameConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundRules {
    pub alphabet: Vec<Symbol>,
    pub pair_count: usize,
    pub duration_secs: u32,
}

impl GameConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<RoundRules, ConfigError> {
        if self.round_duration_seconds == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        if self.board_size == 0 {
            return Err(ConfigError::EmptyBoard);
        }
        if self.board_size % 2 != 0 {
            return Err(ConfigError::OddBoardSize(self.board_size));
        }

        let alphabet = distinct(&self.alphabet);
        let pair_count = self.board_size / 2;
        if alphabet.len() < pair_count {
            return Err(ConfigError::InsufficientAlphabet {
                required: pair_count,
                available: alphabet.len(),
            });
        }

        Ok(RoundRules {
            alphabet,
            pair_count,
            duration_secs: self.round_duration_seconds,
        })
    }
}

fn default_board_size() -> usize {
    DEFAULT_BOARD_SIZE
}

fn default_round_duration() -> u32 {
    DEFAULT_ROUND_DURATION_SECS
}

/// JSON config file location plus load/save.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var_os(key).map(PathBuf::from))
    }

    /// `MEMOJI_CONFIG_PATH`, else `$XDG_CONFIG_HOME/memoji/config.json`, else
    /// `$HOME/.config/memoji/config.json`.
    pub fn from_env_with<F>(mut get_env: F) -> Self
    where
        F: FnMut(&str) -> Option<PathBuf>,
    {
        if let Some(explicit) = get_env("MEMOJI_CONFIG_PATH") {
            return Self { path: explicit };
        }

        let base = get_env("XDG_CONFIG_HOME")
            .or_else(|| get_env("HOME").map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            path: base.join("memoji").join("config.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file yields the defaults; an unreadable or malformed one is an error.
    pub fn load(&self) -> Result<GameConfig, ConfigStoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no config file, using defaults");
                return Ok(GameConfig::default());
            }
            Err(source) => {
                return Err(ConfigStoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_slice(&bytes).map_err(|source| ConfigStoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    pub fn save(&self, config: &GameConfig) -> Result<(), ConfigStoreError> {
        let io_err = |source| ConfigStoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let text = serde_json::to_string_pretty(config).map_err(|source| ConfigStoreError::Parse {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, text).map_err(io_err)
    }
}
