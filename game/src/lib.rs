pub mod agent;
pub mod card;
pub mod config;
pub mod deck;
pub mod error;
pub mod headful;
pub mod input;
pub mod memoji;
pub mod remote;
pub mod renderer;
pub mod round_timer;
pub mod session;
pub mod symbol;
pub mod telemetry;

pub use card::{Card, CardFace, CardId};
pub use config::GameConfig;
pub use error::{ConfigError, GameError};
pub use memoji::{Memoji, Outcome, RoundSignal};
pub use symbol::Symbol;
