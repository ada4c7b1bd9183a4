//! Round controller: deals the board, resolves turns, and detects the round outcome.

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::card::{Card, CardId};
use crate::config::GameConfig;
use crate::deck;
use crate::error::{ConfigError, GameError};
use crate::round_timer::{RoundTimer, TimerEvent};
use crate::symbol::{Symbol, distinct};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Won,
    Lost,
}

/// What the caller should show after an input or tick.
///
/// `Win` and `Lose` are emitted once, on the transition into the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundSignal {
    Continue,
    Win,
    Lose,
}

#[derive(Debug, Clone)]
pub struct Memoji {
    alphabet: Vec<Symbol>,
    pair_count: usize,
    rng: StdRng,
    cards: Vec<Card>,
    timer: RoundTimer,
    pending: Option<CardId>,
    outcome: Option<Outcome>,
    round: u64,
}

impl Memoji {
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        let rules = config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut game = Self {
            alphabet: Vec::new(),
            pair_count: 0,
            rng,
            cards: Vec::new(),
            timer: RoundTimer::new(rules.duration_secs)?,
            pending: None,
            outcome: None,
            round: 0,
        };
        game.init(&rules.alphabet, rules.pair_count)?;
        Ok(game)
    }

    /// Starts from a fixed, already shuffled layout. Restarts deal randomly from the layout's
    /// symbols.
    pub fn from_layout(
        layout: Vec<Symbol>,
        duration_secs: u32,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        deck::validate_layout(&layout)?;
        let alphabet = distinct(&layout);
        let pair_count = layout.len() / 2;

        let game = Self {
            alphabet,
            pair_count,
            rng: StdRng::seed_from_u64(seed),
            cards: layout.into_iter().map(Card::new).collect(),
            timer: RoundTimer::new(duration_secs)?,
            pending: None,
            outcome: None,
            round: 1,
        };
        debug!(cards = game.cards.len(), "dealt fixed layout");
        Ok(game)
    }

    /// Deals a new round from `alphabet`. On error the current round is left untouched.
    pub fn init(&mut self, alphabet: &[Symbol], pair_count: usize) -> Result<(), ConfigError> {
        let cards = deck::deal(alphabet, pair_count, &mut self.rng)?;

        self.alphabet = distinct(alphabet);
        self.pair_count = pair_count;
        self.cards = cards;
        self.timer.reset();
        self.pending = None;
        self.outcome = None;
        self.round += 1;

        debug!(round = self.round, cards = self.cards.len(), "dealt board");
        Ok(())
    }

    pub fn request_restart(&mut self) {
        let alphabet = self.alphabet.clone();
        match self.init(&alphabet, self.pair_count) {
            Ok(()) => info!(round = self.round, "round restarted"),
            Err(err) => tracing::error!(%err, "restart failed to deal a new board"),
        }
    }

    pub fn handle_card_selected(&mut self, id: CardId) -> Result<RoundSignal, GameError> {
        if id >= self.cards.len() {
            return Err(GameError::UnknownCard {
                id,
                board_size: self.cards.len(),
            });
        }
        if self.outcome.is_some() {
            debug!(id, "round already decided, ignoring selection");
            return Ok(RoundSignal::Continue);
        }

        if self.timer.is_idle() && self.timer.start() {
            debug!(duration = self.timer.duration_secs(), "round timer started");
        }

        let card = &self.cards[id];
        if card.is_matched() || card.is_revealed() {
            debug_assert!(
                card.is_matched() || card.is_mismatched() || self.pending == Some(id),
                "a revealed unresolved card must be the pending one"
            );
            return Ok(RoundSignal::Continue);
        }

        self.cards[id].reveal();
        self.conceal_mismatched();

        match self.pending.take() {
            None => {
                self.pending = Some(id);
                debug!(id, "first card of the turn");
            }
            Some(first) => {
                if self.cards[first].symbol() == self.cards[id].symbol() {
                    self.cards[first].mark_matched();
                    self.cards[id].mark_matched();
                    debug!(first, second = id, "pair matched");
                } else {
                    self.cards[first].mark_mismatched();
                    self.cards[id].mark_mismatched();
                    debug!(first, second = id, "pair mismatched");
                }
            }
        }

        if self.is_cleared() {
            self.timer.stop();
            self.outcome = Some(Outcome::Won);
            info!(round = self.round, remaining = self.timer.remaining_secs(), "round won");
            return Ok(RoundSignal::Win);
        }
        Ok(RoundSignal::Continue)
    }

    /// One timer interval elapsed.
    pub fn tick(&mut self) -> RoundSignal {
        let event = self.timer.tick();
        self.on_timer_event(event)
    }

    /// A tick scheduled against timer epoch `epoch`.
    pub fn tick_scheduled(&mut self, epoch: u64) -> RoundSignal {
        let event = self.timer.tick_scheduled(epoch);
        self.on_timer_event(event)
    }

    pub fn advance(&mut self, dt: Duration) -> RoundSignal {
        let event = self.timer.advance(dt);
        self.on_timer_event(event)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.get(id)
    }

    pub fn pending(&self) -> Option<CardId> {
        self.pending
    }

    pub fn timer(&self) -> &RoundTimer {
        &self.timer
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn alphabet(&self) -> &[Symbol] {
        &self.alphabet
    }

    pub fn pair_count(&self) -> usize {
        self.pair_count
    }

    /// Rounds dealt so far, counting the current one.
    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn is_cleared(&self) -> bool {
        self.cards.iter().all(Card::is_matched)
    }

    fn conceal_mismatched(&mut self) {
        let mut concealed = 0;
        for card in self.cards.iter_mut().filter(|card| card.is_mismatched()) {
            card.conceal();
            concealed += 1;
        }
        if concealed > 0 {
            debug!(concealed, "flipped mismatched cards back");
        }
    }

    fn on_timer_event(&mut self, event: TimerEvent) -> RoundSignal {
        match event {
            TimerEvent::Expired if self.outcome.is_none() && !self.is_cleared() => {
                self.outcome = Some(Outcome::Lost);
                info!(round = self.round, "round lost on timeout");
                RoundSignal::Lose
            }
            TimerEvent::Ticked { remaining } => {
                debug!(remaining, "tick");
                RoundSignal::Continue
            }
            _ => RoundSignal::Continue,
        }
    }
}
