use std::time::Duration;

use engine::InputLog;

use crate::agent::AgentInput;
use crate::card::CardFace;
use crate::error::GameError;
use crate::input::{InputEvent, InputSource};
use crate::memoji::{Memoji, Outcome, RoundSignal};
use crate::renderer::{Renderer, card_views};

/// Connects an input source and a renderer to one controller.
///
/// The renderer only hears about cards whose face actually changed and about clock changes,
/// in the order they happen.
#[derive(Debug)]
pub struct Session<R: Renderer> {
    game: Memoji,
    renderer: R,
    faces: Vec<CardFace>,
    clock: String,
    recording: Option<InputLog<AgentInput>>,
}

impl<R: Renderer> Session<R> {
    pub fn new(game: Memoji, renderer: R) -> Self {
        let mut session = Self {
            game,
            renderer,
            faces: Vec::new(),
            clock: String::new(),
            recording: None,
        };
        session.publish_board();
        session
    }

    /// Logs every applied input as an [`AgentInput`] so the session can be replayed headlessly.
    /// Wall-clock time is logged as the whole ticks it produced.
    pub fn record_inputs(mut self) -> Self {
        self.recording = Some(InputLog::new());
        self
    }

    pub fn recording(&self) -> Option<&InputLog<AgentInput>> {
        self.recording.as_ref()
    }

    pub fn game(&self) -> &Memoji {
        &self.game
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_parts(self) -> (Memoji, R) {
        (self.game, self.renderer)
    }

    pub fn dispatch(&mut self, event: InputEvent) -> Result<RoundSignal, GameError> {
        match event {
            InputEvent::CardSelected(id) => {
                let signal = self.game.handle_card_selected(id)?;
                self.record(AgentInput::Select { card_id: id });
                self.publish(signal);
                Ok(signal)
            }
            InputEvent::RestartRequested => {
                self.restart();
                Ok(RoundSignal::Continue)
            }
        }
    }

    /// Dispatches every queued event; stops at the first contract violation.
    pub fn pump<S: InputSource + ?Sized>(&mut self, source: &mut S) -> Result<usize, GameError> {
        let mut handled = 0;
        while let Some(event) = source.next_event() {
            self.dispatch(event)?;
            handled += 1;
        }
        Ok(handled)
    }

    pub fn restart(&mut self) {
        let had_outcome = self.game.outcome().is_some();
        self.game.request_restart();
        self.record(AgentInput::Restart);
        if had_outcome {
            self.renderer.hide_outcome();
        }
        self.publish_board();
    }

    pub fn tick(&mut self) -> RoundSignal {
        self.timed(Memoji::tick)
    }

    pub fn tick_scheduled(&mut self, epoch: u64) -> RoundSignal {
        self.timed(|game| game.tick_scheduled(epoch))
    }

    pub fn advance(&mut self, dt: Duration) -> RoundSignal {
        self.timed(|game| game.advance(dt))
    }

    fn timed(&mut self, feed: impl FnOnce(&mut Memoji) -> RoundSignal) -> RoundSignal {
        let before = self.game.timer().remaining_secs();
        let signal = feed(&mut self.game);
        // Every applied tick takes exactly one second off the clock.
        let ticks = before.saturating_sub(self.game.timer().remaining_secs());
        for _ in 0..ticks {
            self.record(AgentInput::Tick);
        }
        self.publish(signal);
        signal
    }

    fn record(&mut self, input: AgentInput) {
        if let Some(log) = &mut self.recording {
            log.push(input);
        }
    }

    fn publish_board(&mut self) {
        let views = card_views(&self.game);
        self.renderer.board_dealt(&views);
        self.faces = views.iter().map(|view| view.face).collect();
        self.clock = self.game.timer().display();
        self.renderer.timer_changed(&self.clock);
    }

    fn publish(&mut self, signal: RoundSignal) {
        for (id, card) in self.game.cards().iter().enumerate() {
            let face = card.face();
            if self.faces[id] != face {
                self.faces[id] = face;
                self.renderer.card_changed(id, face);
            }
        }

        let clock = self.game.timer().display();
        if clock != self.clock {
            self.renderer.timer_changed(&clock);
            self.clock = clock;
        }

        match signal {
            RoundSignal::Win => self.renderer.show_outcome(Outcome::Won),
            RoundSignal::Lose => self.renderer.show_outcome(Outcome::Lost),
            RoundSignal::Continue => {}
        }
    }
}
