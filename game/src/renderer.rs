use serde::Serialize;

use crate::card::{CardFace, CardId};
use crate::memoji::{Memoji, Outcome};
use crate::symbol::Symbol;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub id: CardId,
    pub face: CardFace,
    pub symbol: Symbol,
}

pub fn card_views(game: &Memoji) -> Vec<CardView> {
    game.cards()
        .iter()
        .enumerate()
        .map(|(id, card)| CardView {
            id,
            face: card.face(),
            symbol: card.symbol().clone(),
        })
        .collect()
}

/// View side of the game. The session calls these as state changes; implementors only draw.
pub trait Renderer {
    fn board_dealt(&mut self, cards: &[CardView]);

    fn card_changed(&mut self, id: CardId, face: CardFace);

    /// Remaining time as `MM:SS`.
    fn timer_changed(&mut self, clock: &str);

    fn show_outcome(&mut self, outcome: Outcome);

    fn hide_outcome(&mut self) {}
}

/// Writes every notification to the log. Used when no window is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct TraceRenderer;

impl Renderer for TraceRenderer {
    fn board_dealt(&mut self, cards: &[CardView]) {
        tracing::debug!(cards = cards.len(), "board dealt");
    }

    fn card_changed(&mut self, id: CardId, face: CardFace) {
        tracing::debug!(id, ?face, "card changed");
    }

    fn timer_changed(&mut self, clock: &str) {
        tracing::trace!(clock, "timer changed");
    }

    fn show_outcome(&mut self, outcome: Outcome) {
        tracing::info!(?outcome, "round over");
    }

    fn hide_outcome(&mut self) {
        tracing::debug!("outcome dismissed");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    BoardDealt(Vec<CardView>),
    CardChanged(CardId, CardFace),
    TimerChanged(String),
    ShowOutcome(Outcome),
    HideOutcome,
}

/// Keeps every notification in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    pub events: Vec<RenderEvent>,
}

impl RecordingRenderer {
    pub fn take(&mut self) -> Vec<RenderEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Renderer for RecordingRenderer {
    fn board_dealt(&mut self, cards: &[CardView]) {
        self.events.push(RenderEvent::BoardDealt(cards.to_vec()));
    }

    fn card_changed(&mut self, id: CardId, face: CardFace) {
        self.events.push(RenderEvent::CardChanged(id, face));
    }

    fn timer_changed(&mut self, clock: &str) {
        self.events.push(RenderEvent::TimerChanged(clock.to_string()));
    }

    fn show_outcome(&mut self, outcome: Outcome) {
        self.events.push(RenderEvent::ShowOutcome(outcome));
    }

    fn hide_outcome(&mut self) {
        self.events.push(RenderEvent::HideOutcome);
    }
}
