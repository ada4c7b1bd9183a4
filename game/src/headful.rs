//! Windowed frontend: draws the board into the pixel buffer and turns clicks into selections.

use std::time::Duration;

use engine::app::{GameApp, InputFrame};
use engine::render::{GridLayout, Rect, blend_rect, clear, fill_rect, stroke_rect};
use engine::surface::SurfaceSize;
use winit::event::VirtualKeyCode;

use crate::agent::RecordingWriter;
use crate::card::{CardFace, CardId};
use crate::input::InputEvent;
use crate::memoji::Outcome;
use crate::remote::{RemoteServer, drain_remote_commands};
use crate::renderer::{CardView, Renderer};
use crate::session::Session;
use crate::symbol::Symbol;

const BACKGROUND: [u8; 4] = [24, 26, 33, 255];
const CARD_BACK: [u8; 4] = [58, 64, 84, 255];
const CARD_EDGE: [u8; 4] = [90, 98, 124, 255];
const MATCHED_EDGE: [u8; 4] = [92, 200, 120, 255];
const MISMATCHED_EDGE: [u8; 4] = [220, 84, 84, 255];
const MATCHED_DIM: [u8; 4] = [24, 26, 33, 110];
const BAR_TRACK: [u8; 4] = [40, 44, 56, 255];
const BAR_FILL: [u8; 4] = [236, 190, 72, 255];
const WIN_OVERLAY: [u8; 4] = [60, 180, 100, 120];
const LOSE_OVERLAY: [u8; 4] = [190, 50, 50, 120];

const PALETTE: [[u8; 4]; 12] = [
    [239, 83, 80, 255],
    [255, 167, 38, 255],
    [255, 238, 88, 255],
    [156, 204, 101, 255],
    [38, 166, 154, 255],
    [41, 182, 246, 255],
    [92, 107, 192, 255],
    [171, 71, 188, 255],
    [236, 64, 122, 255],
    [141, 110, 99, 255],
    [189, 189, 189, 255],
    [255, 255, 255, 255],
];

const BAR_HEIGHT: u32 = 12;
const MARGIN: u32 = 16;
const GAP: u32 = 10;
const EDGE: u32 = 3;

/// Stable colour for a symbol; the pixel buffer has no glyphs, so pairs are told apart by colour.
pub fn symbol_color(symbol: &Symbol) -> [u8; 4] {
    // FNV-1a
    let hash = symbol
        .as_str()
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325u64, |h, b| {
            (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
        });
    PALETTE[(hash % PALETTE.len() as u64) as usize]
}

/// Parses `MM:SS` back into seconds.
pub fn parse_clock(display: &str) -> Option<u32> {
    let (minutes, seconds) = display.split_once(':')?;
    let minutes: u32 = minutes.parse().ok()?;
    let seconds: u32 = seconds.parse().ok()?;
    (seconds < 60).then_some(minutes * 60 + seconds)
}

pub fn board_layout(size: SurfaceSize, count: usize) -> GridLayout {
    let full = Rect::from_size(size);
    let area = Rect::new(0, BAR_HEIGHT, full.w, full.h.saturating_sub(BAR_HEIGHT)).inset(MARGIN);
    GridLayout::fit(area, count, GridLayout::columns_for(count), GAP)
}

/// Keeps what the window needs to draw a frame.
#[derive(Debug, Clone, Default)]
pub struct FrameRenderer {
    cards: Vec<CardView>,
    clock: String,
    full_secs: Option<u32>,
    outcome: Option<Outcome>,
}

impl FrameRenderer {
    pub fn clock(&self) -> &str {
        &self.clock
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn cards(&self) -> &[CardView] {
        &self.cards
    }

    /// Remaining time as a fraction of the round, for the bar.
    pub fn remaining_fraction(&self) -> f32 {
        match (self.full_secs, parse_clock(&self.clock)) {
            (Some(full), Some(left)) if full > 0 => left as f32 / full as f32,
            _ => 1.0,
        }
    }

    pub fn draw(&self, frame: &mut [u8], size: SurfaceSize) {
        if size.is_empty() || frame.len() < size.rgba_len() {
            return;
        }
        clear(frame, size, BACKGROUND);

        let track = Rect::new(0, 0, size.width, BAR_HEIGHT.min(size.height));
        fill_rect(frame, size, track, BAR_TRACK);
        let filled = (size.width as f32 * self.remaining_fraction()).round() as u32;
        fill_rect(frame, size, Rect { w: filled, ..track }, BAR_FILL);

        let layout = board_layout(size, self.cards.len());
        for card in &self.cards {
            let Some(rect) = layout.cell_rect(card.id) else {
                continue;
            };
            match card.face {
                CardFace::Hidden => {
                    fill_rect(frame, size, rect, CARD_BACK);
                    stroke_rect(frame, size, rect, EDGE, CARD_EDGE);
                }
                CardFace::Revealed => {
                    fill_rect(frame, size, rect, symbol_color(&card.symbol));
                }
                CardFace::Matched => {
                    fill_rect(frame, size, rect, symbol_color(&card.symbol));
                    blend_rect(frame, size, rect, MATCHED_DIM);
                    stroke_rect(frame, size, rect, EDGE, MATCHED_EDGE);
                }
                CardFace::Mismatched => {
                    fill_rect(frame, size, rect, symbol_color(&card.symbol));
                    stroke_rect(frame, size, rect, EDGE, MISMATCHED_EDGE);
                }
            }
        }

        match self.outcome {
            Some(Outcome::Won) => blend_rect(frame, size, Rect::from_size(size), WIN_OVERLAY),
            Some(Outcome::Lost) => blend_rect(frame, size, Rect::from_size(size), LOSE_OVERLAY),
            None => {}
        }
    }
}

impl Renderer for FrameRenderer {
    fn board_dealt(&mut self, cards: &[CardView]) {
        self.cards = cards.to_vec();
        self.full_secs = None;
    }

    fn card_changed(&mut self, id: CardId, face: CardFace) {
        if let Some(card) = self.cards.get_mut(id) {
            card.face = face;
        }
    }

    fn timer_changed(&mut self, clock: &str) {
        // The first clock after a deal is the full round.
        if self.full_secs.is_none() {
            self.full_secs = parse_clock(clock);
        }
        self.clock = clock.to_string();
    }

    fn show_outcome(&mut self, outcome: Outcome) {
        self.outcome = Some(outcome);
    }

    fn hide_outcome(&mut self) {
        self.outcome = None;
    }
}

pub struct HeadfulApp {
    session: Session<FrameRenderer>,
    remote: Option<RemoteServer>,
    recorder: Option<RecordingWriter>,
}

impl HeadfulApp {
    pub fn new(session: Session<FrameRenderer>, remote: Option<RemoteServer>) -> Self {
        Self {
            session,
            remote,
            recorder: None,
        }
    }

    /// Keeps `writer` in step with the session's input log. The session must record inputs.
    pub fn with_recorder(mut self, writer: RecordingWriter) -> Self {
        self.recorder = Some(writer);
        self
    }

    pub fn session(&self) -> &Session<FrameRenderer> {
        &self.session
    }

    fn handle_click(&mut self, x: u32, y: u32, size: SurfaceSize) {
        if self.session.game().outcome().is_some() {
            self.session.restart();
            return;
        }

        let layout = board_layout(size, self.session.game().cards().len());
        let Some(id) = layout.hit_test(x, y) else {
            return;
        };
        if let Err(err) = self.session.dispatch(InputEvent::CardSelected(id)) {
            tracing::warn!(%err, "click mapped to a card outside the board");
        }
    }
}

impl GameApp for HeadfulApp {
    fn update(&mut self, input: &InputFrame, dt: Duration, size: SurfaceSize) {
        drain_remote_commands(self.remote.as_mut(), &mut self.session);

        if input.keys.contains(&VirtualKeyCode::R) {
            self.session.restart();
        } else if let Some((x, y)) = input.click {
            self.handle_click(x, y, size);
        }

        self.session.advance(dt);

        if let (Some(writer), Some(inputs)) = (&mut self.recorder, self.session.recording()) {
            if let Err(err) = writer.sync(inputs) {
                tracing::warn!(%err, path = %writer.path().display(), "failed to write recording");
            }
        }
    }

    fn render(&mut self, frame: &mut [u8], size: SurfaceSize) {
        self.session.renderer().draw(frame, size);
    }

    fn title(&self) -> Option<String> {
        let renderer = self.session.renderer();
        let suffix = match renderer.outcome() {
            Some(Outcome::Won) => " - cleared! click to play again",
            Some(Outcome::Lost) => " - time's up! click to play again",
            None => "",
        };
        Some(format!("Memoji {}{suffix}", renderer.clock()))
    }
}
