use std::time::Duration;

use memoji::card::CardFace;
use memoji::error::GameError;
use memoji::input::{InputEvent, ScriptedInput};
use memoji::memoji::{Memoji, Outcome, RoundSignal};
use memoji::renderer::{RecordingRenderer, RenderEvent};
use memoji::session::Session;
use memoji::symbol::Symbol;

fn session(duration: u32) -> Session<RecordingRenderer> {
    let layout = ["🐶", "🐱", "🐶", "🐱"].into_iter().map(Symbol::from).collect();
    let game = Memoji::from_layout(layout, duration, 0).unwrap();
    Session::new(game, RecordingRenderer::default())
}

#[test]
fn new_session_publishes_board_and_clock() {
    let mut session = session(90);
    let events = session.renderer_mut().take();

    assert_eq!(events.len(), 2);
    match &events[0] {
        RenderEvent::BoardDealt(cards) => {
            assert_eq!(cards.len(), 4);
            assert!(cards.iter().all(|card| card.face == CardFace::Hidden));
        }
        other => panic!("expected board first, got {other:?}"),
    }
    assert_eq!(events[1], RenderEvent::TimerChanged("01:30".to_string()));
}

#[test]
fn mismatch_then_sweep_is_reported_in_order() {
    let mut session = session(60);
    session.renderer_mut().take();

    let mut input: ScriptedInput = [
        InputEvent::CardSelected(0),
        InputEvent::CardSelected(1),
        InputEvent::CardSelected(3),
    ]
    .into_iter()
    .collect();
    assert_eq!(session.pump(&mut input), Ok(3));

    assert_eq!(
        session.renderer_mut().take(),
        [
            RenderEvent::CardChanged(0, CardFace::Revealed),
            RenderEvent::CardChanged(0, CardFace::Mismatched),
            RenderEvent::CardChanged(1, CardFace::Mismatched),
            RenderEvent::CardChanged(0, CardFace::Hidden),
            RenderEvent::CardChanged(1, CardFace::Hidden),
            RenderEvent::CardChanged(3, CardFace::Revealed),
        ]
    );
}

#[test]
fn clock_changes_only_on_whole_seconds() {
    let mut session = session(60);
    session.dispatch(InputEvent::CardSelected(0)).unwrap();
    session.renderer_mut().take();

    session.advance(Duration::from_millis(400));
    assert!(session.renderer_mut().take().is_empty());

    session.advance(Duration::from_millis(700));
    assert_eq!(
        session.renderer_mut().take(),
        [RenderEvent::TimerChanged("00:59".to_string())]
    );
}

#[test]
fn win_shows_outcome_and_restart_hides_it() {
    let mut session = session(60);
    for id in [0, 2, 1] {
        session.dispatch(InputEvent::CardSelected(id)).unwrap();
    }
    session.renderer_mut().take();

    assert_eq!(
        session.dispatch(InputEvent::CardSelected(3)),
        Ok(RoundSignal::Win)
    );
    assert_eq!(
        session.renderer_mut().take(),
        [
            RenderEvent::CardChanged(1, CardFace::Matched),
            RenderEvent::CardChanged(3, CardFace::Matched),
            RenderEvent::ShowOutcome(Outcome::Won),
        ]
    );

    session.dispatch(InputEvent::RestartRequested).unwrap();
    let events = session.renderer_mut().take();
    assert_eq!(events[0], RenderEvent::HideOutcome);
    assert!(matches!(events[1], RenderEvent::BoardDealt(_)));
    assert_eq!(events[2], RenderEvent::TimerChanged("01:00".to_string()));
}

#[test]
fn timeout_shows_lose_once() {
    let mut session = session(2);
    session.dispatch(InputEvent::CardSelected(0)).unwrap();
    session.renderer_mut().take();

    session.tick();
    session.tick();
    session.tick();

    assert_eq!(
        session.renderer_mut().take(),
        [
            RenderEvent::TimerChanged("00:01".to_string()),
            RenderEvent::TimerChanged("00:00".to_string()),
            RenderEvent::ShowOutcome(Outcome::Lost),
        ]
    );
}

#[test]
fn pump_stops_at_unknown_card() {
    let mut session = session(60);
    let mut input: ScriptedInput = [
        InputEvent::CardSelected(0),
        InputEvent::CardSelected(9),
        InputEvent::CardSelected(1),
    ]
    .into_iter()
    .collect();

    assert_eq!(
        session.pump(&mut input),
        Err(GameError::UnknownCard {
            id: 9,
            board_size: 4
        })
    );
    assert_eq!(input.len(), 1);
    assert_eq!(session.game().pending(), Some(0));
}
