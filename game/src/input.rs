use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::card::CardId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputEvent {
    CardSelected(CardId),
    RestartRequested,
}

/// Anything that produces player input for a session.
pub trait InputSource {
    fn next_event(&mut self) -> Option<InputEvent>;
}

/// A fixed queue of events, drained front to back.
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    queue: VecDeque<InputEvent>,
}

impl ScriptedInput {
    pub fn push(&mut self, event: InputEvent) {
        self.queue.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl FromIterator<InputEvent> for ScriptedInput {
    fn from_iter<T: IntoIterator<Item = InputEvent>>(iter: T) -> Self {
        Self {
            queue: iter.into_iter().collect(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn next_event(&mut self) -> Option<InputEvent> {
        self.queue.pop_front()
    }
}
