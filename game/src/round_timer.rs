use std::time::Duration;

use engine::clock::TickAccumulator;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerState {
    Idle,
    Running,
    Stopped,
    Expired,
}

/// Result of feeding time into the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Nothing changed: not running, a stale tick, or not a full interval yet.
    Quiet,
    Ticked { remaining: u32 },
    /// Reported exactly once per countdown, on the tick that reaches zero.
    Expired,
}

/// Round countdown: `Idle -> Running -> Expired`, with `reset` back to a full `Idle`.
///
/// Every transition away from `Running` bumps the epoch so ticks scheduled against an older
/// countdown are dropped instead of landing on the new one.
#[derive(Debug, Clone)]
pub struct RoundTimer {
    duration_secs: u32,
    remaining_secs: u32,
    state: TimerState,
    epoch: u64,
    accumulator: TickAccumulator,
}

impl RoundTimer {
    pub fn new(duration_secs: u32) -> Result<Self, ConfigError> {
        if duration_secs == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        Ok(Self {
            duration_secs,
            remaining_secs: duration_secs,
            state: TimerState::Idle,
            epoch: 0,
            accumulator: TickAccumulator::new(TICK_INTERVAL),
        })
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_idle(&self) -> bool {
        self.state == TimerState::Idle
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn is_expired(&self) -> bool {
        self.state == TimerState::Expired
    }

    /// Starts (or resumes) the countdown. Returns `false` when already running or expired.
    pub fn start(&mut self) -> bool {
        match self.state {
            TimerState::Running | TimerState::Expired => false,
            TimerState::Idle | TimerState::Stopped => {
                self.state = TimerState::Running;
                self.epoch += 1;
                true
            }
        }
    }

    pub fn stop(&mut self) {
        if self.state == TimerState::Running {
            self.state = TimerState::Stopped;
            self.cancel_pending();
        }
    }

    pub fn reset(&mut self) {
        self.state = TimerState::Idle;
        self.remaining_secs = self.duration_secs;
        self.cancel_pending();
    }

    /// One tick interval has elapsed.
    pub fn tick(&mut self) -> TimerEvent {
        if self.state != TimerState::Running {
            return TimerEvent::Quiet;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.state = TimerState::Expired;
            self.cancel_pending();
            return TimerEvent::Expired;
        }
        TimerEvent::Ticked {
            remaining: self.remaining_secs,
        }
    }

    /// A tick scheduled while `epoch` was current.
    pub fn tick_scheduled(&mut self, epoch: u64) -> TimerEvent {
        if epoch != self.epoch {
            tracing::debug!(epoch, current = self.epoch, "dropping stale timer tick");
            return TimerEvent::Quiet;
        }
        self.tick()
    }

    /// Feeds wall-clock time; whole intervals become ticks.
    pub fn advance(&mut self, dt: Duration) -> TimerEvent {
        if self.state != TimerState::Running {
            return TimerEvent::Quiet;
        }

        let mut last = TimerEvent::Quiet;
        for _ in 0..self.accumulator.advance(dt) {
            last = self.tick();
            if last == TimerEvent::Expired {
                break;
            }
        }
        last
    }

    pub fn display(&self) -> String {
        format_clock(self.remaining_secs)
    }

    fn cancel_pending(&mut self) {
        self.epoch += 1;
        self.accumulator.clear();
    }
}

/// `MM:SS`, both zero-padded; minutes are not wrapped at an hour.
pub fn format_clock(total_secs: u32) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
