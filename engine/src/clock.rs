use std::time::Duration;

/// Turns variable frame deltas into a whole number of fixed-length ticks.
///
/// The remainder of a partial interval is carried between calls to [`advance`](Self::advance)
/// and thrown away by [`clear`](Self::clear).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickAccumulator {
    interval: Duration,
    carry: Duration,
}

impl TickAccumulator {
    /// `interval` must be non-zero; a zero interval never produces ticks.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            carry: Duration::ZERO,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time accumulated towards the next tick.
    pub fn carry(&self) -> Duration {
        self.carry
    }

    pub fn advance(&mut self, dt: Duration) -> u32 {
        if self.interval.is_zero() {
            return 0;
        }

        self.carry = self.carry.saturating_add(dt);
        let mut ticks = 0u32;
        while self.carry >= self.interval {
            self.carry -= self.interval;
            ticks = ticks.saturating_add(1);
        }
        ticks
    }

    pub fn clear(&mut self) {
        self.carry = Duration::ZERO;
    }
}
