use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct FixedWindow {
    permits: u32,
    period: Duration,
    available: u32,
    window_start: Instant,
}

impl FixedWindow {
    pub fn new(permits: u32, period: Duration, now: Instant) -> Self {
        Self {
            permits,
            period,
            available: permits,
            window_start: now,
        }
    }

    pub fn try_acquire(&mut self, now: Instant) -> bool {
        if self.permits == 0 {
            return false;
        }
        if self.period.is_zero() {
            return true;
        }

        self.refill(now);
        if self.available == 0 {
            return false;
        }
        self.available -= 1;
        true
    }

    pub fn available(&self) -> u32 {
        self.available
    }

    pub fn window_start(&self) -> Instant {
        self.window_start
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.period {
            return;
        }

        let windows = elapsed.as_nanos() / self.period.as_nanos();
        let skipped = u32::try_from(windows)
            .ok()
            .and_then(|w| self.period.checked_mul(w));
        self.window_start = match skipped {
            Some(d) => self.window_start + d,
            None => now,
        };
        self.available = self.permits;
    }
}
