//! Adaptive polling intervals for long-running jobs.

/// Delay before the first status poll.
const INITIAL_DELAY_MS: u32 = 1_000;

/// Ceiling for the poll interval.
const MAX_DELAY_MS: u32 = 10_000;

/// Re-arming poll interval that grows while a job keeps running.
///
/// Each poll waits 1.5x longer than the previous one, capped at
/// [`MAX_DELAY_MS`], so short jobs get snappy updates and long ones stop
/// hammering the backend. This is a backoff policy, not a scheduler: the
/// owner re-arms a timer with [`next_delay_ms`](Self::next_delay_ms)
/// after each response and stops when the job reaches a terminal status.
#[derive(Debug, Clone)]
pub struct PollBackoff {
    initial_ms: u32,
    max_ms: u32,
    current_ms: Option<u32>,
}

impl Default for PollBackoff {
    fn default() -> Self {
        Self::new(INITIAL_DELAY_MS, MAX_DELAY_MS)
    }
}

impl PollBackoff {
    /// A backoff starting at `initial_ms` and capped at `max_ms`.
    pub fn new(initial_ms: u32, max_ms: u32) -> Self {
        Self {
            initial_ms: initial_ms.max(1),
            max_ms: max_ms.max(initial_ms.max(1)),
            current_ms: None,
        }
    }

    /// Delay to wait before the next poll. Grows by 3/2 per call.
    pub fn next_delay_ms(&mut self) -> u32 {
        let next = match self.current_ms {
            None => self.initial_ms,
            // Integer 1.5x: d + d/2, saturating then capped.
            Some(d) => d.saturating_add(d / 2).min(self.max_ms),
        };
        self.current_ms = Some(next);
        next
    }

    /// Restart from the initial delay (new job being watched).
    pub fn reset(&mut self) {
        self.current_ms = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_growth_sequence() {
        let mut b = PollBackoff::new(1_000, 10_000);
        assert_eq!(b.next_delay_ms(), 1_000);
        assert_eq!(b.next_delay_ms(), 1_500);
        assert_eq!(b.next_delay_ms(), 2_250);
        assert_eq!(b.next_delay_ms(), 3_375);
    }

    #[test]
    fn test_caps_at_max() {
        let mut b = PollBackoff::new(4_000, 10_000);
        let mut last = 0;
        for _ in 0..20 {
            last = b.next_delay_ms();
            assert!(last <= 10_000);
        }
        assert_eq!(last, 10_000);
    }

    #[test]
    fn test_reset_restarts() {
        let mut b = PollBackoff::default();
        let first = b.next_delay_ms();
        b.next_delay_ms();
        b.reset();
        assert_eq!(b.next_delay_ms(), first);
    }

    #[test]
    fn test_degenerate_config() {
        // Zero initial is clamped rather than producing a busy loop.
        let mut b = PollBackoff::new(0, 0);
        assert!(b.next_delay_ms() >= 1);
    }
}
