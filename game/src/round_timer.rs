use serde::{Deserialize, Serialize};

/// Whole-second countdown for a time boxed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundTimer {
    elapsed_secs: u64,
    limit_secs: u64,
}

impl RoundTimer {
    pub fn new(limit_secs: u64) -> Self {
        Self {
            elapsed_secs: 0,
            limit_secs,
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn limit_secs(&self) -> u64 {
        self.limit_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.limit_secs.saturating_sub(self.elapsed_secs)
    }

    pub fn is_up(&self) -> bool {
        self.elapsed_secs >= self.limit_secs
    }

    pub fn tick_if_running(&mut self, secs: u64, running: bool) {
        if !running || self.is_up() {
            return;
        }
        self.elapsed_secs = self.elapsed_secs.saturating_add(secs).min(self.limit_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_counts_only_while_running() {
        let mut t = RoundTimer::new(180);
        t.tick_if_running(1, false);
        assert_eq!(t.elapsed_secs(), 0);

        t.tick_if_running(2, true);
        assert_eq!(t.remaining_secs(), 178);

        t.tick_if_running(3, false);
        assert_eq!(t.remaining_secs(), 178);
    }

    #[test]
    fn overshooting_tick_clamps_at_limit() {
        let mut t = RoundTimer::new(10);
        t.tick_if_running(25, true);
        assert!(t.is_up());
        assert_eq!(t.elapsed_secs(), 10);
        assert_eq!(t.remaining_secs(), 0);

        t.tick_if_running(5, true);
        assert_eq!(t.elapsed_secs(), 10);
    }

    #[test]
    fn zero_length_round_starts_up() {
        assert!(RoundTimer::new(0).is_up());
    }
}
