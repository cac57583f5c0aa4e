use serde::{Deserialize, Serialize};
use tracing::info;

use crate::grid::Gem;

pub const DEFAULT_INITIAL_THRESHOLD: u64 = 3;
pub const DEFAULT_THRESHOLD_STEP: u64 = 3;
pub const DEFAULT_LEVEL_UPS_PER_DOUBLING: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressionTuning {
    /// Experience needed for the first level-up of every kind.
    pub initial_threshold: u64,
    /// Added to a kind's threshold after each of its level-ups.
    pub threshold_step: u64,
    /// The global multiplier doubles every this many cumulative level-ups.
    pub level_ups_per_doubling: u64,
}

impl Default for ProgressionTuning {
    fn default() -> Self {
        Self {
            initial_threshold: DEFAULT_INITIAL_THRESHOLD,
            threshold_step: DEFAULT_THRESHOLD_STEP,
            level_ups_per_doubling: DEFAULT_LEVEL_UPS_PER_DOUBLING,
        }
    }
}

impl ProgressionTuning {
    pub fn sanitized(mut self) -> Self {
        self.initial_threshold = self.initial_threshold.max(1);
        self.level_ups_per_doubling = self.level_ups_per_doubling.max(1);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindProgress {
    pub level: u32,
    pub experience: u64,
    pub experience_to_next: u64,
}

impl KindProgress {
    fn new(tuning: &ProgressionTuning) -> Self {
        Self {
            level: 1,
            experience: 0,
            experience_to_next: tuning.initial_threshold,
        }
    }

    /// Progress-bar fill towards the next level, in `0.0..1.0`.
    pub fn fill_ratio(&self) -> f32 {
        if self.experience_to_next == 0 {
            return 0.0;
        }
        (self.experience as f64 / self.experience_to_next as f64).clamp(0.0, 1.0) as f32
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelUpReport {
    pub experience_gained: u64,
    pub levels_gained: u32,
    pub multiplier_doublings: u32,
}

/// Per-kind levels plus the session-wide multiplier they unlock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionState {
    kinds: [KindProgress; Gem::COUNT],
    total_level_ups: u64,
    global_multiplier: u64,
    tuning: ProgressionTuning,
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self::new(ProgressionTuning::default())
    }
}

impl ProgressionState {
    pub fn new(tuning: ProgressionTuning) -> Self {
        let tuning = tuning.sanitized();
        Self {
            kinds: [KindProgress::new(&tuning); Gem::COUNT],
            total_level_ups: 0,
            global_multiplier: 1,
            tuning,
        }
    }

    pub fn kind(&self, kind: Gem) -> &KindProgress {
        &self.kinds[kind.index()]
    }

    pub fn level(&self, kind: Gem) -> u32 {
        self.kind(kind).level
    }

    pub fn experience(&self, kind: Gem) -> u64 {
        self.kind(kind).experience
    }

    pub fn experience_to_next(&self, kind: Gem) -> u64 {
        self.kind(kind).experience_to_next
    }

    pub fn total_level_ups(&self) -> u64 {
        self.total_level_ups
    }

    pub fn global_multiplier(&self) -> u64 {
        self.global_multiplier
    }

    pub fn tuning(&self) -> &ProgressionTuning {
        &self.tuning
    }

    /// Adds `amount` (scaled by the global multiplier) to `kind` and applies
    /// every level-up it pays for.
    ///
    /// Equivalent to repeatedly paying the current threshold while the
    /// experience covers it, doubling the multiplier on every
    /// `level_ups_per_doubling`-th cumulative level-up.
    pub fn award_experience(&mut self, kind: Gem, amount: u64) -> LevelUpReport {
        let gained = amount.saturating_mul(self.global_multiplier);
        let mut report = LevelUpReport {
            experience_gained: gained,
            ..LevelUpReport::default()
        };

        let step = self.tuning.threshold_step;
        let progress = &mut self.kinds[kind.index()];
        progress.experience = progress.experience.saturating_add(gained);

        let (levels, spent) =
            affordable_levels(progress.experience, progress.experience_to_next, step);
        if levels == 0 {
            return report;
        }

        progress.experience -= spent;
        progress.level = progress
            .level
            .saturating_add(u32::try_from(levels).unwrap_or(u32::MAX));
        progress.experience_to_next = progress
            .experience_to_next
            .saturating_add(step.saturating_mul(levels));
        report.levels_gained = u32::try_from(levels).unwrap_or(u32::MAX);

        let period = self.tuning.level_ups_per_doubling.max(1);
        let before = self.total_level_ups;
        self.total_level_ups = before.saturating_add(levels);
        let doublings = self.total_level_ups / period - before / period;
        if doublings > 0 {
            self.global_multiplier = doubled(self.global_multiplier, doublings);
            report.multiplier_doublings = u32::try_from(doublings).unwrap_or(u32::MAX);
            info!(
                total_level_ups = self.total_level_ups,
                global_multiplier = self.global_multiplier,
                "global multiplier doubled"
            );
        }

        report
    }
}

/// Largest `n` such that thresholds `threshold, threshold + step, ...` (n terms)
/// fit in `experience`, together with their total cost.
fn affordable_levels(experience: u64, threshold: u64, step: u64) -> (u64, u64) {
    let cost = |n: u64| -> u128 {
        let n = u128::from(n);
        let linear = n.saturating_mul(u128::from(threshold));
        let triangle = n.saturating_mul(n.saturating_sub(1)) / 2;
        linear.saturating_add(triangle.saturating_mul(u128::from(step)))
    };

    let budget = u128::from(experience);
    let (mut lo, mut hi) = (0u64, experience / threshold.max(1));
    while lo < hi {
        let mid = lo + (hi - lo).div_ceil(2);
        if cost(mid) <= budget {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    // cost(lo) <= budget, which fits in u64.
    (lo, cost(lo) as u64)
}

fn doubled(value: u64, times: u64) -> u64 {
    if value == 0 {
        return 0;
    }
    // Shifting by exactly the leading zeros still fits: the top bit is set.
    if times > u64::from(value.leading_zeros()) {
        return u64::MAX;
    }
    value << times
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_award_can_pay_for_several_levels() {
        let mut progression = ProgressionState::default();
        // 3 + 6 + 9 = 18 buys three levels, leaving 2.
        let report = progression.award_experience(Gem::Emerald, 20);

        assert_eq!(report.levels_gained, 3);
        assert_eq!(progression.level(Gem::Emerald), 4);
        assert_eq!(progression.experience(Gem::Emerald), 2);
        assert_eq!(progression.experience_to_next(Gem::Emerald), 12);
        assert_eq!(progression.total_level_ups(), 3);
        assert_eq!(progression.level(Gem::Ruby), 1);
    }

    #[test]
    fn affordable_levels_matches_paying_one_threshold_at_a_time() {
        for (experience, threshold, step) in [(0, 3, 3), (2, 3, 3), (3, 3, 3), (500, 3, 3), (77, 5, 0), (1_000, 1, 7)] {
            let (mut left, mut next, mut levels) = (experience, threshold, 0);
            while left >= next {
                left -= next;
                next += step;
                levels += 1;
            }
            assert_eq!(
                affordable_levels(experience, threshold, step),
                (levels, experience - left),
                "experience {experience}, threshold {threshold}, step {step}"
            );
        }
    }

    #[test]
    fn saturated_experience_resolves_without_stalling() {
        let mut progression = ProgressionState::default();
        let report = progression.award_experience(Gem::Ruby, u64::MAX);
        assert!(report.levels_gained > 1_000_000);
        assert_eq!(progression.global_multiplier(), u64::MAX);
        assert!(progression.experience(Gem::Ruby) < progression.experience_to_next(Gem::Ruby));
    }

    #[test]
    fn zero_thresholds_are_sanitized() {
        let tuning = ProgressionTuning {
            initial_threshold: 0,
            threshold_step: 0,
            level_ups_per_doubling: 0,
        }
        .sanitized();
        assert_eq!(tuning.initial_threshold, 1);
        assert_eq!(tuning.level_ups_per_doubling, 1);
    }

    #[test]
    fn fill_ratio_tracks_experience() {
        let mut progression = ProgressionState::default();
        progression.award_experience(Gem::Topaz, 2);
        let ratio = progression.kind(Gem::Topaz).fill_ratio();
        assert!((ratio - 2.0 / 3.0).abs() < 1e-6);
    }
}
