use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EngineError;
use crate::grid::{Coord, Grid};
use crate::matcher::{MatchGroup, MatchSet, find_matches, group_matches};
use crate::progression::ProgressionState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredGroup {
    pub group: MatchGroup,
    pub points: u64,
    pub levels_gained: u32,
}

/// One remove / drop / refill pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeStep {
    pub groups: Vec<ScoredGroup>,
    pub cleared: Vec<Coord>,
    pub points: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeReport {
    pub steps: Vec<CascadeStep>,
    pub total_points: u64,
}

impl CascadeReport {
    pub fn push(&mut self, step: CascadeStep) {
        self.total_points = self.total_points.saturating_add(step.points);
        self.steps.push(step);
    }

    pub fn chain_len(&self) -> usize {
        self.steps.len()
    }
}

/// `floor(level * size_multiplier * global_multiplier)`, in integer arithmetic.
pub fn score_group(group: &MatchGroup, progression: &ProgressionState) -> u64 {
    let level = u64::from(progression.level(group.kind));
    let (num, den) = group.multiplier_ratio();
    level
        .saturating_mul(progression.global_multiplier())
        .saturating_mul(num)
        / den
}

/// Scores and clears `matches`, then lets the board settle and refills it.
///
/// Groups are scored in order and each one feeds its size as experience
/// before the next is scored. An empty match set leaves everything untouched.
pub fn resolve_step<R: Rng + ?Sized>(
    grid: &mut Grid,
    matches: &MatchSet,
    progression: &mut ProgressionState,
    score: &mut u64,
    rng: &mut R,
) -> Result<CascadeStep, EngineError> {
    if let Some(&bad) = matches.iter().find(|c| !c.in_bounds()) {
        return Err(EngineError::OutOfBounds { coord: bad });
    }
    if matches.is_empty() {
        return Ok(CascadeStep::default());
    }

    let mut step = CascadeStep::default();
    for group in group_matches(grid, matches) {
        let points = score_group(&group, progression);
        *score = score.saturating_add(points);
        step.points = step.points.saturating_add(points);

        let levels = progression.award_experience(group.kind, group.len() as u64);
        step.groups.push(ScoredGroup {
            group,
            points,
            levels_gained: levels.levels_gained,
        });
    }

    for &coord in matches {
        grid.clear(coord)?;
        step.cleared.push(coord);
    }

    let dropped = grid.apply_gravity();
    let empties = grid.empty_coords();
    grid.random_fill(&empties, rng)?;

    debug!(
        groups = step.groups.len(),
        cleared = step.cleared.len(),
        dropped,
        points = step.points,
        "cascade step resolved"
    );
    Ok(step)
}

/// Runs cascade steps until a pass leaves no matches on the board.
pub fn resolve<R: Rng + ?Sized>(
    grid: &mut Grid,
    matches: MatchSet,
    progression: &mut ProgressionState,
    score: &mut u64,
    rng: &mut R,
) -> Result<CascadeReport, EngineError> {
    let mut report = CascadeReport::default();
    let mut matches = matches;
    while !matches.is_empty() {
        let step = resolve_step(grid, &matches, progression, score, rng)?;
        report.push(step);
        matches = find_matches(grid);
    }
    Ok(report)
}
