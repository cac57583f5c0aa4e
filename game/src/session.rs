use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::cascade::{self, CascadeReport};
use crate::error::EngineError;
use crate::grid::{Coord, Grid};
use crate::matcher::{MatchSet, find_matches};
use crate::progression::ProgressionState;
use crate::round_timer::RoundTimer;
use crate::settings::EngineSettings;
use crate::view::SessionView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Running,
    Resolving,
    Over,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub grid: Grid,
    pub score: u64,
    pub round_timer: RoundTimer,
    pub progression: ProgressionState,
    pub phase: SessionPhase,
}

impl SessionState {
    pub fn time_remaining_secs(&self) -> u64 {
        self.round_timer.remaining_secs()
    }
}

/// What just happened, handed to observers together with the state it produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    MoveAccepted { from: Coord, to: Coord },
    MoveReverted { from: Coord, to: Coord },
    CascadeStep { index: usize, points: u64 },
    Tick { remaining_secs: u64 },
    Over,
}

/// Render hook for the presentation layer.
pub trait SessionObserver {
    fn on_event(&mut self, state: &SessionState, event: &SessionEvent);
}

impl<F> SessionObserver for F
where
    F: FnMut(&SessionState, &SessionEvent),
{
    fn on_event(&mut self, state: &SessionState, event: &SessionEvent) {
        self(state, event)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_event(&mut self, _state: &SessionState, _event: &SessionEvent) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The swap produced no match and was undone.
    Reverted,
    Resolved(CascadeReport),
}

/// One timed round: board, score, progression and the RNG that refills the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "SessionSnapshot")]
pub struct Session {
    state: SessionState,
    seed: u64,
    rng: ChaCha8Rng,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionSnapshot {
    state: SessionState,
    seed: u64,
    rng: ChaCha8Rng,
}

/// Restored sessions are always at rest: a full board, and `Resolving` only
/// ever seen by observers becomes `Running` again.
impl TryFrom<SessionSnapshot> for Session {
    type Error = EngineError;

    fn try_from(snapshot: SessionSnapshot) -> Result<Self, Self::Error> {
        let SessionSnapshot {
            mut state,
            seed,
            rng,
        } = snapshot;

        let empty = state.grid.empty_coords().len();
        if empty > 0 {
            return Err(EngineError::IncompleteGrid { empty });
        }
        if state.phase == SessionPhase::Resolving {
            debug!("snapshot taken mid-cascade; restoring as running");
            state.phase = SessionPhase::Running;
        }
        if state.round_timer.is_up() {
            state.phase = SessionPhase::Over;
        }

        Ok(Self { state, seed, rng })
    }
}

impl Session {
    pub fn new(seed: u64) -> Self {
        Self::with_settings(seed, &EngineSettings::default())
    }

    pub fn with_settings(seed: u64, settings: &EngineSettings) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let grid = Grid::filled(&mut rng);
        Self::from_parts(grid, seed, rng, settings)
    }

    /// Starts a session on a prepared board; the seed only drives refills.
    pub fn with_grid(grid: Grid, seed: u64, settings: &EngineSettings) -> Self {
        Self::from_parts(grid, seed, ChaCha8Rng::seed_from_u64(seed), settings)
    }

    fn from_parts(grid: Grid, seed: u64, rng: ChaCha8Rng, settings: &EngineSettings) -> Self {
        let settings = settings.sanitized();
        Self {
            state: SessionState {
                grid,
                score: 0,
                round_timer: RoundTimer::new(settings.round_seconds),
                progression: ProgressionState::new(settings.progression),
                phase: SessionPhase::Running,
            },
            seed,
            rng,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn grid(&self) -> &Grid {
        &self.state.grid
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    pub fn progression(&self) -> &ProgressionState {
        &self.state.progression
    }

    pub fn time_remaining_secs(&self) -> u64 {
        self.state.time_remaining_secs()
    }

    pub fn is_over(&self) -> bool {
        self.state.phase == SessionPhase::Over
    }

    pub fn view(&self) -> SessionView {
        SessionView::from_state(&self.state)
    }

    pub fn submit_move(&mut self, from: Coord, to: Coord) -> Result<MoveOutcome, EngineError> {
        self.submit_move_observed(from, to, &mut NoopObserver)
    }

    /// Swaps two neighbouring gems. A swap that matches nothing is undone;
    /// otherwise the board is resolved until it is stable again.
    pub fn submit_move_observed(
        &mut self,
        from: Coord,
        to: Coord,
        observer: &mut dyn SessionObserver,
    ) -> Result<MoveOutcome, EngineError> {
        if self.state.phase != SessionPhase::Running {
            return Err(EngineError::InvalidStateTransition {
                phase: self.state.phase,
                action: "submit a move",
            });
        }
        for coord in [from, to] {
            if !coord.in_bounds() {
                return Err(EngineError::OutOfBounds { coord });
            }
        }
        if !from.is_adjacent(to) {
            return Err(EngineError::InvalidMove { from, to });
        }

        self.state.grid.swap(from, to)?;
        let matches = find_matches(&self.state.grid);
        if matches.is_empty() {
            self.state.grid.swap(from, to)?;
            trace!(%from, %to, "swap made no match; reverted");
            observer.on_event(&self.state, &SessionEvent::MoveReverted { from, to });
            return Ok(MoveOutcome::Reverted);
        }

        self.state.phase = SessionPhase::Resolving;
        observer.on_event(&self.state, &SessionEvent::MoveAccepted { from, to });

        let resolved = self.resolve_cascade(matches, observer);
        self.state.phase = SessionPhase::Running;
        let report = resolved?;

        debug!(
            %from,
            %to,
            chain = report.chain_len(),
            points = report.total_points,
            score = self.state.score,
            "move resolved"
        );
        Ok(MoveOutcome::Resolved(report))
    }

    fn resolve_cascade(
        &mut self,
        matches: MatchSet,
        observer: &mut dyn SessionObserver,
    ) -> Result<CascadeReport, EngineError> {
        let mut report = CascadeReport::default();
        let mut matches = matches;
        while !matches.is_empty() {
            let step = cascade::resolve_step(
                &mut self.state.grid,
                &matches,
                &mut self.state.progression,
                &mut self.state.score,
                &mut self.rng,
            )?;
            let event = SessionEvent::CascadeStep {
                index: report.steps.len(),
                points: step.points,
            };
            report.push(step);
            observer.on_event(&self.state, &event);
            matches = find_matches(&self.state.grid);
        }
        Ok(report)
    }

    pub fn tick(&mut self, elapsed_secs: u64) -> SessionPhase {
        self.tick_observed(elapsed_secs, &mut NoopObserver)
    }

    /// Advances the countdown. A finished session ignores ticks.
    pub fn tick_observed(
        &mut self,
        elapsed_secs: u64,
        observer: &mut dyn SessionObserver,
    ) -> SessionPhase {
        let running = self.state.phase != SessionPhase::Over;
        if !running {
            return SessionPhase::Over;
        }

        self.state.round_timer.tick_if_running(elapsed_secs, running);
        let remaining_secs = self.state.time_remaining_secs();
        observer.on_event(&self.state, &SessionEvent::Tick { remaining_secs });

        if self.state.round_timer.is_up() {
            self.finish();
            observer.on_event(&self.state, &SessionEvent::Over);
        }
        self.state.phase
    }

    /// Ends the round early. No-op once the session is over.
    pub fn end_session(&mut self) {
        if self.state.phase != SessionPhase::Over {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.state.phase = SessionPhase::Over;
        info!(
            score = self.state.score,
            total_level_ups = self.state.progression.total_level_ups(),
            global_multiplier = self.state.progression.global_multiplier(),
            "session over"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GRID_SIZE, Gem};
    use crate::playtest::GreedyBot;

    fn one_move_from_a_match() -> Session {
        let mut rows = [[Gem::Sapphire; GRID_SIZE]; GRID_SIZE];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = [Gem::Sapphire, Gem::Emerald, Gem::Topaz][(r + c) % 3];
            }
        }
        let mut grid = Grid::from_rows(rows);
        for (row, col) in [(0, 0), (0, 1), (1, 2)] {
            grid.set(Coord::new(row, col), Gem::Ruby).unwrap();
        }
        Session::with_grid(grid, 7, &EngineSettings::default())
    }

    #[test]
    fn moves_are_rejected_while_resolving() {
        let mut session = one_move_from_a_match();
        session.state.phase = SessionPhase::Resolving;
        let before = session.state.clone();

        let err = session
            .submit_move(Coord::new(1, 2), Coord::new(0, 2))
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidStateTransition {
                phase: SessionPhase::Resolving,
                action: "submit a move",
            }
        );
        assert_eq!(session.state, before);

        // The clock still runs while resolving.
        session.tick(5);
        assert_eq!(session.time_remaining_secs(), 175);
        assert_eq!(session.phase(), SessionPhase::Resolving);
    }

    #[test]
    fn bot_counts_swaps_the_session_refuses() {
        let settings = EngineSettings {
            round_seconds: 5,
            ..EngineSettings::default()
        };
        let mut session = one_move_from_a_match();
        session.state.round_timer = RoundTimer::new(settings.round_seconds);
        session.state.phase = SessionPhase::Resolving;

        let report = GreedyBot::new(10).play(&mut session);

        assert_eq!(report.moves, 0);
        assert_eq!(report.rejected_moves, 5);
        assert_eq!(report.idle_ticks, 0);
        assert!(session.is_over());
    }
}
