use tracing::warn;

use crate::grid::{Coord, GRID_SIZE, Grid};
use crate::matcher::find_matches;
use crate::session::{MoveOutcome, Session};

/// A swap that would produce at least one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateMove {
    pub from: Coord,
    pub to: Coord,
    /// Size of the match set right after the swap, before any cascade.
    pub matched: usize,
}

/// Every productive swap on `grid`, scanning each cell's right and lower neighbour.
pub fn candidate_moves(grid: &Grid) -> Vec<CandidateMove> {
    let mut scratch = grid.clone();
    let mut moves = Vec::new();

    for from in Coord::all() {
        let right = Coord::new(from.row, from.col + 1);
        let down = Coord::new(from.row + 1, from.col);
        for to in [right, down] {
            if to.row >= GRID_SIZE || to.col >= GRID_SIZE {
                continue;
            }
            if scratch.swap(from, to).is_err() {
                continue;
            }
            let matched = find_matches(&scratch).len();
            let _ = scratch.swap(from, to);
            if matched > 0 {
                moves.push(CandidateMove { from, to, matched });
            }
        }
    }

    moves
}

/// Largest immediate match; ties go to the first move in row-major order.
pub fn best_move(grid: &Grid) -> Option<CandidateMove> {
    candidate_moves(grid)
        .into_iter()
        .fold(None, |best: Option<CandidateMove>, m| match best {
            Some(b) if b.matched >= m.matched => Some(b),
            _ => Some(m),
        })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaytestReport {
    pub moves: u32,
    pub idle_ticks: u32,
    /// Candidate swaps the session did not resolve. Always zero unless the
    /// candidate scan and the session disagree about what matches.
    pub rejected_moves: u32,
    pub longest_chain: usize,
}

/// Headless driver: one greedy move per simulated second until the round ends.
#[derive(Debug, Clone, Copy)]
pub struct GreedyBot {
    max_moves: u32,
}

impl GreedyBot {
    pub fn new(max_moves: u32) -> Self {
        Self { max_moves }
    }

    pub fn play(&self, session: &mut Session) -> PlaytestReport {
        let mut report = PlaytestReport::default();

        while !session.is_over() && report.moves < self.max_moves {
            match best_move(session.grid()) {
                Some(candidate) => match session.submit_move(candidate.from, candidate.to) {
                    Ok(MoveOutcome::Resolved(cascade)) => {
                        report.moves += 1;
                        report.longest_chain = report.longest_chain.max(cascade.chain_len());
                    }
                    Ok(MoveOutcome::Reverted) => {
                        report.rejected_moves += 1;
                        warn!(from = %candidate.from, to = %candidate.to, "candidate swap was reverted");
                    }
                    Err(err) => {
                        report.rejected_moves += 1;
                        warn!(from = %candidate.from, to = %candidate.to, %err, "candidate swap failed");
                    }
                },
                None => report.idle_ticks += 1,
            }
            session.tick(1);
        }

        report
    }
}
