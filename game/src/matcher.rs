use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::grid::{Coord, GRID_SIZE, Gem, Grid};

pub const MIN_RUN_LEN: usize = 3;

/// Coordinates taking part in at least one match. Ordered row-major.
pub type MatchSet = BTreeSet<Coord>;

/// Connected same-kind cells of a match set, scored as one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchGroup {
    pub kind: Gem,
    pub coords: Vec<Coord>,
}

impl MatchGroup {
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Size bonus as an exact ratio: x2 for five or more, x1.5 for four.
    pub fn multiplier_ratio(&self) -> (u64, u64) {
        match self.len() {
            n if n >= 5 => (2, 1),
            4 => (3, 2),
            _ => (1, 1),
        }
    }

    pub fn multiplier(&self) -> f64 {
        let (num, den) = self.multiplier_ratio();
        num as f64 / den as f64
    }
}

/// Union of every horizontal/vertical run of three or more and every
/// uniform 2x2 block. Empty cells never match.
pub fn find_matches(grid: &Grid) -> MatchSet {
    let mut marked = MatchSet::new();
    for i in 0..GRID_SIZE {
        mark_line(grid, (0..GRID_SIZE).map(|col| Coord::new(i, col)), &mut marked);
        mark_line(grid, (0..GRID_SIZE).map(|row| Coord::new(row, i)), &mut marked);
    }
    mark_blocks(grid, &mut marked);
    marked
}

fn mark_line(grid: &Grid, line: impl Iterator<Item = Coord>, marked: &mut MatchSet) {
    let mut run: Vec<Coord> = Vec::with_capacity(GRID_SIZE);
    let mut run_kind: Option<Gem> = None;

    for coord in line {
        let kind = grid.at(coord);
        if kind.is_some() && kind == run_kind {
            run.push(coord);
            continue;
        }
        if run.len() >= MIN_RUN_LEN {
            marked.extend(run.iter().copied());
        }
        run.clear();
        run.push(coord);
        run_kind = kind;
    }

    if run.len() >= MIN_RUN_LEN {
        marked.extend(run);
    }
}

fn mark_blocks(grid: &Grid, marked: &mut MatchSet) {
    for row in 0..GRID_SIZE - 1 {
        for col in 0..GRID_SIZE - 1 {
            let block = [
                Coord::new(row, col),
                Coord::new(row, col + 1),
                Coord::new(row + 1, col),
                Coord::new(row + 1, col + 1),
            ];
            let Some(kind) = grid.at(block[0]) else {
                continue;
            };
            if block[1..].iter().all(|&c| grid.at(c) == Some(kind)) {
                marked.extend(block);
            }
        }
    }
}

/// Partitions a match set into groups.
///
/// Expansion only walks through cells that are themselves in `marked` and
/// share the seed's kind: two matches that touch only via an unmarked gem of
/// the same kind stay separate groups. Groups come out ordered by their
/// first coordinate.
pub fn group_matches(grid: &Grid, marked: &MatchSet) -> Vec<MatchGroup> {
    let mut visited: BTreeSet<Coord> = BTreeSet::new();
    let mut groups = Vec::new();

    for &start in marked {
        if visited.contains(&start) {
            continue;
        }
        let Some(kind) = grid.at(start) else {
            continue;
        };

        visited.insert(start);
        let mut queue = VecDeque::from([start]);
        let mut coords = Vec::new();
        while let Some(coord) = queue.pop_front() {
            coords.push(coord);
            for next in coord.neighbors() {
                if visited.contains(&next) || !marked.contains(&next) || grid.at(next) != Some(kind)
                {
                    continue;
                }
                visited.insert(next);
                queue.push_back(next);
            }
        }

        coords.sort();
        groups.push(MatchGroup { kind, coords });
    }

    groups
}
