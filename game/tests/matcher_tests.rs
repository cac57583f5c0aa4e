use std::collections::BTreeSet;

use gemrush::grid::{Coord, GRID_SIZE, Gem, Grid};
use gemrush::matcher::{MIN_RUN_LEN, find_matches, group_matches};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const STRIPES: [Gem; 3] = [Gem::Sapphire, Gem::Emerald, Gem::Topaz];

/// Diagonal stripes of three kinds: no runs and no blocks anywhere.
fn striped_board() -> Grid {
    let mut rows = [[Gem::Sapphire; GRID_SIZE]; GRID_SIZE];
    for (r, row) in rows.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            *cell = STRIPES[(r + c) % 3];
        }
    }
    Grid::from_rows(rows)
}

fn striped_with(kind: Gem, cells: &[(usize, usize)]) -> Grid {
    let mut grid = striped_board();
    for &(row, col) in cells {
        grid.set(Coord::new(row, col), kind).unwrap();
    }
    grid
}

fn coords(cells: &[(usize, usize)]) -> BTreeSet<Coord> {
    cells.iter().map(|&(r, c)| Coord::new(r, c)).collect()
}

fn kind_at(grid: &Grid, row: isize, col: isize) -> Option<Gem> {
    if row < 0 || col < 0 {
        return None;
    }
    grid.get(Coord::new(row as usize, col as usize)).ok().flatten()
}

fn run_len_through(grid: &Grid, coord: Coord, dr: isize, dc: isize) -> usize {
    let Some(kind) = kind_at(grid, coord.row as isize, coord.col as isize) else {
        return 0;
    };
    let mut len = 1;
    for sign in [-1, 1] {
        let (mut r, mut c) = (coord.row as isize, coord.col as isize);
        loop {
            r += sign * dr;
            c += sign * dc;
            if kind_at(grid, r, c) != Some(kind) {
                break;
            }
            len += 1;
        }
    }
    len
}

fn in_uniform_block(grid: &Grid, coord: Coord) -> bool {
    let (row, col) = (coord.row as isize, coord.col as isize);
    let Some(kind) = kind_at(grid, row, col) else {
        return false;
    };
    [(-1, -1), (-1, 0), (0, -1), (0, 0)].iter().any(|&(or, oc)| {
        let (r, c) = (row + or, col + oc);
        [(0, 0), (0, 1), (1, 0), (1, 1)]
            .iter()
            .all(|&(dr, dc)| kind_at(grid, r + dr, c + dc) == Some(kind))
    })
}

#[test]
fn striped_board_has_no_matches() {
    assert!(find_matches(&striped_board()).is_empty());
}

#[test]
fn three_in_a_row_is_detected_as_one_group() {
    let grid = striped_with(Gem::Ruby, &[(0, 0), (0, 1), (0, 2)]);

    let matches = find_matches(&grid);
    assert_eq!(matches, coords(&[(0, 0), (0, 1), (0, 2)]));

    let groups = group_matches(&grid, &matches);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].kind, Gem::Ruby);
    assert_eq!(groups[0].len(), 3);
    assert_eq!(groups[0].multiplier(), 1.0);
}

#[test]
fn vertical_run_is_detected() {
    let grid = striped_with(Gem::Ruby, &[(6, 0), (7, 0), (8, 0)]);
    assert_eq!(find_matches(&grid), coords(&[(6, 0), (7, 0), (8, 0)]));
}

#[test]
fn two_by_two_block_without_run_scores_one_and_a_half() {
    let grid = striped_with(Gem::Ruby, &[(4, 4), (4, 5), (5, 4), (5, 5)]);

    let matches = find_matches(&grid);
    assert_eq!(matches, coords(&[(4, 4), (4, 5), (5, 4), (5, 5)]));

    let groups = group_matches(&grid, &matches);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 4);
    assert_eq!(groups[0].multiplier(), 1.5);
}

#[test]
fn block_and_run_overlap_into_single_group() {
    let grid = striped_with(Gem::Ruby, &[(4, 4), (4, 5), (4, 6), (5, 4), (5, 5)]);

    let matches = find_matches(&grid);
    assert_eq!(matches.len(), 5);
    let groups = group_matches(&grid, &matches);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].multiplier(), 2.0);
}

#[test]
fn l_shape_merges_through_shared_corner() {
    let grid = striped_with(Gem::Ruby, &[(0, 0), (0, 1), (0, 2), (1, 0), (2, 0)]);

    let groups = group_matches(&grid, &find_matches(&grid));
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 5);
    assert_eq!(groups[0].multiplier_ratio(), (2, 1));
}

#[test]
fn matches_joined_only_by_an_unmarked_gem_stay_separate() {
    // (1, 2) is a ruby touching both runs but is not part of any match itself.
    let grid = striped_with(
        Gem::Ruby,
        &[(0, 0), (0, 1), (0, 2), (1, 2), (1, 3), (2, 3), (3, 3)],
    );

    let matches = find_matches(&grid);
    assert!(!matches.contains(&Coord::new(1, 2)));
    assert_eq!(matches.len(), 6);

    let groups = group_matches(&grid, &matches);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].coords, vec![Coord::new(0, 0), Coord::new(0, 1), Coord::new(0, 2)]);
    assert_eq!(groups[1].coords, vec![Coord::new(1, 3), Coord::new(2, 3), Coord::new(3, 3)]);
}

#[test]
fn different_kinds_touching_form_separate_groups() {
    let mut grid = striped_with(Gem::Ruby, &[(0, 0), (0, 1), (0, 2)]);
    for col in 0..3 {
        grid.set(Coord::new(1, col), Gem::Amethyst).unwrap();
    }

    let matches = find_matches(&grid);
    assert_eq!(matches.len(), 6);
    let groups = group_matches(&grid, &matches);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].kind, Gem::Ruby);
    assert_eq!(groups[1].kind, Gem::Amethyst);
}

#[test]
fn random_boards_only_report_real_runs_and_blocks() {
    for seed in 0..64 {
        let grid = Grid::filled(&mut ChaCha8Rng::seed_from_u64(seed));
        let matches = find_matches(&grid);

        for coord in Coord::all() {
            let in_run = run_len_through(&grid, coord, 0, 1) >= MIN_RUN_LEN
                || run_len_through(&grid, coord, 1, 0) >= MIN_RUN_LEN;
            let expected = in_run || in_uniform_block(&grid, coord);
            assert_eq!(
                matches.contains(&coord),
                expected,
                "seed {seed}: coordinate {coord} misclassified"
            );
        }

        let groups = group_matches(&grid, &matches);
        let grouped: usize = groups.iter().map(|g| g.len()).sum();
        assert_eq!(grouped, matches.len(), "seed {seed}: groups must partition the match set");
    }
}

#[test]
fn empty_cells_never_match() {
    let mut grid = striped_board();
    for col in 0..GRID_SIZE {
        grid.clear(Coord::new(0, col)).unwrap();
        grid.clear(Coord::new(1, col)).unwrap();
    }
    assert!(find_matches(&grid).is_empty());
}
