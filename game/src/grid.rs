use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

pub const GRID_SIZE: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Gem {
    Ruby,
    Sapphire,
    Emerald,
    Topaz,
    Amethyst,
}

impl Gem {
    pub const ALL: [Gem; 5] = [
        Gem::Ruby,
        Gem::Sapphire,
        Gem::Emerald,
        Gem::Topaz,
        Gem::Amethyst,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Gem::Ruby => "ruby",
            Gem::Sapphire => "sapphire",
            Gem::Emerald => "emerald",
            Gem::Topaz => "topaz",
            Gem::Amethyst => "amethyst",
        }
    }

    /// Uniform draw over every kind.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Gem {
        Self::ALL[rng.gen_range(0..Self::COUNT)]
    }
}

/// Board position; row 0 is the top, gravity pulls towards `GRID_SIZE - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn in_bounds(self) -> bool {
        self.row < GRID_SIZE && self.col < GRID_SIZE
    }

    pub fn manhattan(self, other: Coord) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    pub fn is_adjacent(self, other: Coord) -> bool {
        self.manhattan(other) == 1
    }

    /// Orthogonal neighbours that lie on the board, in a stable up/down/left/right order.
    pub fn neighbors(self) -> impl Iterator<Item = Coord> {
        let Coord { row, col } = self;
        [
            (row.wrapping_sub(1), col, row > 0),
            (row + 1, col, row + 1 < GRID_SIZE),
            (row, col.wrapping_sub(1), col > 0),
            (row, col + 1, col + 1 < GRID_SIZE),
        ]
        .into_iter()
        .filter(|&(_, _, in_bounds)| in_bounds)
        .map(|(r, c, _)| Coord::new(r, c))
    }

    /// Every board coordinate in row-major order.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..GRID_SIZE).flat_map(|row| (0..GRID_SIZE).map(move |col| Coord::new(row, col)))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Fixed-size gem board. Cells are only empty while a cascade is being resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "Vec<Vec<Option<Gem>>>",
    into = "Vec<Vec<Option<Gem>>>"
)]
pub struct Grid {
    cells: Vec<Vec<Option<Gem>>>,
}

impl Grid {
    pub fn empty() -> Self {
        Self {
            cells: vec![vec![None; GRID_SIZE]; GRID_SIZE],
        }
    }

    /// A board with every cell drawn at random. Starting runs are allowed.
    pub fn filled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut grid = Self::empty();
        for row in grid.cells.iter_mut() {
            for cell in row.iter_mut() {
                *cell = Some(Gem::random(rng));
            }
        }
        grid
    }

    pub fn from_rows(rows: [[Gem; GRID_SIZE]; GRID_SIZE]) -> Self {
        Self {
            cells: rows
                .iter()
                .map(|row| row.iter().copied().map(Some).collect())
                .collect(),
        }
    }

    pub fn rows(&self) -> &[Vec<Option<Gem>>] {
        &self.cells
    }

    pub fn get(&self, coord: Coord) -> Result<Option<Gem>, EngineError> {
        check_bounds(coord)?;
        Ok(self.cells[coord.row][coord.col])
    }

    pub fn set(&mut self, coord: Coord, gem: Gem) -> Result<(), EngineError> {
        check_bounds(coord)?;
        self.cells[coord.row][coord.col] = Some(gem);
        Ok(())
    }

    pub fn clear(&mut self, coord: Coord) -> Result<(), EngineError> {
        check_bounds(coord)?;
        self.cells[coord.row][coord.col] = None;
        Ok(())
    }

    pub fn swap(&mut self, a: Coord, b: Coord) -> Result<(), EngineError> {
        check_bounds(a)?;
        check_bounds(b)?;
        let tmp = self.cells[a.row][a.col];
        self.cells[a.row][a.col] = self.cells[b.row][b.col];
        self.cells[b.row][b.col] = tmp;
        Ok(())
    }

    /// Assigns a uniformly random kind to each listed coordinate.
    ///
    /// All coordinates are validated before anything is written.
    pub fn random_fill<R: Rng + ?Sized>(
        &mut self,
        coords: &[Coord],
        rng: &mut R,
    ) -> Result<(), EngineError> {
        if let Some(&bad) = coords.iter().find(|c| !c.in_bounds()) {
            return Err(EngineError::OutOfBounds { coord: bad });
        }
        for coord in coords {
            self.cells[coord.row][coord.col] = Some(Gem::random(rng));
        }
        Ok(())
    }

    pub fn empty_coords(&self) -> Vec<Coord> {
        Coord::all().filter(|&c| self.at(c).is_none()).collect()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_some)
    }

    /// Compacts every column towards the bottom, keeping the relative order of
    /// the surviving gems. Returns how many gems moved.
    pub fn apply_gravity(&mut self) -> usize {
        let mut moved = 0;
        for col in 0..GRID_SIZE {
            let mut write = GRID_SIZE;
            for row in (0..GRID_SIZE).rev() {
                let Some(gem) = self.cells[row][col] else {
                    continue;
                };
                write -= 1;
                if write != row {
                    self.cells[write][col] = Some(gem);
                    self.cells[row][col] = None;
                    moved += 1;
                }
            }
        }
        moved
    }

    /// Lenient lookup; off-board coordinates read as empty.
    pub(crate) fn at(&self, coord: Coord) -> Option<Gem> {
        self.cells
            .get(coord.row)
            .and_then(|row| row.get(coord.col))
            .copied()
            .flatten()
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::empty()
    }
}

impl TryFrom<Vec<Vec<Option<Gem>>>> for Grid {
    type Error = EngineError;

    fn try_from(cells: Vec<Vec<Option<Gem>>>) -> Result<Self, Self::Error> {
        if cells.len() != GRID_SIZE {
            let cols = cells.first().map_or(0, Vec::len);
            return Err(EngineError::InvalidGridShape {
                rows: cells.len(),
                cols,
            });
        }
        if let Some(row) = cells.iter().find(|row| row.len() != GRID_SIZE) {
            return Err(EngineError::InvalidGridShape {
                rows: cells.len(),
                cols: row.len(),
            });
        }
        Ok(Self { cells })
    }
}

impl From<Grid> for Vec<Vec<Option<Gem>>> {
    fn from(grid: Grid) -> Self {
        grid.cells
    }
}

fn check_bounds(coord: Coord) -> Result<(), EngineError> {
    if coord.in_bounds() {
        Ok(())
    } else {
        Err(EngineError::OutOfBounds { coord })
    }
}
