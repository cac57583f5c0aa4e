use std::fmt;

use crate::grid::Coord;
use crate::session::SessionPhase;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Coordinate outside the board. Callers should never produce these.
    OutOfBounds { coord: Coord },
    /// Swap between cells that are not orthogonal neighbours.
    InvalidMove { from: Coord, to: Coord },
    InvalidStateTransition {
        phase: SessionPhase,
        action: &'static str,
    },
    InvalidGridShape { rows: usize, cols: usize },
    /// Saved board with empty cells outside a cascade.
    IncompleteGrid { empty: usize },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::OutOfBounds { coord } => {
                write!(f, "coordinate {coord} is outside the board")
            }
            EngineError::InvalidMove { from, to } => {
                write!(f, "cannot swap {from} with {to}: cells are not adjacent")
            }
            EngineError::InvalidStateTransition { phase, action } => {
                write!(f, "cannot {action} while the session is {phase:?}")
            }
            EngineError::InvalidGridShape { rows, cols } => {
                write!(f, "grid must be square with the board size, got {rows}x{cols}")
            }
            EngineError::IncompleteGrid { empty } => {
                write!(f, "board has {empty} empty cells outside a cascade")
            }
        }
    }
}

impl std::error::Error for EngineError {}
