//! Match-3 board engine: swaps, match detection, cascades and per-kind
//! levelling for a timed round. Rendering and input live with the host; it
//! reads [`SessionView`] and feeds moves and ticks to a [`Session`].

pub mod cascade;
pub mod error;
pub mod grid;
pub mod matcher;
pub mod playtest;
pub mod progression;
pub mod round_timer;
pub mod session;
pub mod settings;
pub mod view;

pub use error::EngineError;
pub use grid::{Coord, GRID_SIZE, Gem, Grid};
pub use session::{MoveOutcome, Session, SessionEvent, SessionObserver, SessionPhase, SessionState};
pub use view::SessionView;
