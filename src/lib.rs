//! Board engine for a Threes-style sliding puzzle on a 4x4 grid.
//!
//! A 1 merges only with a 2 (and vice versa) into a 3; equal cards of value
//! 3 or more merge into their sum. A swipe resolves at most one shift or
//! merge per line and frees a cell on the trailing edge, into which the
//! queued next card is dropped.

pub mod board;
pub mod logic;

mod direction;

pub use board::Board;
pub use direction::Direction;
pub use logic::{Candidate, EmptyBoard, Grid, SIZE};
