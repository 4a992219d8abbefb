//! Source buffers
//!
//! A source buffer owns the program text and the read position. Two
//! layouts are provided:
//!
//! - [`LinearBuffer`]: row-major text, no wraparound, supports stepping
//!   backwards and delimiter seeking.
//! - [`TorusBuffer`]: a fixed `width × height` grid that wraps on both axes
//!   and moves along a sticky [`Direction`].

mod linear;
mod torus;

pub use linear::LinearBuffer;
pub use torus::TorusBuffer;

use crate::engine::EngineError;
use crate::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeekDirection {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector as (dcol, drow)
    pub fn vector(self) -> (i64, i64) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

pub trait SourceBuffer: Default + 'static {
    /// Populate the buffer from an external line sequence
    fn load(&mut self, lines: Vec<String>);

    fn row_count(&self) -> usize;

    /// Characters of one row
    fn line(&self, row: usize) -> Option<&[char]>;

    /// Total addressable cells
    fn cell_count(&self) -> usize {
        (0..self.row_count())
            .filter_map(|r| self.line(r))
            .map(|l| l.len())
            .sum()
    }

    fn position(&self) -> &Position;

    fn set_position(&mut self, position: Position);

    /// Character under the cursor, `None` once input is exhausted
    fn current(&self) -> Option<char> {
        let pos = self.position();
        if !self.more() || pos.row < 0 || pos.col < 0 {
            return None;
        }
        self.line(pos.row as usize)
            .and_then(|l| l.get(pos.col as usize))
            .copied()
    }

    /// Move one unit forward; returns the new `more()`
    fn advance(&mut self) -> bool;

    /// Move one unit backward
    fn backup(&mut self) -> Result<bool, EngineError> {
        Err(EngineError::UnsupportedOperation(
            "this source layout does not step backwards".into(),
        ))
    }

    fn more(&self) -> bool;

    /// What `current()` would return after one `advance()`
    fn peek(&mut self) -> Option<char> {
        let saved = self.position().clone();
        let c = if self.more() && self.advance() {
            self.current()
        } else {
            None
        };
        self.set_position(saved);
        c
    }

    /// Advance and return the character landed on
    fn advance_and_return(&mut self) -> Option<char> {
        if self.advance() {
            self.current()
        } else {
            None
        }
    }

    /// Scan for `target`, skipping balanced `recurse`/`target` pairs
    fn seek(
        &mut self,
        _target: char,
        _direction: SeekDirection,
        _recurse: Option<char>,
    ) -> Result<(), EngineError> {
        Err(EngineError::UnsupportedOperation(
            "this source layout does not seek".into(),
        ))
    }

    fn set_caching(&mut self, enabled: bool);

    fn caching(&self) -> bool;

    /// Raise the language-level completion signal
    fn signal_completion(&mut self) -> Result<(), EngineError> {
        Err(EngineError::UnsupportedOperation(
            "this source layout has no completion signal".into(),
        ))
    }

    /// Source text as loaded or modified
    fn text(&self) -> Vec<String> {
        (0..self.row_count())
            .filter_map(|r| self.line(r))
            .map(|l| l.iter().collect())
            .collect()
    }
}
