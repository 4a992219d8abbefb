use super::{Direction, SourceBuffer};
use crate::engine::EngineError;
use crate::position::Position;

/// Fixed-size grid that wraps on both axes
///
/// Movement follows the current [`Direction`], which only changes when a
/// command sets it. Iteration never runs out on its own: `more()` stays
/// true until [`SourceBuffer::signal_completion`] is called.
#[derive(Debug, Clone)]
pub struct TorusBuffer {
    grid: Vec<Vec<char>>,
    width: usize,
    height: usize,
    position: Position,
    direction: Direction,
    completed: bool,
    caching: bool,
}

impl Default for TorusBuffer {
    fn default() -> Self {
        TorusBuffer::with_size(0, 0)
    }
}

impl TorusBuffer {
    /// Pre-sized blank grid; loaded text is merged into it
    pub fn with_size(width: usize, height: usize) -> Self {
        TorusBuffer {
            grid: vec![vec![' '; width]; height],
            width,
            height,
            position: Position::default(),
            direction: Direction::Right,
            completed: false,
            caching: false,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Set the direction, then move once
    pub fn travel(&mut self, direction: Direction) -> bool {
        self.direction = direction;
        self.advance()
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    fn cell_index(&self, pos: &Position) -> Result<(usize, usize), EngineError> {
        if pos.col < 0 || pos.row < 0 || pos.col as usize >= self.width || pos.row as usize >= self.height {
            return Err(EngineError::MalformedReference(format!(
                "cell {} outside {}x{} grid",
                pos, self.width, self.height
            )));
        }
        Ok((pos.col as usize, pos.row as usize))
    }

    pub fn get(&self, pos: &Position) -> Result<char, EngineError> {
        let (col, row) = self.cell_index(pos)?;
        Ok(self.grid[row][col])
    }

    pub fn put(&mut self, pos: &Position, c: char) -> Result<(), EngineError> {
        let (col, row) = self.cell_index(pos)?;
        self.grid[row][col] = c;
        Ok(())
    }

    fn resize_from(&mut self, lines: &[String]) {
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        *self = TorusBuffer {
            caching: self.caching,
            ..TorusBuffer::with_size(width, lines.len())
        };
    }
}

impl SourceBuffer for TorusBuffer {
    /// Overwrites cells of the existing grid; text beyond the grid is dropped
    fn load(&mut self, lines: Vec<String>) {
        if self.width == 0 || self.height == 0 {
            self.resize_from(&lines);
        }
        for (row, line) in self.grid.iter_mut().zip(lines.iter()) {
            for (cell, c) in row.iter_mut().zip(line.chars()) {
                *cell = c;
            }
        }
        self.position = Position::default();
        self.direction = Direction::Right;
        self.completed = false;
    }

    fn row_count(&self) -> usize {
        self.height
    }

    fn line(&self, row: usize) -> Option<&[char]> {
        self.grid.get(row).map(|l| l.as_slice())
    }

    fn cell_count(&self) -> usize {
        self.width * self.height
    }

    fn position(&self) -> &Position {
        &self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    fn current(&self) -> Option<char> {
        self.get(&self.position).ok()
    }

    fn advance(&mut self) -> bool {
        if self.width > 0 && self.height > 0 {
            let (dcol, drow) = self.direction.vector();
            self.position.offset(dcol, drow);
            self.position.col = self.position.col.rem_euclid(self.width as i64);
            self.position.row = self.position.row.rem_euclid(self.height as i64);
        }
        self.more()
    }

    fn more(&self) -> bool {
        !self.completed
    }

    fn set_caching(&mut self, enabled: bool) {
        self.caching = enabled;
    }

    fn caching(&self) -> bool {
        self.caching
    }

    fn signal_completion(&mut self) -> Result<(), EngineError> {
        self.completed = true;
        Ok(())
    }
}
