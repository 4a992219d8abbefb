use super::{SeekDirection, SourceBuffer};
use crate::engine::EngineError;
use crate::position::Position;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SeekKey {
    start: (i64, i64),
    target: char,
    direction: SeekDirection,
    recurse: Option<char>,
}

/// Row-major source text without wraparound
#[derive(Debug, Clone, Default)]
pub struct LinearBuffer {
    lines: Vec<Vec<char>>,
    position: Position,
    caching: bool,
    seek_cache: HashMap<SeekKey, Position>,
}

impl LinearBuffer {
    pub fn new(lines: Vec<String>) -> Self {
        let mut buffer = Self::default();
        buffer.load(lines);
        buffer
    }

    fn line_len(&self, row: i64) -> usize {
        if row < 0 {
            return 0;
        }
        self.lines.get(row as usize).map_or(0, |l| l.len())
    }

    fn can_proceed(&self, direction: SeekDirection) -> bool {
        match direction {
            SeekDirection::Forward => self.more(),
            SeekDirection::Backward => self.position.col > 0 || self.position.row > 0,
        }
    }

    fn proceed(&mut self, direction: SeekDirection) -> Result<bool, EngineError> {
        match direction {
            SeekDirection::Forward => Ok(self.advance()),
            SeekDirection::Backward => self.backup(),
        }
    }

    fn scan(
        &mut self,
        target: char,
        direction: SeekDirection,
        recurse: Option<char>,
    ) -> Result<(), EngineError> {
        while self.can_proceed(direction) && self.current() != Some(target) {
            if let Some(r) = recurse {
                if self.current() == Some(r) {
                    self.proceed(direction)?;
                    self.scan(target, direction, recurse)?;
                }
            }
            self.proceed(direction)?;
        }
        if self.current() == Some(target) {
            Ok(())
        } else {
            Err(EngineError::MalformedReference(format!(
                "no matching '{}' found scanning {:?}",
                target, direction
            )))
        }
    }
}

impl SourceBuffer for LinearBuffer {
    fn load(&mut self, lines: Vec<String>) {
        self.lines = lines.into_iter().map(|l| l.chars().collect()).collect();
        self.position = Position::default();
        self.seek_cache.clear();
    }

    fn row_count(&self) -> usize {
        self.lines.len()
    }

    fn line(&self, row: usize) -> Option<&[char]> {
        self.lines.get(row).map(|l| l.as_slice())
    }

    fn position(&self) -> &Position {
        &self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    fn advance(&mut self) -> bool {
        self.position.col += 1;
        while (self.position.row as usize) < self.lines.len()
            && self.position.col as usize >= self.line_len(self.position.row)
        {
            self.position.col = 0;
            self.position.row += 1;
        }
        self.more()
    }

    fn backup(&mut self) -> Result<bool, EngineError> {
        self.position.col -= 1;
        if self.position.col < 0 {
            if self.position.row > 0 {
                self.position.row -= 1;
            }
            self.position.col = self.line_len(self.position.row) as i64 - 1;
        }
        Ok(self.position.col >= 0)
    }

    fn more(&self) -> bool {
        let rows = self.lines.len() as i64;
        let pos = &self.position;
        pos.row >= 0
            && pos.row < rows
            && ((pos.col as usize) < self.line_len(pos.row) || pos.row < rows - 1)
    }

    fn seek(
        &mut self,
        target: char,
        direction: SeekDirection,
        recurse: Option<char>,
    ) -> Result<(), EngineError> {
        let key = SeekKey {
            start: (self.position.col, self.position.row),
            target,
            direction,
            recurse,
        };
        if self.caching {
            if let Some(found) = self.seek_cache.get(&key) {
                tracing::debug!(from = %self.position, to = %found, "seek cache hit");
                self.position = found.clone();
                return Ok(());
            }
        }
        self.scan(target, direction, recurse)?;
        if self.caching {
            self.seek_cache.insert(key, self.position.clone());
        }
        Ok(())
    }

    fn set_caching(&mut self, enabled: bool) {
        self.caching = enabled;
    }

    fn caching(&self) -> bool {
        self.caching
    }
}
