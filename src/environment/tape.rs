//! Pointer-addressed tape memory
//!
//! Shares its backing sequence with the underlying [`Stack`], so stack
//! operations and cell access see the same values. Cells beyond the
//! written region hold `Value::Number(0)`.

use super::{Environment, Stack, StackDump};
use crate::engine::EngineError;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapeConfig {
    /// Cells allocated up front
    pub initial_capacity: usize,
    /// Cells appended per growth
    pub block_size: usize,
    /// Hard ceiling on the number of cells
    pub max_size: usize,
}

impl Default for TapeConfig {
    fn default() -> Self {
        TapeConfig {
            initial_capacity: 512,
            block_size: 1024,
            max_size: 1024,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tape {
    stack: Stack,
    pointer: usize,
    config: TapeConfig,
}

impl Default for Tape {
    fn default() -> Self {
        Tape::with_config(TapeConfig::default())
    }
}

impl Environment for Tape {
    fn stack(&self) -> &Stack {
        &self.stack
    }

    fn stack_mut(&mut self) -> &mut Stack {
        &mut self.stack
    }

    fn dump(&self, depth: StackDump) -> String {
        let current = self
            .current_cell()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "<none>".to_string());
        format!(
            "{}, Pointer == {}, Count == {}, Current cell == {}",
            self.stack.dump(depth),
            self.pointer,
            self.stack.len(),
            current
        )
    }
}

impl Tape {
    pub fn with_config(config: TapeConfig) -> Self {
        let initial = config.initial_capacity.min(config.max_size);
        let mut stack = Stack::new();
        stack.cells.resize(initial, Value::default());
        Tape {
            stack,
            pointer: 0,
            config,
        }
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.config.max_size
    }

    pub fn advance(&mut self) -> Result<(), EngineError> {
        let next = self.pointer + 1;
        if next >= self.stack.len() {
            self.grow_to_cover(next)?;
        }
        self.pointer = next;
        Ok(())
    }

    /// Clamps at cell 0
    pub fn retreat(&mut self) {
        self.pointer = self.pointer.saturating_sub(1);
    }

    pub fn set(&mut self, index: i64) -> Result<(), EngineError> {
        if index < 0 {
            return Err(EngineError::InvalidIndex(index));
        }
        let index = index as usize;
        if index >= self.stack.len() {
            self.grow_exact(index + 1)?;
        }
        self.pointer = index;
        Ok(())
    }

    pub fn current_cell(&self) -> Option<&Value> {
        self.stack.cells.get(self.pointer)
    }

    /// Numeric view of the current cell
    pub fn current_number(&self) -> Result<i64, EngineError> {
        match self.current_cell() {
            Some(v) => v.as_number().ok_or_else(|| EngineError::TypeMismatch {
                expected: "Number".into(),
                got: v.kind().into(),
            }),
            None => Err(EngineError::InvalidIndex(self.pointer as i64)),
        }
    }

    pub fn set_current_cell(&mut self, value: Value) -> Result<(), EngineError> {
        if self.pointer >= self.stack.len() {
            self.grow_exact(self.pointer + 1)?;
        }
        self.stack.cells[self.pointer] = value;
        Ok(())
    }

    /// Append one block, clipped to the ceiling, and fail if `index` is still out of reach
    fn grow_to_cover(&mut self, index: usize) -> Result<(), EngineError> {
        let len = self.stack.len();
        let target = (len + self.config.block_size.max(1)).min(self.config.max_size);
        if target <= index {
            return Err(EngineError::CapacityExceeded {
                requested: index + 1,
                maximum: self.config.max_size,
            });
        }
        tracing::debug!(from = len, to = target, "tape grown");
        self.stack.cells.resize(target, Value::default());
        Ok(())
    }

    fn grow_exact(&mut self, len: usize) -> Result<(), EngineError> {
        if len > self.config.max_size {
            return Err(EngineError::CapacityExceeded {
                requested: len,
                maximum: self.config.max_size,
            });
        }
        self.stack.cells.resize(len, Value::default());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(max_size: usize) -> Tape {
        Tape::with_config(TapeConfig {
            initial_capacity: 100,
            block_size: 100,
            max_size,
        })
    }

    #[test]
    fn cells_start_zeroed() {
        let tape = Tape::default();
        assert_eq!(tape.len(), 512);
        assert_eq!(tape.current_cell(), Some(&Value::Number(0)));
    }

    #[test]
    fn retreat_clamps_at_zero() {
        let mut tape = small(1000);
        tape.retreat();
        assert_eq!(tape.pointer(), 0);
        tape.advance().unwrap();
        tape.retreat();
        tape.retreat();
        assert_eq!(tape.pointer(), 0);
    }

    #[test]
    fn advance_grows_in_blocks() {
        let mut tape = small(1000);
        for _ in 0..150 {
            tape.advance().unwrap();
        }
        assert_eq!(tape.pointer(), 150);
        assert_eq!(tape.len(), 200);
    }

    #[test]
    fn growth_is_clipped_to_ceiling() {
        let mut tape = small(601);
        for _ in 0..600 {
            tape.advance().unwrap();
        }
        assert_eq!(tape.pointer(), 600);
        assert_eq!(tape.len(), 601);
        assert!(matches!(
            tape.advance(),
            Err(EngineError::CapacityExceeded { maximum: 601, .. })
        ));
    }

    #[test]
    fn set_rejects_negative_and_grows() {
        let mut tape = small(1000);
        assert!(matches!(tape.set(-1), Err(EngineError::InvalidIndex(-1))));
        tape.set(250).unwrap();
        assert_eq!(tape.pointer(), 250);
        assert_eq!(tape.len(), 251);
        assert!(matches!(tape.set(1000), Err(EngineError::CapacityExceeded { .. })));
    }

    #[test]
    fn current_cell_round_trip() {
        let mut tape = small(1000);
        tape.advance().unwrap();
        tape.set_current_cell(Value::Number(65)).unwrap();
        assert_eq!(tape.current_number().unwrap(), 65);
        tape.retreat();
        assert_eq!(tape.current_number().unwrap(), 0);
    }

    #[test]
    fn dump_mentions_pointer() {
        let tape = small(1000);
        assert!(tape.dump(StackDump::Top).contains("Pointer == 0"));
    }
}
