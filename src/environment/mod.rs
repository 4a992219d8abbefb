//! Execution environments
//!
//! An environment is the working memory of one scope of execution. The
//! basic one is a LIFO [`Stack`] whose top is index 0; [`Tape`] reuses the
//! same backing sequence as pointer-addressed memory.

mod tape;

pub use tape::{Tape, TapeConfig};

use crate::engine::EngineError;
use crate::value::{FromValue, Value};
use std::collections::VecDeque;

/// How much of an environment to render in a dump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StackDump {
    #[default]
    Top,
    Deep,
}

/// Anything the interpreter can hold on its environment stack
pub trait Environment: Default + 'static {
    fn stack(&self) -> &Stack;

    fn stack_mut(&mut self) -> &mut Stack;

    fn dump(&self, depth: StackDump) -> String {
        self.stack().dump(depth)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stack {
    pub(crate) cells: VecDeque<Value>,
}

impl Environment for Stack {
    fn stack(&self) -> &Stack {
        self
    }

    fn stack_mut(&mut self) -> &mut Stack {
        self
    }
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Top first
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.cells.iter()
    }

    pub fn peek(&self) -> Option<&Value> {
        self.cells.front()
    }

    pub fn push(&mut self, value: Value) {
        tracing::trace!(size = self.cells.len() + 1, "object pushed onto stack: {}", value);
        self.cells.push_front(value);
    }

    pub fn pop(&mut self) -> Result<Value, EngineError> {
        let value = self
            .cells
            .pop_front()
            .ok_or_else(|| EngineError::StackUnderflow("pop".into()))?;
        tracing::trace!(size = self.cells.len(), "1 object(s) popped from stack");
        Ok(value)
    }

    /// Pop and require a particular kind of value
    pub fn pop_as<T: FromValue>(&mut self) -> Result<T, EngineError> {
        T::extract(self.pop()?)
    }

    /// Shorthand for the common numeric pop
    pub fn pop_number(&mut self) -> Result<i64, EngineError> {
        self.pop_as::<i64>()
    }

    /// Remove the top `count` values; the result is top first
    pub fn pop_many(&mut self, count: usize) -> Result<Vec<Value>, EngineError> {
        if self.cells.len() < count {
            return Err(EngineError::StackUnderflow(format!(
                "pop {} with only {} elements",
                count,
                self.cells.len()
            )));
        }
        let popped: Vec<Value> = self.cells.drain(..count).collect();
        tracing::trace!(size = self.cells.len(), "{} object(s) popped from stack", count);
        Ok(popped)
    }

    pub fn duplicate(&mut self) -> Result<(), EngineError> {
        let top = self
            .cells
            .front()
            .cloned()
            .ok_or_else(|| EngineError::StackUnderflow("duplicate".into()))?;
        self.push(top);
        Ok(())
    }

    /// `[a, b, ...] -> [b, a, ...]`
    pub fn swap(&mut self) -> Result<(), EngineError> {
        if self.cells.len() < 2 {
            return Err(EngineError::StackUnderflow("swap".into()));
        }
        let mut popped = self.pop_many(2)?.into_iter();
        if let (Some(a), Some(b)) = (popped.next(), popped.next()) {
            self.push(a);
            self.push(b);
        }
        Ok(())
    }

    /// `[a, b, c, ...] -> [c, a, b, ...]`
    pub fn rotate(&mut self) -> Result<(), EngineError> {
        if self.cells.len() < 3 {
            return Err(EngineError::StackUnderflow("rotate".into()));
        }
        let mut popped = self.pop_many(3)?.into_iter();
        if let (Some(a), Some(b), Some(c)) = (popped.next(), popped.next(), popped.next()) {
            self.push(b);
            self.push(a);
            self.push(c);
        }
        Ok(())
    }

    /// Push a copy of the element at `index` (0 = top)
    pub fn pick(&mut self, index: usize) -> Result<(), EngineError> {
        let picked = self.cells.get(index).cloned().ok_or_else(|| {
            EngineError::StackUnderflow(format!(
                "pick {} invalid when only {} elements",
                index,
                self.cells.len()
            ))
        })?;
        self.push(picked);
        Ok(())
    }

    pub fn dump(&self, depth: StackDump) -> String {
        let mut out = format!("Stack size == {}, tos => \n", self.cells.len());
        match (self.cells.front(), depth) {
            (None, _) => out.push_str("<Empty>"),
            (Some(top), StackDump::Top) => out.push_str(&top.to_string()),
            (Some(_), StackDump::Deep) => {
                let rendered: Vec<String> = self.cells.iter().map(|v| v.to_string()).collect();
                out.push_str(&rendered.join("\n===>"));
            }
        }
        out
    }
}
