use super::{EngineError, InterpreterState};
use crate::environment::{Environment, StackDump};
use crate::source::SourceBuffer;
use crate::value::Value;
use std::fmt;
use std::rc::Rc;

/// Side effect of a command against interpreter state
pub type Action<S, E> = Rc<dyn Fn(&mut InterpreterState<S, E>) -> Result<(), EngineError>>;

/// An appliable unit of behaviour bound to a keyword
///
/// Bound arguments are pushed onto the active environment, in order,
/// before the action runs. A command without an action only pushes its
/// arguments, which is how literals are represented.
pub struct Command<S, E> {
    keyword: String,
    action: Option<Action<S, E>>,
    arguments: Vec<Value>,
}

impl<S, E> Clone for Command<S, E> {
    fn clone(&self) -> Self {
        Command {
            keyword: self.keyword.clone(),
            action: self.action.clone(),
            arguments: self.arguments.clone(),
        }
    }
}

impl<S, E> fmt::Debug for Command<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("keyword", &self.keyword)
            .field("arguments", &self.arguments)
            .field("has_action", &self.action.is_some())
            .finish()
    }
}

impl<S, E> fmt::Display for Command<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "command {}", self.keyword)
    }
}

impl<S: SourceBuffer, E: Environment> Command<S, E> {
    pub fn new<F>(keyword: impl Into<String>, action: F) -> Self
    where
        F: Fn(&mut InterpreterState<S, E>) -> Result<(), EngineError> + 'static,
    {
        Command {
            keyword: keyword.into(),
            action: Some(Rc::new(action)),
            arguments: Vec::new(),
        }
    }

    /// Share an action already held elsewhere, e.g. in a command table
    pub fn from_action(keyword: impl Into<String>, action: Action<S, E>) -> Self {
        Command {
            keyword: keyword.into(),
            action: Some(action),
            arguments: Vec::new(),
        }
    }

    /// Pushes `value` when applied
    pub fn literal(keyword: impl Into<String>, value: Value) -> Self {
        Command {
            keyword: keyword.into(),
            action: None,
            arguments: vec![value],
        }
    }

    /// Does nothing when applied
    pub fn noop(keyword: impl Into<String>) -> Self {
        Command {
            keyword: keyword.into(),
            action: None,
            arguments: Vec::new(),
        }
    }

    pub fn with_argument(mut self, value: Value) -> Self {
        self.arguments.push(value);
        self
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    /// Independent copy carrying the same bound arguments
    pub fn clone_with_arguments(&self) -> Self {
        self.clone()
    }

    pub fn apply(&self, state: &mut InterpreterState<S, E>) -> Result<(), EngineError> {
        for argument in &self.arguments {
            state.push(argument.clone());
        }
        if let Some(action) = &self.action {
            action(state)?;
        }
        tracing::trace!(
            "Post-execution: {}\n{}",
            self,
            state.environment().dump(StackDump::Top)
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Stack;
    use crate::source::LinearBuffer;

    type State = InterpreterState<LinearBuffer, Stack>;

    #[test]
    fn bound_arguments_are_pushed_in_order_before_action() {
        let mut state = State::default();
        let cmd = Command::new("sub", |s: &mut State| {
            let rhs = s.pop_number()?;
            let lhs = s.pop_number()?;
            s.push(Value::Number(lhs - rhs));
            Ok(())
        })
        .with_argument(Value::Number(10))
        .with_argument(Value::Number(3));
        cmd.apply(&mut state).unwrap();
        assert_eq!(state.pop_number().unwrap(), 7);
    }

    #[test]
    fn literal_pushes_itself() {
        let mut state = State::default();
        Command::literal("number", Value::Number(4)).apply(&mut state).unwrap();
        assert_eq!(state.environment().stack().len(), 1);
    }

    #[test]
    fn clone_keeps_arguments() {
        let cmd: Command<LinearBuffer, Stack> =
            Command::literal("number", Value::Number(1)).with_argument(Value::Number(2));
        let copy = cmd.clone_with_arguments().with_argument(Value::Number(3));
        assert_eq!(copy.keyword(), "number");
        assert_eq!(cmd.arguments(), &[Value::Number(1), Value::Number(2)]);
        assert_eq!(
            copy.arguments(),
            &[Value::Number(1), Value::Number(2), Value::Number(3)]
        );

        let mut state = State::default();
        cmd.apply(&mut state).unwrap();
        copy.apply(&mut state).unwrap();
        assert_eq!(state.environment().stack().len(), 5);
        assert_eq!(state.pop_number().unwrap(), 3);
    }

    #[test]
    fn noop_leaves_state() {
        let mut state = State::default();
        Command::noop("skip").apply(&mut state).unwrap();
        assert!(state.environment().stack().is_empty());
    }
}
