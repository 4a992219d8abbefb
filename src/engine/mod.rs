//! Interpreter engine
//!
//! The engine is generic over a source layout `S` and an environment type
//! `E`. A concrete language is nothing more than a [`RecognizerChain`]
//! plugged into an [`Interpreter`]:
//!
//! - [`InterpreterState`] owns the source buffer, a non-empty stack of
//!   environments (innermost on top), the I/O port and typed side-tables.
//! - [`Recognizer`]s look at the state and gather one [`Command`].
//! - [`Interpreter`] runs the fetch-decide-apply loop and watches
//!   breakpoints.

mod command;
mod dispatch;
mod recognizer;

pub use command::{Action, Command};
pub use dispatch::{Breakpoint, Interpreter, Outcome, Statistics};
pub use recognizer::{Recognizer, RecognizerChain, Symbol, UnknownTokenSkipper};

use crate::environment::{Environment, StackDump, TapeConfig};
use crate::io::{ConsoleIo, IoPort};
use crate::source::SourceBuffer;
use crate::value::{LambdaRef, Sentinels, Value};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Stack underflow: {0}")]
    StackUnderflow(String),
    #[error("Type error: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },
    #[error("Maximum size exceeded: {requested} > {maximum}")]
    CapacityExceeded { requested: usize, maximum: usize },
    #[error("No interpreter usable; offending character {0}")]
    UnknownInstruction(String),
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),
    #[error("Malformed reference: {0}")]
    MalformedReference(String),
    #[error("Illegal index: {0}")]
    InvalidIndex(i64),
    #[error("Arithmetic error: {0}")]
    Arithmetic(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Execution aborted by user")]
    Interrupted,
}

/// Engine tunables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Keep a trailing newline on each loaded line
    pub retain_source_eol: bool,
    pub sentinels: Sentinels,
    pub tape: TapeConfig,
    /// Tape ceiling that wins over a language's own choice
    pub tape_max: Option<usize>,
    /// Memoize seek destinations
    pub seek_cache: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            retain_source_eol: true,
            sentinels: Sentinels::default(),
            tape: TapeConfig::default(),
            tape_max: None,
            seek_cache: false,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `ESORUN_*` environment variables
    pub fn from_env() -> Self {
        let mut config = EngineConfig::default();
        if let Some(v) = env_parse::<bool>("ESORUN_RETAIN_EOL") {
            config.retain_source_eol = v;
        }
        if let Some(v) = env_parse::<i64>("ESORUN_TRUE_VALUE") {
            config.sentinels.truth = v;
        }
        if let Some(v) = env_parse::<i64>("ESORUN_FALSE_VALUE") {
            config.sentinels.falsity = v;
        }
        config.tape_max = env_parse::<usize>("ESORUN_TAPE_MAX");
        config
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

/// Everything a command may touch
pub struct InterpreterState<S, E> {
    pub source: S,
    environments: Vec<E>,
    pub io: Box<dyn IoPort>,
    pub sentinels: Sentinels,
    /// Named variable slots
    pub variables: HashMap<String, Value>,
    lambdas: Vec<Rc<[Command<S, E>]>>,
    statistics: Statistics,
    /// Named timers, innermost last
    timers: Vec<(String, Instant)>,
}

impl<S: SourceBuffer, E: Environment> Default for InterpreterState<S, E> {
    fn default() -> Self {
        Self::new(S::default(), E::default())
    }
}

impl<S: SourceBuffer, E: Environment> InterpreterState<S, E> {
    pub fn new(source: S, environment: E) -> Self {
        InterpreterState {
            source,
            environments: vec![environment],
            io: Box::new(ConsoleIo),
            sentinels: Sentinels::default(),
            variables: HashMap::new(),
            lambdas: Vec::new(),
            statistics: Statistics::default(),
            timers: Vec::new(),
        }
    }

    pub fn with_io(mut self, io: impl IoPort + 'static) -> Self {
        self.io = Box::new(io);
        self
    }

    /// The innermost environment
    pub fn environment(&self) -> &E {
        // never empty: pop_environment refuses to remove the last one
        &self.environments[self.environments.len() - 1]
    }

    pub fn environment_mut(&mut self) -> &mut E {
        let top = self.environments.len() - 1;
        &mut self.environments[top]
    }

    pub fn environment_depth(&self) -> usize {
        self.environments.len()
    }

    pub fn push_environment(&mut self, environment: E) {
        self.environments.push(environment);
        tracing::debug!(depth = self.environments.len(), "environment pushed");
    }

    pub fn pop_environment(&mut self) -> Result<E, EngineError> {
        if self.environments.len() < 2 {
            return Err(EngineError::StackUnderflow(
                "cannot remove the outermost environment".into(),
            ));
        }
        let popped = self.environments.pop().ok_or_else(|| {
            EngineError::StackUnderflow("environment".into())
        })?;
        tracing::debug!(depth = self.environments.len(), "environment popped");
        Ok(popped)
    }

    /// Exchange the two innermost environments; a no-op with only one
    pub fn rotate_environments(&mut self) {
        let len = self.environments.len();
        if len > 1 {
            self.environments.swap(len - 1, len - 2);
        }
    }

    pub fn push(&mut self, value: Value) {
        self.environment_mut().stack_mut().push(value);
    }

    pub fn pop(&mut self) -> Result<Value, EngineError> {
        self.environment_mut().stack_mut().pop()
    }

    pub fn pop_number(&mut self) -> Result<i64, EngineError> {
        self.environment_mut().stack_mut().pop_number()
    }

    pub fn boolean(&self, b: bool) -> Value {
        self.sentinels.boolean(b)
    }

    pub fn is_true(&self, n: i64) -> bool {
        self.sentinels.is_true(n)
    }

    /// Store a command sequence and hand back its handle
    pub fn register_lambda(&mut self, body: Vec<Command<S, E>>) -> LambdaRef {
        self.lambdas.push(Rc::from(body));
        LambdaRef(self.lambdas.len() - 1)
    }

    /// Shared handle to a stored body
    pub fn lambda(&self, handle: LambdaRef) -> Result<Rc<[Command<S, E>]>, EngineError> {
        self.lambdas
            .get(handle.0)
            .map(Rc::clone)
            .ok_or_else(|| EngineError::MalformedReference(format!("unknown lambda #{}", handle.0)))
    }

    /// Apply every command of a stored lambda in order
    pub fn call_lambda(&mut self, handle: LambdaRef) -> Result<(), EngineError> {
        let body = self.lambda(handle)?;
        for command in body.iter() {
            command.apply(self)?;
        }
        Ok(())
    }

    pub fn variable(&self, name: &str) -> Result<&Value, EngineError> {
        self.variables
            .get(name)
            .ok_or_else(|| EngineError::MalformedReference(format!("unknown variable {}", name)))
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn statistics_mut(&mut self) -> &mut Statistics {
        &mut self.statistics
    }

    pub fn start_timer(&mut self, name: impl Into<String>) {
        self.timers.push((name.into(), Instant::now()));
    }

    /// Stop the most recently started timer
    pub fn stop_timer(&mut self) -> Result<(String, Duration), EngineError> {
        let (name, started) = self
            .timers
            .pop()
            .ok_or_else(|| EngineError::StackUnderflow("no timer running".into()))?;
        Ok((name, started.elapsed()))
    }

    pub fn dump(&self, depth: StackDump) -> String {
        self.environment().dump(depth)
    }
}
