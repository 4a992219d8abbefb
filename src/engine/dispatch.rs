use super::{EngineConfig, EngineError, InterpreterState, RecognizerChain};
use crate::environment::Environment;
use crate::signals;
use crate::source::SourceBuffer;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

/// How a call to [`Interpreter::execute`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The source reported no more input
    Complete,
    /// A breakpoint predicate held after the last step
    BreakpointReached,
}

/// Predicate over interpreter state checked after every step
pub struct Breakpoint<S, E> {
    predicate: Box<dyn Fn(&InterpreterState<S, E>) -> bool>,
    once: bool,
}

impl<S: SourceBuffer, E: Environment> Breakpoint<S, E> {
    pub fn new(predicate: impl Fn(&InterpreterState<S, E>) -> bool + 'static) -> Self {
        Breakpoint {
            predicate: Box::new(predicate),
            once: false,
        }
    }

    /// Removed from the active set the first time it fires
    pub fn once(predicate: impl Fn(&InterpreterState<S, E>) -> bool + 'static) -> Self {
        Breakpoint {
            predicate: Box::new(predicate),
            once: true,
        }
    }

    /// Fires whenever the source position equals `(col, row)`
    pub fn at(col: i64, row: i64) -> Self {
        Self::new(move |state| state.source.position().is_at(col, row))
    }

    pub fn is_once(&self) -> bool {
        self.once
    }

    fn holds(&self, state: &InterpreterState<S, E>) -> bool {
        (self.predicate)(state)
    }
}

/// Per-keyword application counts plus timing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    steps: u64,
    counts: BTreeMap<String, u64>,
    elapsed: Duration,
}

impl Statistics {
    fn record(&mut self, keyword: &str) {
        self.steps += 1;
        *self.counts.entry(keyword.to_string()).or_insert(0) += 1;
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn count(&self, keyword: &str) -> u64 {
        self.counts.get(keyword).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn reset(&mut self) {
        *self = Statistics::default();
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} steps in {:.3}ms",
            self.steps,
            self.elapsed.as_secs_f64() * 1000.0
        )?;
        for (keyword, count) in &self.counts {
            write!(f, "\n  {:<12} {}", keyword, count)?;
        }
        Ok(())
    }
}

/// The fetch-decide-apply loop over one interpreter state
pub struct Interpreter<S, E> {
    state: InterpreterState<S, E>,
    chain: RecognizerChain<S, E>,
    breakpoints: Vec<Breakpoint<S, E>>,
    retain_source_eol: bool,
}

impl<S: SourceBuffer, E: Environment> Interpreter<S, E> {
    pub fn new(state: InterpreterState<S, E>, chain: RecognizerChain<S, E>) -> Self {
        Interpreter {
            state,
            chain,
            breakpoints: Vec::new(),
            retain_source_eol: true,
        }
    }

    /// Apply sentinels, seek caching and line handling from `config`
    pub fn configure(&mut self, config: &EngineConfig) {
        self.state.sentinels = config.sentinels;
        self.state.source.set_caching(config.seek_cache);
        self.retain_source_eol = config.retain_source_eol;
    }

    pub fn state(&self) -> &InterpreterState<S, E> {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut InterpreterState<S, E> {
        &mut self.state
    }

    pub fn into_state(self) -> InterpreterState<S, E> {
        self.state
    }

    pub fn chain(&self) -> &RecognizerChain<S, E> {
        &self.chain
    }

    pub fn statistics(&self) -> &Statistics {
        self.state.statistics()
    }

    /// Load program text, split into lines
    pub fn load_str(&mut self, text: &str) {
        let lines: Vec<String> = if self.retain_source_eol {
            text.split_inclusive('\n').map(str::to_string).collect()
        } else {
            text.lines().map(str::to_string).collect()
        };
        self.state.source.load(lines);
    }

    /// Load program text from a file
    pub fn accept(&mut self, path: &Path) -> Result<(), EngineError> {
        let text = std::fs::read_to_string(path)?;
        self.load_str(&text);
        tracing::info!(path = %path.display(), rows = self.state.source.row_count(), "source loaded");
        Ok(())
    }

    /// Replace the active breakpoint set
    pub fn set_breakpoints(&mut self, breakpoints: impl IntoIterator<Item = Breakpoint<S, E>>) {
        self.breakpoints = breakpoints.into_iter().collect();
    }

    pub fn clear_breakpoints(&mut self) {
        self.breakpoints.clear();
    }

    pub fn has_breakpoints(&self) -> bool {
        !self.breakpoints.is_empty()
    }

    pub fn more(&self) -> bool {
        self.state.source.more()
    }

    /// Gather and apply one command; returns whether input remains
    pub fn step(&mut self) -> Result<bool, EngineError> {
        if signals::interrupted() {
            return Err(EngineError::Interrupted);
        }
        if !self.state.source.more() {
            return Ok(false);
        }
        let started = Instant::now();
        let command = self.chain.gather(&mut self.state)?;
        command.apply(&mut self.state)?;
        let statistics = self.state.statistics_mut();
        statistics.record(command.keyword());
        statistics.elapsed += started.elapsed();
        Ok(self.state.source.more())
    }

    /// Run until the source is exhausted or a breakpoint fires
    pub fn execute(&mut self) -> Result<Outcome, EngineError> {
        while self.state.source.more() {
            self.step()?;
            if self.breakpoint_reached() {
                tracing::debug!(position = %self.state.source.position(), "breakpoint reached");
                return Ok(Outcome::BreakpointReached);
            }
        }
        tracing::info!(steps = self.statistics().steps(), "execution complete");
        Ok(Outcome::Complete)
    }

    /// Evaluate the active breakpoints, dropping one-shot ones that fired
    pub fn breakpoint_reached(&mut self) -> bool {
        let state = &self.state;
        let mut reached = false;
        self.breakpoints.retain(|bp| {
            if bp.holds(state) {
                reached = true;
                !bp.is_once()
            } else {
                true
            }
        });
        reached
    }
}
