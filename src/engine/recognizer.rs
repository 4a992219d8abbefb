use super::{Action, Command, EngineError, InterpreterState};
use crate::environment::Environment;
use crate::source::SourceBuffer;
use std::rc::Rc;

/// Decides whether it handles the current source position and, if so,
/// turns it into one [`Command`]
///
/// `gather` is responsible for moving the source past whatever it
/// consumed. The `chain` argument lets a recognizer gather nested
/// commands, e.g. the body of a lambda.
pub trait Recognizer<S, E> {
    fn name(&self) -> &str;

    fn applicable(&self, state: &InterpreterState<S, E>) -> bool;

    fn gather(
        &self,
        state: &mut InterpreterState<S, E>,
        chain: &RecognizerChain<S, E>,
    ) -> Result<Command<S, E>, EngineError>;
}

/// Single-character command with a shared action
///
/// By default the source advances once after the match. A `stationary`
/// symbol leaves positioning entirely to its action.
pub struct Symbol<S, E> {
    symbol: char,
    keyword: String,
    action: Action<S, E>,
    advance: bool,
}

impl<S: SourceBuffer, E: Environment> Symbol<S, E> {
    pub fn new<F>(symbol: char, keyword: impl Into<String>, action: F) -> Self
    where
        F: Fn(&mut InterpreterState<S, E>) -> Result<(), EngineError> + 'static,
    {
        Symbol {
            symbol,
            keyword: keyword.into(),
            action: Rc::new(action),
            advance: true,
        }
    }

    pub fn stationary(mut self) -> Self {
        self.advance = false;
        self
    }
}

impl<S: SourceBuffer, E: Environment> Recognizer<S, E> for Symbol<S, E> {
    fn name(&self) -> &str {
        &self.keyword
    }

    fn applicable(&self, state: &InterpreterState<S, E>) -> bool {
        state.source.current() == Some(self.symbol)
    }

    fn gather(
        &self,
        state: &mut InterpreterState<S, E>,
        _chain: &RecognizerChain<S, E>,
    ) -> Result<Command<S, E>, EngineError> {
        let command = Command::from_action(self.keyword.clone(), Rc::clone(&self.action));
        if self.advance {
            state.source.advance();
        }
        Ok(command)
    }
}

/// Catch-all that walks over tokens nobody else claims
#[derive(Debug, Default, Clone, Copy)]
pub struct UnknownTokenSkipper;

impl UnknownTokenSkipper {
    fn skip<S: SourceBuffer, E: Environment>(
        &self,
        state: &mut InterpreterState<S, E>,
        chain: &RecognizerChain<S, E>,
    ) -> Command<S, E> {
        let from = state.source.position().clone();
        // A torus never runs out, so bound the walk by one full lap.
        let mut budget = state.source.cell_count().max(1);
        loop {
            let more = state.source.advance();
            budget -= 1;
            if !more || budget == 0 || chain.claims(state) {
                break;
            }
        }
        tracing::trace!(from = %from, to = %state.source.position(), "skipped unknown tokens");
        Command::noop("skip")
    }
}

/// Recognizers in priority order; the first applicable one wins
pub struct RecognizerChain<S, E> {
    recognizers: Vec<Box<dyn Recognizer<S, E>>>,
    skipper: Option<UnknownTokenSkipper>,
}

impl<S: SourceBuffer, E: Environment> Default for RecognizerChain<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SourceBuffer, E: Environment> RecognizerChain<S, E> {
    /// Empty chain with the unknown-token skipper in place
    pub fn new() -> Self {
        RecognizerChain {
            recognizers: Vec::new(),
            skipper: Some(UnknownTokenSkipper),
        }
    }

    /// Chain without a catch-all; unclaimed tokens are fatal
    pub fn strict() -> Self {
        RecognizerChain {
            recognizers: Vec::new(),
            skipper: None,
        }
    }

    pub fn register(mut self, recognizer: impl Recognizer<S, E> + 'static) -> Self {
        self.push(recognizer);
        self
    }

    pub fn push(&mut self, recognizer: impl Recognizer<S, E> + 'static) {
        self.recognizers.push(Box::new(recognizer));
    }

    pub fn symbol<F>(self, symbol: char, keyword: &str, action: F) -> Self
    where
        F: Fn(&mut InterpreterState<S, E>) -> Result<(), EngineError> + 'static,
    {
        self.register(Symbol::new(symbol, keyword, action))
    }

    pub fn len(&self) -> usize {
        self.recognizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recognizers.is_empty()
    }

    /// Names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.recognizers.iter().map(|r| r.name()).collect()
    }

    fn select(&self, state: &InterpreterState<S, E>) -> Option<&dyn Recognizer<S, E>> {
        self.recognizers
            .iter()
            .find(|r| r.applicable(state))
            .map(|r| r.as_ref())
    }

    /// Whether a registered recognizer handles the current position
    pub fn claims(&self, state: &InterpreterState<S, E>) -> bool {
        self.select(state).is_some()
    }

    /// Produce the command for the current source position
    pub fn gather(&self, state: &mut InterpreterState<S, E>) -> Result<Command<S, E>, EngineError> {
        if let Some(recognizer) = self.select(state) {
            let command = recognizer.gather(state, self)?;
            tracing::debug!(recognizer = recognizer.name(), "command created: {}", command.keyword());
            return Ok(command);
        }
        match self.skipper {
            Some(skipper) => Ok(skipper.skip(state, self)),
            None => Err(EngineError::UnknownInstruction(
                state
                    .source
                    .current()
                    .map(|c| format!("'{}' at {}", c, state.source.position()))
                    .unwrap_or_else(|| format!("end of input at {}", state.source.position())),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Stack;
    use crate::source::LinearBuffer;
    use crate::value::Value;

    type State = InterpreterState<LinearBuffer, Stack>;

    fn state(text: &str) -> State {
        State::new(LinearBuffer::new(vec![text.to_string()]), Stack::new())
    }

    fn one(s: &mut State) -> Result<(), EngineError> {
        s.push(Value::Number(1));
        Ok(())
    }

    fn two(s: &mut State) -> Result<(), EngineError> {
        s.push(Value::Number(2));
        Ok(())
    }

    #[test]
    fn first_applicable_wins() {
        let chain = RecognizerChain::new()
            .symbol('x', "first", one)
            .symbol('x', "second", two);
        let mut st = state("x");
        let cmd = chain.gather(&mut st).unwrap();
        assert_eq!(cmd.keyword(), "first");
        cmd.apply(&mut st).unwrap();
        assert_eq!(st.pop_number().unwrap(), 1);
    }

    #[test]
    fn symbol_advances_unless_stationary() {
        let chain = RecognizerChain::new()
            .symbol('a', "moves", one)
            .register(Symbol::new('b', "stays", two).stationary());
        let mut st = state("ab");
        chain.gather(&mut st).unwrap();
        assert!(st.source.position().is_at(1, 0));
        chain.gather(&mut st).unwrap();
        assert!(st.source.position().is_at(1, 0));
    }

    #[test]
    fn skipper_stops_at_claimed_token() {
        let chain = RecognizerChain::new().symbol('x', "x", one);
        let mut st = state("  \tx");
        let cmd = chain.gather(&mut st).unwrap();
        assert_eq!(cmd.keyword(), "skip");
        assert!(st.source.position().is_at(3, 0));
    }

    #[test]
    fn strict_chain_reports_unknown_instruction() {
        let chain: RecognizerChain<LinearBuffer, Stack> = RecognizerChain::strict().symbol('x', "x", one);
        let mut st = state("?");
        let err = chain.gather(&mut st).unwrap_err();
        assert!(matches!(err, EngineError::UnknownInstruction(ref m) if m.contains('?')));
    }

    #[test]
    fn names_follow_registration_order() {
        let chain: RecognizerChain<LinearBuffer, Stack> =
            RecognizerChain::new().symbol('a', "alpha", one).symbol('b', "beta", two);
        assert_eq!(chain.names(), vec!["alpha", "beta"]);
        assert_eq!(chain.len(), 2);
    }
}
