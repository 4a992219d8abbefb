//! Befunge-93 on an 80×25 torus

use super::{binary, checked, greater, print_char, print_number, read_char, to_char, Language};
use crate::engine::{
    Command, EngineConfig, EngineError, InterpreterState, Recognizer, RecognizerChain, Symbol,
};
use crate::environment::Stack;
use crate::position::Position;
use crate::source::{Direction, SourceBuffer, TorusBuffer};
use crate::value::{ops, Sentinels, Value};
use rand::Rng;

type State = InterpreterState<TorusBuffer, Stack>;

pub const WIDTH: usize = 80;
pub const HEIGHT: usize = 25;

pub struct Befunge93;

impl Language for Befunge93 {
    type Source = TorusBuffer;
    type Env = Stack;

    const NAME: &'static str = "befunge";

    fn banner() -> String {
        format!("Befunge-93 interpreter ({}x{} torus)", WIDTH, HEIGHT)
    }

    fn prepare(config: &mut EngineConfig) {
        config.sentinels = Sentinels { truth: 1, falsity: 0 };
        config.retain_source_eol = false;
    }

    fn state(_config: &EngineConfig) -> State {
        State::new(TorusBuffer::with_size(WIDTH, HEIGHT), Stack::new())
    }

    fn chain() -> RecognizerChain<TorusBuffer, Stack> {
        let mut chain = RecognizerChain::new()
            .register(StringMode)
            .register(Symbol::new('>', ">", |s: &mut State| travel(s, Direction::Right)).stationary())
            .register(Symbol::new('<', "<", |s: &mut State| travel(s, Direction::Left)).stationary())
            .register(Symbol::new('^', "^", |s: &mut State| travel(s, Direction::Up)).stationary())
            .register(Symbol::new('v', "v", |s: &mut State| travel(s, Direction::Down)).stationary())
            .register(Symbol::new('?', "?", random_direction).stationary())
            .register(
                Symbol::new('_', "_", |s: &mut State| decide(s, Direction::Left, Direction::Right))
                    .stationary(),
            )
            .register(
                Symbol::new('|', "|", |s: &mut State| decide(s, Direction::Up, Direction::Down))
                    .stationary(),
            )
            .register(Symbol::new('@', "@", |s: &mut State| s.source.signal_completion()).stationary())
            .symbol('#', "#", |s: &mut State| {
                s.source.advance();
                Ok(())
            })
            .symbol('+', "+", binary(ops::add))
            .symbol('-', "-", binary(ops::subtract))
            .symbol('*', "*", binary(ops::multiply))
            .symbol('/', "/", checked(ops::divide))
            .symbol('%', "%", checked(ops::remainder))
            .symbol('`', "`", greater)
            .symbol('!', "!", |s: &mut State| {
                let n = s.pop_number()?;
                let result = ops::not(&s.sentinels, n);
                s.push(result);
                Ok(())
            })
            .symbol(':', ":", |s: &mut State| s.environment_mut().duplicate())
            .symbol('\\', "\\", |s: &mut State| s.environment_mut().swap())
            .symbol('$', "$", |s: &mut State| s.pop().map(drop))
            .symbol('.', ".", print_number)
            .symbol(',', ",", print_char)
            .symbol('&', "&", read_number)
            .symbol('~', "~", read_char)
            .symbol('g', "g", |s: &mut State| {
                let cell = grid_reference(s)?;
                let c = s.source.get(&cell)?;
                s.push(Value::Number(c as i64));
                Ok(())
            })
            .symbol('p', "p", |s: &mut State| {
                let cell = grid_reference(s)?;
                let c = to_char(s.pop_number()?)?;
                s.source.put(&cell, c)
            });
        for digit in 0..10u32 {
            let Some(c) = char::from_digit(digit, 10) else { continue };
            chain.push(Symbol::new(c, c.to_string(), move |s: &mut State| {
                s.push(Value::Number(digit as i64));
                Ok(())
            }));
        }
        chain
    }
}

fn travel(state: &mut State, direction: Direction) -> Result<(), EngineError> {
    state.source.travel(direction);
    Ok(())
}

fn random_direction(state: &mut State) -> Result<(), EngineError> {
    let pick = rand::thread_rng().gen_range(0..Direction::ALL.len());
    travel(state, Direction::ALL[pick])
}

/// Pop a value and move `if_true` or `if_false`
fn decide(state: &mut State, if_true: Direction, if_false: Direction) -> Result<(), EngineError> {
    let n = state.pop_number()?;
    let direction = if state.is_true(n) { if_true } else { if_false };
    travel(state, direction)
}

/// Pops y then x
fn grid_reference(state: &mut State) -> Result<Position, EngineError> {
    let row = state.pop_number()?;
    let col = state.pop_number()?;
    Ok(Position::new(col, row))
}

fn read_number(state: &mut State) -> Result<(), EngineError> {
    let line = state.io.read_line("0")?;
    let n = line.trim().parse::<i64>().map_err(|_| EngineError::TypeMismatch {
        expected: "Number".into(),
        got: format!("\"{}\"", line.trim()),
    })?;
    state.push(Value::Number(n));
    Ok(())
}

/// `"` pushes every cell up to the closing quote as a character code
struct StringMode;

impl Recognizer<TorusBuffer, Stack> for StringMode {
    fn name(&self) -> &str {
        "string"
    }

    fn applicable(&self, state: &State) -> bool {
        state.source.current() == Some('"')
    }

    fn gather(
        &self,
        state: &mut State,
        _chain: &RecognizerChain<TorusBuffer, Stack>,
    ) -> Result<Command<TorusBuffer, Stack>, EngineError> {
        let start = state.source.position().clone();
        let mut command = Command::noop("\"");
        state.source.advance();
        // wraps back to the opening quote at worst
        loop {
            match state.source.current() {
                Some('"') => break,
                Some(c) => command = command.with_argument(Value::Number(c as i64)),
                None => {
                    return Err(EngineError::MalformedReference(format!(
                        "unterminated string starting at {}",
                        start
                    )))
                }
            }
            state.source.advance();
        }
        state.source.advance();
        Ok(command)
    }
}
