//! Language tables
//!
//! Each language is a zero-sized type naming its source layout, its
//! environment and the recognizer chain that gives the characters
//! meaning. Nothing here reaches into the engine beyond the public
//! recognizer and command interfaces.

mod befunge;
mod brainfuck;
mod false_lang;

pub use befunge::Befunge93;
pub use brainfuck::Brainfuck;
pub use false_lang::False;

use crate::engine::{
    EngineConfig, EngineError, Interpreter, InterpreterState, RecognizerChain,
};
use crate::environment::Environment;
use crate::source::SourceBuffer;
use crate::value::ops;
use std::fmt;
use std::str::FromStr;

pub trait Language {
    type Source: SourceBuffer;
    type Env: Environment;

    /// Name accepted on the command line
    const NAME: &'static str;

    fn banner() -> String {
        format!("{} interpreter", Self::NAME)
    }

    /// Language-specific adjustments to the engine defaults
    fn prepare(_config: &mut EngineConfig) {}

    fn state(config: &EngineConfig) -> InterpreterState<Self::Source, Self::Env>;

    fn chain() -> RecognizerChain<Self::Source, Self::Env>;

    /// A fresh interpreter ready to load a program
    fn interpreter(config: &EngineConfig) -> Interpreter<Self::Source, Self::Env> {
        let mut config = config.clone();
        Self::prepare(&mut config);
        if let Some(max_size) = config.tape_max {
            config.tape.max_size = max_size;
        }
        let mut interpreter = Interpreter::new(Self::state(&config), Self::chain());
        interpreter.configure(&config);
        interpreter
    }
}

/// Languages selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageKind {
    Befunge93,
    Brainfuck,
    False,
}

impl LanguageKind {
    pub const ALL: [LanguageKind; 3] = [
        LanguageKind::Befunge93,
        LanguageKind::Brainfuck,
        LanguageKind::False,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LanguageKind::Befunge93 => Befunge93::NAME,
            LanguageKind::Brainfuck => Brainfuck::NAME,
            LanguageKind::False => False::NAME,
        }
    }
}

impl fmt::Display for LanguageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LanguageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "befunge" | "befunge93" | "befunge-93" => Ok(LanguageKind::Befunge93),
            "brainfuck" | "bf" => Ok(LanguageKind::Brainfuck),
            "false" => Ok(LanguageKind::False),
            other => Err(format!("unknown language: {}", other)),
        }
    }
}

// Shared stack-arithmetic actions. The right-hand operand is on top.

pub(crate) fn binary<S, E>(
    f: fn(i64, i64) -> crate::value::Value,
) -> impl Fn(&mut InterpreterState<S, E>) -> Result<(), EngineError>
where
    S: SourceBuffer,
    E: Environment,
{
    move |state| {
        let rhs = state.pop_number()?;
        let lhs = state.pop_number()?;
        state.push(f(lhs, rhs));
        Ok(())
    }
}

pub(crate) fn checked<S, E>(
    f: fn(i64, i64) -> Result<crate::value::Value, EngineError>,
) -> impl Fn(&mut InterpreterState<S, E>) -> Result<(), EngineError>
where
    S: SourceBuffer,
    E: Environment,
{
    move |state| {
        let rhs = state.pop_number()?;
        let lhs = state.pop_number()?;
        state.push(f(lhs, rhs)?);
        Ok(())
    }
}

pub(crate) fn greater<S: SourceBuffer, E: Environment>(
    state: &mut InterpreterState<S, E>,
) -> Result<(), EngineError> {
    let rhs = state.pop_number()?;
    let lhs = state.pop_number()?;
    let result = ops::greater(&state.sentinels, lhs, rhs);
    state.push(result);
    Ok(())
}

pub(crate) fn print_number<S: SourceBuffer, E: Environment>(
    state: &mut InterpreterState<S, E>,
) -> Result<(), EngineError> {
    let n = state.pop_number()?;
    state.io.write_str(&n.to_string())?;
    Ok(())
}

pub(crate) fn to_char(n: i64) -> Result<char, EngineError> {
    u32::try_from(n)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| EngineError::Arithmetic(format!("{} is not a character", n)))
}

pub(crate) fn print_char<S: SourceBuffer, E: Environment>(
    state: &mut InterpreterState<S, E>,
) -> Result<(), EngineError> {
    let c = to_char(state.pop_number()?)?;
    state.io.write_char(c)?;
    Ok(())
}

/// Pushes the next input character, or -1 at end of input
pub(crate) fn read_char<S: SourceBuffer, E: Environment>(
    state: &mut InterpreterState<S, E>,
) -> Result<(), EngineError> {
    let n = state.io.read_char()?.map_or(-1, |c| c as i64);
    state.push(crate::value::Value::Number(n));
    Ok(())
}
