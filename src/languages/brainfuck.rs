//! Brainfuck over a linear source and a tape
//!
//! Cells hold 8-bit values that wrap; reading at end of input stores 0.

use super::{to_char, Language};
use crate::engine::{EngineConfig, EngineError, InterpreterState, RecognizerChain, Symbol};
use crate::environment::Tape;
use crate::source::{LinearBuffer, SeekDirection, SourceBuffer};
use crate::value::Value;

type State = InterpreterState<LinearBuffer, Tape>;

/// Conventional tape length
pub const TAPE_CELLS: usize = 30_000;

pub struct Brainfuck;

impl Language for Brainfuck {
    type Source = LinearBuffer;
    type Env = Tape;

    const NAME: &'static str = "brainfuck";

    fn banner() -> String {
        format!("Brainfuck interpreter ({} cell tape)", TAPE_CELLS)
    }

    fn prepare(config: &mut EngineConfig) {
        config.tape.max_size = TAPE_CELLS;
    }

    fn state(config: &EngineConfig) -> State {
        State::new(LinearBuffer::default(), Tape::with_config(config.tape))
    }

    fn chain() -> RecognizerChain<LinearBuffer, Tape> {
        RecognizerChain::new()
            .symbol('>', ">", |s: &mut State| s.environment_mut().advance())
            .symbol('<', "<", |s: &mut State| {
                s.environment_mut().retreat();
                Ok(())
            })
            .symbol('+', "+", |s: &mut State| adjust(s, 1))
            .symbol('-', "-", |s: &mut State| adjust(s, -1))
            .symbol('.', ".", |s: &mut State| {
                let c = to_char(s.environment().current_number()?)?;
                s.io.write_char(c)?;
                Ok(())
            })
            .symbol(',', ",", |s: &mut State| {
                let n = s.io.read_char()?.map_or(0, |c| c as i64);
                s.environment_mut().set_current_cell(Value::Number(n.rem_euclid(256)))
            })
            .register(Symbol::new('[', "[", open_loop).stationary())
            .register(Symbol::new(']', "]", close_loop).stationary())
    }
}

fn adjust(state: &mut State, delta: i64) -> Result<(), EngineError> {
    let tape = state.environment_mut();
    let n = (tape.current_number()? + delta).rem_euclid(256);
    tape.set_current_cell(Value::Number(n))
}

/// On zero, jump past the matching `]`
fn open_loop(state: &mut State) -> Result<(), EngineError> {
    if state.environment().current_number()? != 0 {
        state.source.advance();
        return Ok(());
    }
    state.source.advance();
    state.source.seek(']', SeekDirection::Forward, Some('['))?;
    state.source.advance();
    Ok(())
}

/// Jump back to the matching `[`, which then re-tests the cell
fn close_loop(state: &mut State) -> Result<(), EngineError> {
    state.source.backup()?;
    state.source.seek('[', SeekDirection::Backward, Some(']'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Interpreter, Outcome};
    use crate::io::MemoryIo;

    fn interpreter(program: &str, input: &str) -> (Interpreter<LinearBuffer, Tape>, MemoryIo) {
        let io = MemoryIo::new(input);
        let mut interp = Brainfuck::interpreter(&EngineConfig::default());
        interp.state_mut().io = Box::new(io.clone());
        interp.load_str(program);
        (interp, io)
    }

    #[test]
    fn prints_a() {
        let (mut interp, io) = interpreter("++++++++[>++++++++<-]>+.", "");
        assert_eq!(interp.execute().unwrap(), Outcome::Complete);
        assert_eq!(io.output(), "A");
    }

    #[test]
    fn nested_loops_multiply() {
        let (mut interp, _) = interpreter("++[>+++[>+<-]<-]>>", "");
        interp.execute().unwrap();
        let tape = interp.state().environment();
        assert_eq!(tape.pointer(), 2);
        assert_eq!(tape.current_number().unwrap(), 6);
    }

    #[test]
    fn skips_loop_on_zero_and_ignores_comments() {
        let (mut interp, io) = interpreter("[this is skipped +++.]\n+++ a comment\n[-]+.", "");
        interp.execute().unwrap();
        assert_eq!(io.output(), "\u{1}");
    }

    #[test]
    fn echo_until_end_of_input() {
        let (mut interp, io) = interpreter(",[.,]", "hey");
        interp.execute().unwrap();
        assert_eq!(io.output(), "hey");
    }

    #[test]
    fn cells_wrap_at_a_byte() {
        let (mut interp, _) = interpreter("-", "");
        interp.execute().unwrap();
        assert_eq!(interp.state().environment().current_number().unwrap(), 255);
    }

    #[test]
    fn retreat_clamps_at_zero() {
        let (mut interp, _) = interpreter("<<+", "");
        interp.execute().unwrap();
        assert_eq!(interp.state().environment().pointer(), 0);
        assert_eq!(interp.state().environment().current_number().unwrap(), 1);
    }

    #[test]
    fn unmatched_brackets_are_malformed() {
        let (mut interp, _) = interpreter("[+", "");
        assert!(matches!(interp.execute(), Err(EngineError::MalformedReference(_))));

        let (mut interp, _) = interpreter("+]", "");
        assert!(matches!(interp.execute(), Err(EngineError::MalformedReference(_))));
    }

    #[test]
    fn runaway_tape_hits_the_ceiling() {
        let (mut interp, _) = interpreter("+[>+]", "");
        match interp.execute() {
            Err(EngineError::CapacityExceeded { maximum, .. }) => assert_eq!(maximum, TAPE_CELLS),
            other => panic!("expected capacity error, got {:?}", other),
        }
    }

    #[test]
    fn configured_ceiling_overrides_default() {
        let config = EngineConfig {
            tape_max: Some(10),
            ..EngineConfig::default()
        };
        let mut interp = Brainfuck::interpreter(&config);
        interp.load_str("+[>+]");
        match interp.execute() {
            Err(EngineError::CapacityExceeded { maximum, .. }) => assert_eq!(maximum, 10),
            other => panic!("expected capacity error, got {:?}", other),
        }
    }

    #[test]
    fn seek_cache_gives_same_result() {
        let program = "++++++++[>++++++++<-]>+.";
        let (mut interp, io) = interpreter(program, "");
        interp.configure(&EngineConfig {
            seek_cache: true,
            ..EngineConfig::default()
        });
        interp.load_str(program);
        interp.execute().unwrap();
        assert_eq!(io.output(), "A");
    }
}
