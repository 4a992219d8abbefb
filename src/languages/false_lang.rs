//! FALSE
//!
//! Lambdas are gathered through the chain when their `[` is reached and
//! stored in the interpreter's lambda table; the stack only carries the
//! handle. Variables `a`–`z` live in the variable table.

use super::{binary, checked, greater, print_char, print_number, read_char, Language};
use crate::engine::{Command, EngineConfig, EngineError, InterpreterState, Recognizer, RecognizerChain};
use crate::environment::Stack;
use crate::signals;
use crate::source::{LinearBuffer, SourceBuffer};
use crate::value::{ops, Label, LambdaRef, Value, Variable};

type State = InterpreterState<LinearBuffer, Stack>;
type Chain = RecognizerChain<LinearBuffer, Stack>;

pub struct False;

impl Language for False {
    type Source = LinearBuffer;
    type Env = Stack;

    const NAME: &'static str = "false";

    fn banner() -> String {
        "FALSE interpreter".to_string()
    }

    fn state(_config: &EngineConfig) -> State {
        State::new(LinearBuffer::default(), Stack::new())
    }

    fn chain() -> Chain {
        RecognizerChain::new()
            .register(NumberLiteral)
            .register(CharLiteral)
            .register(VariableName)
            .register(LambdaLiteral)
            .register(Delimited::comment())
            .register(Delimited::string())
            .register(Extended)
            .symbol(']', "]", |_: &mut State| {
                Err(EngineError::MalformedReference("']' without '['".into()))
            })
            .symbol('$', "$", |s: &mut State| s.environment_mut().duplicate())
            .symbol('%', "%", |s: &mut State| s.pop().map(drop))
            .symbol('`', "`", |s: &mut State| s.pop().map(drop))
            .symbol('\\', "\\", |s: &mut State| s.environment_mut().swap())
            .symbol('@', "@", |s: &mut State| s.environment_mut().rotate())
            .symbol('ø', "ø", pick)
            .symbol('(', "(", pick)
            .symbol('+', "+", binary(ops::add))
            .symbol('-', "-", binary(ops::subtract))
            .symbol('*', "*", binary(ops::multiply))
            .symbol('/', "/", checked(ops::divide))
            .symbol('_', "_", |s: &mut State| {
                let n = s.pop_number()?;
                s.push(ops::negate(n));
                Ok(())
            })
            .symbol('=', "=", |s: &mut State| {
                let rhs = s.pop_number()?;
                let lhs = s.pop_number()?;
                let result = ops::equal(&s.sentinels, lhs, rhs);
                s.push(result);
                Ok(())
            })
            .symbol('>', ">", greater)
            .symbol('<', "<", |s: &mut State| {
                let rhs = s.pop_number()?;
                let lhs = s.pop_number()?;
                let result = ops::less(&s.sentinels, lhs, rhs);
                s.push(result);
                Ok(())
            })
            .symbol('&', "&", binary(ops::and))
            .symbol('|', "|", binary(ops::or))
            .symbol('~', "~", |s: &mut State| {
                let n = s.pop_number()?;
                let result = ops::not(&s.sentinels, n);
                s.push(result);
                Ok(())
            })
            .symbol(':', ":", |s: &mut State| {
                let Variable(name) = s.environment_mut().pop_as::<Variable>()?;
                let value = s.pop()?;
                s.variables.insert(name, value);
                Ok(())
            })
            .symbol(';', ";", |s: &mut State| {
                let Variable(name) = s.environment_mut().pop_as::<Variable>()?;
                let value = s.variable(&name)?.clone();
                s.push(value);
                Ok(())
            })
            .symbol('!', "!", |s: &mut State| {
                let lambda = s.environment_mut().pop_as::<LambdaRef>()?;
                s.call_lambda(lambda)
            })
            .symbol('?', "?", |s: &mut State| {
                let lambda = s.environment_mut().pop_as::<LambdaRef>()?;
                let condition = s.pop_number()?;
                if s.is_true(condition) {
                    s.call_lambda(lambda)?;
                }
                Ok(())
            })
            .symbol('#', "#", while_loop)
            .symbol('.', ".", print_number)
            .symbol(',', ",", print_char)
            .symbol('^', "^", read_char)
    }
}

fn pick(state: &mut State) -> Result<(), EngineError> {
    let index = state.pop_number()?;
    let index = usize::try_from(index).map_err(|_| EngineError::InvalidIndex(index))?;
    state.environment_mut().pick(index)
}

/// `[test][body]#`: run body while test leaves a true value
fn while_loop(state: &mut State) -> Result<(), EngineError> {
    let body = state.environment_mut().pop_as::<LambdaRef>()?;
    let test = state.environment_mut().pop_as::<LambdaRef>()?;
    loop {
        if signals::interrupted() {
            return Err(EngineError::Interrupted);
        }
        state.call_lambda(test)?;
        let condition = state.pop_number()?;
        if !state.is_true(condition) {
            return Ok(());
        }
        state.call_lambda(body)?;
    }
}

/// `)st name)` / `)ct)` start and stop a timer, `)rs)` / `)ds)` reset and print statistics
struct Extended;

impl Recognizer<LinearBuffer, Stack> for Extended {
    fn name(&self) -> &str {
        "extended"
    }

    fn applicable(&self, state: &State) -> bool {
        state.source.current() == Some(')')
    }

    fn gather(&self, state: &mut State, _chain: &Chain) -> Result<Command<LinearBuffer, Stack>, EngineError> {
        let start = state.source.position().clone();
        let mut key = String::new();
        for _ in 0..2 {
            let c = state.source.advance_and_return().ok_or_else(|| {
                EngineError::MalformedReference(format!("extended command at {} is cut short", start))
            })?;
            key.push(c);
        }
        state.source.advance();
        let mut context = String::new();
        loop {
            match state.source.current() {
                Some(')') => break,
                Some(c) => context.push(c),
                None => {
                    return Err(EngineError::MalformedReference(format!(
                        "extended command at {} is never closed",
                        start
                    )))
                }
            }
            state.source.advance();
        }
        state.source.advance();
        match key.as_str() {
            "st" => {
                let name = if context.trim().is_empty() {
                    "Unnamed task".to_string()
                } else {
                    context.trim().to_string()
                };
                Ok(Command::new("st", |s: &mut State| {
                    let Label(name) = s.environment_mut().pop_as::<Label>()?;
                    s.start_timer(name);
                    Ok(())
                })
                .with_argument(Value::Label(name)))
            }
            "ct" => Ok(Command::new("ct", |s: &mut State| {
                let (name, elapsed) = s.stop_timer()?;
                s.io.write_str(&format!(
                    "{} completes; execution time: {:.3}ms\n",
                    name,
                    elapsed.as_secs_f64() * 1000.0
                ))?;
                Ok(())
            })),
            "rs" => Ok(Command::new("rs", |s: &mut State| {
                s.statistics_mut().reset();
                Ok(())
            })),
            "ds" => Ok(Command::new("ds", |s: &mut State| {
                let mut out = String::from("Statistics\n");
                for (keyword, count) in s.statistics().counts() {
                    out.push_str(&format!("{} == {}\n", keyword, count));
                }
                s.io.write_str(&out)?;
                Ok(())
            })),
            other => Err(EngineError::UnknownInstruction(format!(
                "extended command \"{}\" at {}",
                other, start
            ))),
        }
    }
}

struct NumberLiteral;

impl Recognizer<LinearBuffer, Stack> for NumberLiteral {
    fn name(&self) -> &str {
        "number"
    }

    fn applicable(&self, state: &State) -> bool {
        state.source.current().map_or(false, |c| c.is_ascii_digit())
    }

    fn gather(&self, state: &mut State, _chain: &Chain) -> Result<Command<LinearBuffer, Stack>, EngineError> {
        let mut digits = String::new();
        while let Some(c) = state.source.current().filter(char::is_ascii_digit) {
            digits.push(c);
            state.source.advance();
        }
        let n = digits
            .parse::<i64>()
            .map_err(|e| EngineError::Arithmetic(format!("{}: {}", digits, e)))?;
        Ok(Command::literal("number", Value::Number(n)))
    }
}

/// `'c` pushes the character code of `c`
struct CharLiteral;

impl Recognizer<LinearBuffer, Stack> for CharLiteral {
    fn name(&self) -> &str {
        "character"
    }

    fn applicable(&self, state: &State) -> bool {
        state.source.current() == Some('\'')
    }

    fn gather(&self, state: &mut State, _chain: &Chain) -> Result<Command<LinearBuffer, Stack>, EngineError> {
        let c = state.source.advance_and_return().ok_or_else(|| {
            EngineError::MalformedReference("character literal at end of input".into())
        })?;
        state.source.advance();
        Ok(Command::literal("character", Value::Number(c as i64)))
    }
}

struct VariableName;

impl Recognizer<LinearBuffer, Stack> for VariableName {
    fn name(&self) -> &str {
        "variable"
    }

    fn applicable(&self, state: &State) -> bool {
        state.source.current().map_or(false, |c| c.is_ascii_lowercase())
    }

    fn gather(&self, state: &mut State, _chain: &Chain) -> Result<Command<LinearBuffer, Stack>, EngineError> {
        let name = state.source.current().map(String::from).unwrap_or_default();
        state.source.advance();
        Ok(Command::literal("variable", Value::Variable(name)))
    }
}

/// `[ ... ]`, gathered command by command through the chain
struct LambdaLiteral;

impl Recognizer<LinearBuffer, Stack> for LambdaLiteral {
    fn name(&self) -> &str {
        "lambda"
    }

    fn applicable(&self, state: &State) -> bool {
        state.source.current() == Some('[')
    }

    fn gather(&self, state: &mut State, chain: &Chain) -> Result<Command<LinearBuffer, Stack>, EngineError> {
        let start = state.source.position().clone();
        state.source.advance();
        let mut body = Vec::new();
        loop {
            match state.source.current() {
                Some(']') => break,
                Some(_) => body.push(chain.gather(state)?),
                None => {
                    return Err(EngineError::MalformedReference(format!(
                        "lambda starting at {} is never closed",
                        start
                    )))
                }
            }
        }
        state.source.advance();
        let handle = state.register_lambda(body);
        Ok(Command::literal("lambda", Value::Lambda(handle)))
    }
}

/// Text between an opening and closing character
struct Delimited {
    open: char,
    close: char,
    print: bool,
}

impl Delimited {
    fn comment() -> Self {
        Delimited {
            open: '{',
            close: '}',
            print: false,
        }
    }

    fn string() -> Self {
        Delimited {
            open: '"',
            close: '"',
            print: true,
        }
    }
}

impl Recognizer<LinearBuffer, Stack> for Delimited {
    fn name(&self) -> &str {
        if self.print {
            "string"
        } else {
            "comment"
        }
    }

    fn applicable(&self, state: &State) -> bool {
        state.source.current() == Some(self.open)
    }

    fn gather(&self, state: &mut State, _chain: &Chain) -> Result<Command<LinearBuffer, Stack>, EngineError> {
        let start = state.source.position().clone();
        let mut text = String::new();
        state.source.advance();
        loop {
            match state.source.current() {
                Some(c) if c == self.close => break,
                Some(c) => text.push(c),
                None => {
                    return Err(EngineError::MalformedReference(format!(
                        "'{}' at {} is never closed",
                        self.open, start
                    )))
                }
            }
            state.source.advance();
        }
        state.source.advance();
        if !self.print {
            return Ok(Command::noop("comment"));
        }
        Ok(Command::new("string", move |s: &mut State| {
            s.io.write_str(&text)?;
            Ok(())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Outcome;
    use crate::environment::Environment;
    use crate::io::MemoryIo;

    fn run_with(program: &str, input: &str) -> Result<String, EngineError> {
        let io = MemoryIo::new(input);
        let out = io.output_handle();
        let mut interp = False::interpreter(&EngineConfig::default());
        interp.state_mut().io = Box::new(io);
        interp.load_str(program);
        assert_eq!(interp.execute()?, Outcome::Complete);
        let printed = out.borrow().clone();
        Ok(printed)
    }

    fn run(program: &str) -> String {
        run_with(program, "").unwrap()
    }

    #[test]
    fn arithmetic() {
        assert_eq!(run("1 2+."), "3");
        assert_eq!(run("7 2/. 7_ 2/."), "3-3");
        assert_eq!(run("6 7*5-."), "37");
        assert_eq!(run("5_."), "-5");
    }

    #[test]
    fn comparisons_use_default_sentinels() {
        assert_eq!(run("3 2>."), "-1");
        assert_eq!(run("2 3>."), "0");
        assert_eq!(run("2 3<."), "-1");
        assert_eq!(run("4 4=."), "-1");
        assert_eq!(run("0~. 1~."), "-10");
        assert_eq!(run("6 3&. 6 3|."), "27");
    }

    #[test]
    fn stack_words() {
        assert_eq!(run("1 2 3@..."), "132");
        assert_eq!(run("1 2\\.."), "12");
        assert_eq!(run("4$.."), "44");
        assert_eq!(run("4 5%."), "4");
        assert_eq!(run("7 8 9 1ø."), "8");
        assert_eq!(run("7 8 9 2(."), "7");
    }

    #[test]
    fn variables_store_and_fetch() {
        assert_eq!(run("5a: a;a;+."), "10");
    }

    #[test]
    fn lambdas_call_and_nest() {
        assert_eq!(run("[1+]f: 5f;!."), "6");
        assert_eq!(run("[[1.]!]!"), "1");
    }

    #[test]
    fn conditional() {
        assert_eq!(run("1[\"yes\"]?"), "yes");
        assert_eq!(run("0[\"yes\"]?"), "");
    }

    #[test]
    fn while_loop_counts_down() {
        assert_eq!(run("5i:[i;0>][i;.i;1-i:]#"), "54321");
    }

    #[test]
    fn characters_strings_and_comments() {
        assert_eq!(run("'A,"), "A");
        assert_eq!(run("{ignored 1.}\"hi\" 2."), "hi2");
    }

    #[test]
    fn reads_characters() {
        assert_eq!(run_with("^^,,^.", "ab").unwrap(), "ba-1");
    }

    #[test]
    fn malformed_programs() {
        assert!(matches!(run_with("[1", ""), Err(EngineError::MalformedReference(_))));
        assert!(matches!(run_with("1]", ""), Err(EngineError::MalformedReference(_))));
        assert!(matches!(run_with("\"abc", ""), Err(EngineError::MalformedReference(_))));
        assert!(matches!(run_with("x;", ""), Err(EngineError::MalformedReference(_))));
    }

    #[test]
    fn runtime_errors() {
        assert!(matches!(run_with("1 0/", ""), Err(EngineError::Arithmetic(_))));
        assert!(matches!(run_with("1!", ""), Err(EngineError::TypeMismatch { .. })));
        assert!(matches!(run_with("%", ""), Err(EngineError::StackUnderflow(_))));
    }

    #[test]
    fn backtick_drops_like_percent() {
        assert_eq!(run("4 5`."), "4");
        assert!(matches!(run_with("`", ""), Err(EngineError::StackUnderflow(_))));
    }

    #[test]
    fn timers_report_their_name() {
        let out = run(")st outer)1 2+%)ct)");
        assert!(out.starts_with("outer completes; execution time: "));
        assert!(out.ends_with("ms\n"));
        assert_eq!(run(")st))ct)").split(" completes").next(), Some("Unnamed task"));
        assert!(matches!(run_with(")ct)", ""), Err(EngineError::StackUnderflow(_))));
    }

    #[test]
    fn statistics_reset_and_dump() {
        let out = run("1 2+%)rs)3 4*%)ds)");
        assert!(out.starts_with("Statistics\n"));
        assert!(out.contains("number == 2\n"));
        assert!(out.contains("* == 1\n"));
        assert!(out.contains("rs == 1\n"));
        assert!(!out.contains("+ == "));
    }

    #[test]
    fn extended_commands_must_be_known_and_closed() {
        assert!(matches!(run_with(")zz)", ""), Err(EngineError::UnknownInstruction(_))));
        assert!(matches!(run_with(")st abc", ""), Err(EngineError::MalformedReference(_))));
        assert!(matches!(run_with(")s", ""), Err(EngineError::MalformedReference(_))));
    }

    #[test]
    fn lambda_leaves_handle_on_stack() {
        let mut interp = False::interpreter(&EngineConfig::default());
        interp.load_str("[1]");
        interp.execute().unwrap();
        let top = interp.state().environment().stack().peek().cloned();
        assert!(matches!(top, Some(Value::Lambda(_))));
    }
}
