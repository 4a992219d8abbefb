//! Step mode and breakpoint handling
//!
//! [`StepController`] drives an [`Interpreter`] through two modes. While
//! running, it lets the dispatch loop go until completion or a breakpoint.
//! While stepping, it shows the state through an observer and asks a
//! [`Prompt`] what to do next.

use crate::engine::{EngineError, Interpreter, InterpreterState, Outcome};
use crate::environment::Environment;
use crate::source::SourceBuffer;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::collections::VecDeque;

/// What the user asked for at the step prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Execute exactly one step
    Step,
    /// Drop every breakpoint and run to completion
    Continue,
    /// Run until the next breakpoint fires
    NextBreakpoint,
}

impl Directive {
    /// Empty input steps; `c` and `n` continue
    pub fn parse(input: &str) -> Option<Directive> {
        match input.trim() {
            "" => Some(Directive::Step),
            "c" => Some(Directive::Continue),
            "n" => Some(Directive::NextBreakpoint),
            _ => None,
        }
    }
}

pub trait Prompt {
    fn directive(&mut self) -> Result<Directive, EngineError>;
}

const STEP_HELP: &str =
    "[c] = continue (ignore breakpoints), [n] = execute to next breakpoint\n[ENTER] to step...";

/// Line-edited prompt on the controlling terminal
pub struct TerminalPrompt {
    editor: DefaultEditor,
}

impl TerminalPrompt {
    pub fn new() -> Result<Self, ReadlineError> {
        Ok(TerminalPrompt {
            editor: DefaultEditor::new()?,
        })
    }
}

impl Prompt for TerminalPrompt {
    fn directive(&mut self) -> Result<Directive, EngineError> {
        println!("{}", STEP_HELP);
        loop {
            match self.editor.readline("") {
                Ok(line) => match Directive::parse(&line) {
                    Some(directive) => return Ok(directive),
                    None => println!("? => Don't understand {}", line.trim()),
                },
                Err(ReadlineError::Interrupted) => return Err(EngineError::Interrupted),
                // No more input: stop asking and let the program finish
                Err(ReadlineError::Eof) => return Ok(Directive::Continue),
                Err(ReadlineError::Io(e)) => return Err(EngineError::Io(e)),
                Err(e) => return Err(EngineError::Io(std::io::Error::other(e.to_string()))),
            }
        }
    }
}

/// Canned directives; answers `Continue` once exhausted
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompt {
    directives: VecDeque<Directive>,
    asked: usize,
}

impl ScriptedPrompt {
    pub fn new(directives: impl IntoIterator<Item = Directive>) -> Self {
        ScriptedPrompt {
            directives: directives.into_iter().collect(),
            asked: 0,
        }
    }

    /// How many times a directive was requested
    pub fn asked(&self) -> usize {
        self.asked
    }
}

impl Prompt for ScriptedPrompt {
    fn directive(&mut self) -> Result<Directive, EngineError> {
        self.asked += 1;
        Ok(self.directives.pop_front().unwrap_or(Directive::Continue))
    }
}

type Observer<S, E> = Box<dyn FnMut(&InterpreterState<S, E>)>;

pub struct StepController<P, S, E> {
    prompt: P,
    stepping: bool,
    observer: Option<Observer<S, E>>,
}

impl<P: Prompt, S: SourceBuffer, E: Environment> StepController<P, S, E> {
    pub fn new(prompt: P) -> Self {
        StepController {
            prompt,
            stepping: false,
            observer: None,
        }
    }

    /// Begin in stepping mode instead of running
    pub fn stepping(mut self, stepping: bool) -> Self {
        self.stepping = stepping;
        self
    }

    /// Called with the state each time stepping mode is about to prompt
    pub fn with_observer(mut self, observer: impl FnMut(&InterpreterState<S, E>) + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    pub fn is_stepping(&self) -> bool {
        self.stepping
    }

    fn notify(&mut self, state: &InterpreterState<S, E>) {
        if let Some(observer) = self.observer.as_mut() {
            observer(state);
        }
    }

    /// Drive `interpreter` until its source is exhausted
    pub fn run(&mut self, interpreter: &mut Interpreter<S, E>) -> Result<(), EngineError> {
        while interpreter.more() {
            if self.stepping {
                self.notify(interpreter.state());
                match self.prompt.directive()? {
                    Directive::Step => {
                        interpreter.step()?;
                    }
                    Directive::Continue => {
                        interpreter.clear_breakpoints();
                        self.stepping = false;
                    }
                    Directive::NextBreakpoint => self.stepping = false,
                }
            } else {
                match interpreter.execute()? {
                    Outcome::Complete => break,
                    Outcome::BreakpointReached => self.stepping = true,
                }
            }
        }
        self.stepping = false;
        Ok(())
    }
}
