//! esorun - a generic engine for small esoteric languages
//!
//! # Overview
//!
//! A language is described as an ordered chain of recognizers over a
//! source buffer and an execution environment. The engine supplies the
//! pieces every such language needs:
//!
//! - Source buffers: row-major text ([`LinearBuffer`]) or a wrapping 2-D
//!   grid with a direction of travel ([`TorusBuffer`]), both able to seek
//!   balanced delimiters where the layout allows it.
//! - Environments: a value [`Stack`] and a pointer-addressed [`Tape`].
//! - A dispatch loop ([`Interpreter`]) that picks the first applicable
//!   recognizer, applies the command it gathers, and stops on completion
//!   or at a breakpoint.
//! - A step controller ([`debugger::StepController`]) for interactive
//!   single stepping.
//!
//! # Example
//!
//! ```rust
//! use esorun::languages::{Befunge93, Language};
//! use esorun::{EngineConfig, Environment, Outcome, Value};
//!
//! let mut interp = Befunge93::interpreter(&EngineConfig::default());
//! interp.load_str("91+@");
//! assert_eq!(interp.execute().unwrap(), Outcome::Complete);
//! let top = interp.state().environment().stack().peek();
//! assert_eq!(top, Some(&Value::Number(10)));
//! ```

pub mod debugger;
pub mod display;
pub mod engine;
pub mod environment;
pub mod io;
pub mod languages;
pub mod position;
pub mod signals;
pub mod source;
pub mod value;

// Re-export commonly used items
pub use engine::{
    Breakpoint, Command, EngineConfig, EngineError, Interpreter, InterpreterState, Outcome,
    Recognizer, RecognizerChain, Statistics,
};
pub use environment::{Environment, Stack, StackDump, Tape, TapeConfig};
pub use io::{ConsoleIo, IoPort, MemoryIo};
pub use position::Position;
pub use source::{Direction, LinearBuffer, SeekDirection, SourceBuffer, TorusBuffer};
pub use value::{FromValue, Sentinels, Value};
