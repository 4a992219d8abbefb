//! Common test utilities for esorun integration tests

#![allow(dead_code, unused_imports)]

pub use esorun::languages::{Befunge93, Brainfuck, False, Language};
pub use esorun::{
    EngineConfig, EngineError, Environment, Interpreter, MemoryIo, Outcome, SourceBuffer, Value,
};

use std::io::Write;
use std::path::PathBuf;

/// Interpreter for `L` loaded with `program`, reading `input`
pub fn interpreter<L: Language>(
    program: &str,
    input: &str,
) -> (Interpreter<L::Source, L::Env>, MemoryIo) {
    let io = MemoryIo::new(input);
    let mut interp = L::interpreter(&EngineConfig::default());
    interp.state_mut().io = Box::new(io.clone());
    interp.load_str(program);
    (interp, io)
}

/// Run `program` to completion and return what it printed
pub fn run<L: Language>(program: &str, input: &str) -> Result<String, EngineError> {
    let (mut interp, io) = interpreter::<L>(program, input);
    interp.execute()?;
    Ok(io.output())
}

/// Write `contents` to `name` inside `dir`
pub fn write_source(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

/// Top-first numbers on the innermost stack
pub fn numbers<S: SourceBuffer, E: Environment>(interp: &Interpreter<S, E>) -> Vec<i64> {
    interp
        .state()
        .environment()
        .stack()
        .iter()
        .filter_map(Value::as_number)
        .collect()
}
