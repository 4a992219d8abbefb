//! Character and line I/O supplied by the host
//!
//! Commands never touch stdin/stdout directly; they go through the
//! [`IoPort`] held by the interpreter state so that programs can be run
//! against scripted input in tests or embedded hosts.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, Read, Write};
use std::rc::Rc;

pub trait IoPort {
    /// Next input character, `None` at end of input
    fn read_char(&mut self) -> io::Result<Option<char>>;

    /// Next input line without its terminator, or `default` when nothing was entered
    fn read_line(&mut self, default: &str) -> io::Result<String>;

    fn write_str(&mut self, s: &str) -> io::Result<()>;

    fn write_char(&mut self, c: char) -> io::Result<()> {
        let mut buf = [0u8; 4];
        self.write_str(c.encode_utf8(&mut buf))
    }
}

/// Process stdin/stdout
#[derive(Debug, Default)]
pub struct ConsoleIo;

impl IoPort for ConsoleIo {
    fn read_char(&mut self) -> io::Result<Option<char>> {
        io::stdout().flush()?;
        read_utf8_char(&mut io::stdin().lock())
    }

    fn read_line(&mut self, default: &str) -> io::Result<String> {
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(default.to_string());
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(trimmed.to_string())
        }
    }

    fn write_str(&mut self, s: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(s.as_bytes())?;
        out.flush()
    }
}

/// Decode one UTF-8 scalar from `reader`, `None` at end of input
fn read_utf8_char(reader: &mut impl Read) -> io::Result<Option<char>> {
    let mut buf = [0u8; 4];
    if reader.read(&mut buf[..1])? == 0 {
        return Ok(None);
    }
    let len = match buf[0] {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        b => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid UTF-8 lead byte 0x{:02x}", b),
            ))
        }
    };
    reader.read_exact(&mut buf[1..len])?;
    let decoded = std::str::from_utf8(&buf[..len])
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(decoded.chars().next())
}

/// In-memory port with scripted input and a shared output buffer
#[derive(Debug, Clone, Default)]
pub struct MemoryIo {
    input: VecDeque<char>,
    output: Rc<RefCell<String>>,
}

impl MemoryIo {
    pub fn new(input: &str) -> Self {
        MemoryIo {
            input: input.chars().collect(),
            output: Rc::default(),
        }
    }

    /// Handle that keeps seeing output after the port is moved into a state
    pub fn output_handle(&self) -> Rc<RefCell<String>> {
        Rc::clone(&self.output)
    }

    pub fn output(&self) -> String {
        self.output.borrow().clone()
    }
}

impl IoPort for MemoryIo {
    fn read_char(&mut self) -> io::Result<Option<char>> {
        Ok(self.input.pop_front())
    }

    fn read_line(&mut self, default: &str) -> io::Result<String> {
        let mut line = String::new();
        while let Some(c) = self.input.pop_front() {
            if c == '\n' {
                break;
            }
            line.push(c);
        }
        if line.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(line)
        }
    }

    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.output.borrow_mut().push_str(s);
        Ok(())
    }
}
