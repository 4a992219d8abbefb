//! Terminal rendering of interpreter state
//!
//! Used by step mode and by the CLI error boundary: the source text with
//! the current cell highlighted, a caret under it, and the position.

use crate::environment::{Environment, StackDump};
use crate::position::Position;
use crate::source::SourceBuffer;

const HIGHLIGHT: &str = "\x1b[93;41m";
const CARET: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// Source listing up to and including the current row, cell highlighted
pub fn render_source<S: SourceBuffer>(source: &S) -> String {
    let position = source.position();
    let mut out = String::new();
    for row in 0..source.row_count() {
        let Some(line) = source.line(row) else { break };
        let text: String = line.iter().collect();
        let text = text.trim_end_matches(['\r', '\n']);
        if row as i64 != position.row {
            out.push_str(text);
            out.push('\n');
            continue;
        }
        out.push_str(&mark_line(text, position));
        break;
    }
    out.push_str(&format!("Source position: {}", position));
    out
}

fn mark_line(text: &str, position: &Position) -> String {
    let chars: Vec<char> = text.chars().collect();
    let col = position.col.max(0) as usize;
    let mut out = String::new();
    if col < chars.len() {
        out.extend(&chars[..col]);
        out.push_str(HIGHLIGHT);
        out.push(chars[col]);
        out.push_str(RESET);
        out.extend(&chars[col + 1..]);
    } else {
        out.push_str(text);
    }
    out.push('\n');
    out.push_str(CARET);
    out.push_str(&" ".repeat(col));
    out.push('^');
    out.push_str(RESET);
    out.push('\n');
    out
}

/// What step mode shows after each step
pub fn render_step<S: SourceBuffer, E: Environment>(
    source: &S,
    environment: &E,
    stack: Option<StackDump>,
) -> String {
    let mut out = render_source(source);
    if let Some(depth) = stack {
        out.push('\n');
        out.push_str(&environment.dump(depth));
    }
    out
}

/// Strip ANSI colour sequences, e.g. for transcripts
pub fn strip_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}
