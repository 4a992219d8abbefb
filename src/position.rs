//! Source coordinates
//!
//! A `Position` is a mutable (column, row) pair. Validity depends on the
//! buffer it addresses: a linear buffer treats it as a row-major cursor,
//! a torus keeps it inside `width × height` by wrapping.

use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub col: i64,
    pub row: i64,
    /// Caller-defined tag carried along with the coordinate
    pub context: Option<String>,
}

impl Position {
    pub fn new(col: i64, row: i64) -> Self {
        Position { col, row, context: None }
    }

    pub fn with_context(col: i64, row: i64, context: impl Into<String>) -> Self {
        Position {
            col,
            row,
            context: Some(context.into()),
        }
    }

    /// True when both coordinates match, ignoring the context tag
    pub fn is_at(&self, col: i64, row: i64) -> bool {
        self.col == col && self.row == row
    }

    pub(crate) fn offset(&mut self, dcol: i64, drow: i64) {
        self.col += dcol;
        self.row += drow;
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.col, self.row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_mutate_independently() {
        let original = Position::with_context(3, 4, "main");
        let mut copy = original.clone();
        copy.offset(1, -1);
        assert_eq!(original, Position::with_context(3, 4, "main"));
        assert!(copy.is_at(4, 3));
        assert_eq!(copy.context.as_deref(), Some("main"));
    }

    #[test]
    fn displays_as_pair() {
        assert_eq!(Position::new(2, 7).to_string(), "(2,7)");
    }
}
