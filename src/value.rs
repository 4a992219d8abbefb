//! Values that live on an execution environment
//!
//! The set of value kinds is closed. Commands that need a particular kind
//! pop through [`FromValue`], which fails with a type mismatch instead of
//! handing back something the command cannot use.

use crate::engine::EngineError;
use std::fmt;

/// Handle into the lambda side-table of an interpreter state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LambdaRef(pub(crate) usize);

/// A value that can be on the stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Canonical number (signed integer)
    Number(i64),
    /// Canonical boolean: a number restricted to the configured sentinels
    Boolean(i64),
    /// Text, e.g. a gathered string literal
    Str(String),
    /// Name of a variable slot
    Variable(String),
    /// Jump target or other symbolic reference
    Label(String),
    /// Deferred command sequence
    Lambda(LambdaRef),
}

impl Default for Value {
    fn default() -> Self {
        Value::Number(0)
    }
}

impl Value {
    /// Short name of the value kind, used in type errors
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Number(_) => "Number",
            Value::Boolean(_) => "Boolean",
            Value::Str(_) => "String",
            Value::Variable(_) => "Variable",
            Value::Label(_) => "Label",
            Value::Lambda(_) => "Lambda",
        }
    }

    /// Numeric view; booleans are numbers too
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Value::Number(n) | Value::Boolean(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "Number == {}", n),
            Value::Boolean(n) => write!(f, "Boolean == {}", n),
            Value::Str(s) => write!(f, "String \"{}\"", s),
            Value::Variable(name) => write!(f, "Variable - {}", name),
            Value::Label(name) => write!(f, "Label - {}", name),
            Value::Lambda(r) => write!(f, "Lambda #{}", r.0),
        }
    }
}

/// The two numbers that stand for true and false
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentinels {
    pub truth: i64,
    pub falsity: i64,
}

impl Default for Sentinels {
    fn default() -> Self {
        Sentinels {
            truth: -1,
            falsity: 0,
        }
    }
}

impl Sentinels {
    pub fn boolean(&self, b: bool) -> Value {
        Value::Boolean(if b { self.truth } else { self.falsity })
    }

    /// Anything other than the false sentinel is truthy
    pub fn is_true(&self, n: i64) -> bool {
        n != self.falsity
    }
}

/// Typed extraction of a popped value
pub trait FromValue: Sized {
    const EXPECTED: &'static str;

    fn from_value(value: Value) -> Option<Self>;

    fn extract(value: Value) -> Result<Self, EngineError> {
        let got = value.kind();
        Self::from_value(value).ok_or_else(|| EngineError::TypeMismatch {
            expected: Self::EXPECTED.to_string(),
            got: got.to_string(),
        })
    }
}

impl FromValue for i64 {
    const EXPECTED: &'static str = "Number";

    fn from_value(value: Value) -> Option<Self> {
        value.as_number()
    }
}

impl FromValue for String {
    const EXPECTED: &'static str = "String";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl FromValue for LambdaRef {
    const EXPECTED: &'static str = "Lambda";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Lambda(r) => Some(r),
            _ => None,
        }
    }
}

/// Name carried by a `Value::Variable`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable(pub String);

impl FromValue for Variable {
    const EXPECTED: &'static str = "Variable";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Variable(name) => Some(Variable(name)),
            _ => None,
        }
    }
}

/// Name carried by a `Value::Label`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label(pub String);

impl FromValue for Label {
    const EXPECTED: &'static str = "Label";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Label(name) => Some(Label(name)),
            _ => None,
        }
    }
}

impl FromValue for Value {
    const EXPECTED: &'static str = "Value";

    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

/// Arithmetic yields numbers, comparisons yield booleans.
pub mod ops {
    use super::{Sentinels, Value};
    use crate::engine::EngineError;

    pub fn add(lhs: i64, rhs: i64) -> Value {
        Value::Number(lhs.wrapping_add(rhs))
    }

    pub fn subtract(lhs: i64, rhs: i64) -> Value {
        Value::Number(lhs.wrapping_sub(rhs))
    }

    pub fn multiply(lhs: i64, rhs: i64) -> Value {
        Value::Number(lhs.wrapping_mul(rhs))
    }

    /// Truncates toward zero
    pub fn divide(lhs: i64, rhs: i64) -> Result<Value, EngineError> {
        lhs.checked_div(rhs)
            .map(Value::Number)
            .ok_or_else(|| EngineError::Arithmetic(format!("{} / {}", lhs, rhs)))
    }

    /// Remainder takes the sign of the dividend
    pub fn remainder(lhs: i64, rhs: i64) -> Result<Value, EngineError> {
        lhs.checked_rem(rhs)
            .map(Value::Number)
            .ok_or_else(|| EngineError::Arithmetic(format!("{} % {}", lhs, rhs)))
    }

    pub fn negate(n: i64) -> Value {
        Value::Number(n.wrapping_neg())
    }

    pub fn and(lhs: i64, rhs: i64) -> Value {
        Value::Number(lhs & rhs)
    }

    pub fn or(lhs: i64, rhs: i64) -> Value {
        Value::Number(lhs | rhs)
    }

    pub fn equal(s: &Sentinels, lhs: i64, rhs: i64) -> Value {
        s.boolean(lhs == rhs)
    }

    pub fn greater(s: &Sentinels, lhs: i64, rhs: i64) -> Value {
        s.boolean(lhs > rhs)
    }

    pub fn less(s: &Sentinels, lhs: i64, rhs: i64) -> Value {
        s.boolean(lhs < rhs)
    }

    /// Logical not: true exactly when the operand is the false sentinel
    pub fn not(s: &Sentinels, n: i64) -> Value {
        s.boolean(n == s.falsity)
    }
}
