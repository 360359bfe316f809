//! Argument values and their conversion from literal tokens.
//!
//! Every descriptor declares a [`ValueKind`]. Literals taken from the token
//! stream are turned into [`Value`]s by a [`ValueParser`]; the engine never
//! converts anything itself.

use std::fmt::{Display, Formatter};

use crate::descriptor::Descriptor;
use crate::error::ConversionFailure;
use crate::tokenizer::unquote;

/// Value type tag of a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Str,
}

impl ValueKind {
    /// The value a member of this kind falls back to when nothing else applies.
    #[must_use]
    pub fn zero(self) -> Value {
        match self {
            ValueKind::Bool => Value::Bool(false),
            ValueKind::Int => Value::Int(0),
            ValueKind::Float => Value::Float(0.0),
            ValueKind::Str => Value::Str(String::new()),
        }
    }
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "integer",
            ValueKind::Float => "number",
            ValueKind::Str => "string",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<Value>),
}

impl Value {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

pub type ConversionResult = std::result::Result<Value, ConversionFailure>;

/// Converts literal tokens into values for a descriptor.
pub trait ValueParser {
    /// Converts a single literal. Quoted literals arrive still wrapped in quotes.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionFailure`] when the literal is not a valid value of
    /// the descriptor's kind.
    fn parse_scalar(&self, descriptor: &Descriptor, literal: &str) -> ConversionResult;

    /// Converts the residual token list of a variadic descriptor.
    ///
    /// # Errors
    ///
    /// Returns the first element that failed to convert.
    fn parse_array(&self, descriptor: &Descriptor, literals: &[String]) -> ConversionResult {
        let mut items = Vec::with_capacity(literals.len());
        for literal in literals {
            items.push(self.parse_scalar(descriptor, literal)?);
        }
        Ok(Value::Array(items))
    }
}

/// Parser for the four built-in kinds.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultValueParser;

impl ValueParser for DefaultValueParser {
    fn parse_scalar(&self, descriptor: &Descriptor, literal: &str) -> ConversionResult {
        let text = unquote(literal);
        let failure = |reason: String| ConversionFailure {
            name: descriptor.display_name(),
            literal: literal.to_string(),
            reason,
        };

        match descriptor.kind() {
            ValueKind::Str => Ok(Value::Str(text)),
            ValueKind::Bool => match text.to_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
                _ => Err(failure("expected true or false".to_string())),
            },
            ValueKind::Int => text
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| failure(e.to_string())),
            ValueKind::Float => text
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| failure(e.to_string())),
        }
    }
}
