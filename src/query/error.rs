//! Query error types
//!
//! Defines all error conditions that can occur while compiling a filter
//! expression, interpreting the literals embedded in it, and evaluating it
//! against an entity.

use crate::query::ast::Operator;
use thiserror::Error;

/// Why a filter expression was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The field is not part of the schema for this entity kind
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// The field exists but does not accept this operator
    #[error("operator '{op}' is not allowed on field '{field}'")]
    IllegalOperator { field: String, op: Operator },

    /// Malformed expression
    #[error("{0}")]
    Syntax(String),
}

/// A filter expression that failed to compile
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at position {position}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Byte offset of the offending token
    pub position: usize,
    /// The full expression
    pub input: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, position: usize, input: &str) -> Self {
        Self {
            kind,
            position: position.min(input.len()),
            input: input.to_string(),
        }
    }

    /// Render the input with a caret under the offending character
    pub fn caret(&self) -> String {
        render_caret(&self.input, self.position)
    }
}

/// Why a duration or size literal was rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralErrorKind {
    #[error("no value")]
    NoValue,

    #[error("was expecting a numeric value")]
    MissingNumber,

    #[error("was expecting a unit")]
    MissingUnit,

    #[error("value is too large")]
    TooLarge,
}

/// A duration or size literal that could not be interpreted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid literal '{input}': {kind} at position {position}")]
pub struct LiteralParseError {
    pub kind: LiteralErrorKind,
    pub position: usize,
    pub input: String,
}

impl LiteralParseError {
    pub fn new(kind: LiteralErrorKind, position: usize, input: &str) -> Self {
        Self {
            kind,
            position: position.min(input.len()),
            input: input.to_string(),
        }
    }

    pub fn caret(&self) -> String {
        render_caret(&self.input, self.position)
    }
}

/// Kind of live value a comparator works on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Integer,
    Duration,
    Size,
    Collection,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Integer => write!(f, "integer"),
            Self::Duration => write!(f, "duration"),
            Self::Size => write!(f, "size"),
            Self::Collection => write!(f, "string list"),
        }
    }
}

/// A comparator could not be applied
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComparisonError {
    /// The schema let through an operator the comparator does not implement
    #[error("unsupported operator '{op}' for {kind} values")]
    UnsupportedOperator { kind: ValueKind, op: Operator },

    /// A numeric pattern was required
    #[error("'{0}' is not a numeric value")]
    InvalidPattern(String),
}

/// Errors that can occur during query operations
#[derive(Error, Debug)]
pub enum QueryError {
    /// Expression compilation failed
    #[error("Invalid query: {0}")]
    Parse(#[from] ParseError),

    /// A literal inside a comparison could not be interpreted
    #[error("Invalid literal: {0}")]
    Literal(#[from] LiteralParseError),

    /// Comparator mismatch or bad numeric pattern
    #[error("Comparison error: {0}")]
    Comparison(#[from] ComparisonError),

    /// An entity adapter was asked about a field it does not know
    #[error("Invalid field {0}")]
    InvalidField(String),

    /// The entity detail could not be retrieved
    #[error("Source error: {0}")]
    Source(#[from] crate::entity::SourceError),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

fn render_caret(input: &str, position: usize) -> String {
    let column = input
        .get(..position)
        .map(|prefix| prefix.chars().count())
        .unwrap_or(position);
    format!("{}\n{}^", input, " ".repeat(column))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new(
            ParseErrorKind::UnknownField("nope".to_string()),
            4,
            "foo&nope",
        );
        assert_eq!(err.to_string(), "unknown field 'nope' at position 4");
        assert_eq!(err.caret(), "foo&nope\n    ^");
    }

    #[test]
    fn test_illegal_operator_display() {
        let kind = ParseErrorKind::IllegalOperator {
            field: "running".to_string(),
            op: Operator::Gt,
        };
        assert_eq!(
            kind.to_string(),
            "operator '>' is not allowed on field 'running'"
        );
    }

    #[test]
    fn test_position_is_clamped() {
        let err = LiteralParseError::new(LiteralErrorKind::NoValue, 10, "ab");
        assert_eq!(err.position, 2);
        assert_eq!(err.caret(), "ab\n  ^");
    }

    #[test]
    fn test_caret_counts_chars() {
        let err = ParseError::new(ParseErrorKind::Syntax("x".into()), 3, "é&x");
        assert_eq!(err.caret(), "é&x\n  ^");
    }

    #[test]
    fn test_conversions() {
        let err: QueryError =
            ComparisonError::InvalidPattern("abc".to_string()).into();
        assert!(matches!(err, QueryError::Comparison(_)));

        let err: QueryError =
            LiteralParseError::new(LiteralErrorKind::MissingUnit, 1, "1").into();
        assert!(matches!(err, QueryError::Literal(_)));
    }
}
