//! Bateau Query Engine
//!
//! Provides a compact boolean filter language for runtime entities:
//!
//! - **AST**: Operators, expression tree and per-entity field schemas
//! - **Parser**: Parse filter strings into a validated AST
//! - **Units**: Duration and size literals used inside comparisons
//! - **Compare**: Typed comparators applied at evaluation time
//! - **Evaluator**: Match an AST against any [`Queryable`] entity
//!
//! # Query Language
//!
//! ```text
//! running & label.env=prod
//! !running & exited>2w
//! (image~redis | name~cache) & created>'1d 12h'
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use bateau::query::Matcher;
//! use bateau::entity::CONTAINER_FIELDS;
//!
//! let matcher = Matcher::parse("running & label.env=prod", &CONTAINER_FIELDS)?;
//! if matcher.matches(&mut container)? {
//!     println!("{}", container.id());
//! }
//! ```

mod ast;
mod clock;
mod compare;
mod error;
mod evaluator;
mod parser;
mod units;

pub use ast::{
    Comparison, Expr, Field, FieldRule, FieldSchema, FieldSchemaBuilder, FieldSpec, Operator,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use compare::{compare_any, compare_elapsed, compare_int, compare_size, compare_str, like};
pub use error::{
    ComparisonError, LiteralErrorKind, LiteralParseError, ParseError, ParseErrorKind, QueryError,
    QueryResult, ValueKind,
};
pub use evaluator::{Matcher, Queryable};
pub use parser::parse_expression;
pub use units::{parse_duration, parse_size};
