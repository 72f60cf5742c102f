//! Expression Evaluator
//!
//! Walks a parsed [`Expr`] against one entity. Entities take part through the
//! [`Queryable`] trait, which answers a single field comparison and is free to
//! fetch and cache whatever detail it needs on first use.

use crate::query::ast::{Expr, Field, FieldSchema, Operator};
use crate::query::error::{ParseError, QueryResult};
use crate::query::parser::parse_expression;

/// An entity that can answer field comparisons
pub trait Queryable {
    /// Test one `field op pattern` comparison. The field/operator pair has
    /// already been validated against the entity's schema.
    fn is(&mut self, field: &Field, op: Operator, pattern: &str) -> QueryResult<bool>;
}

impl Expr {
    /// Evaluate against an entity, short-circuiting `&` and `|`
    pub fn evaluate<Q: Queryable + ?Sized>(&self, entity: &mut Q) -> QueryResult<bool> {
        match self {
            Expr::And(lhs, rhs) => Ok(lhs.evaluate(entity)? && rhs.evaluate(entity)?),
            Expr::Or(lhs, rhs) => Ok(lhs.evaluate(entity)? || rhs.evaluate(entity)?),
            Expr::Not(inner) => Ok(!inner.evaluate(entity)?),
            Expr::Comparison(c) => entity.is(&c.field, c.op, &c.pattern),
        }
    }
}

/// A compiled filter, reusable across every entity of one kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matcher {
    source: String,
    expr: Expr,
}

impl Matcher {
    /// Compile a filter expression for the given schema
    pub fn parse(input: &str, schema: &FieldSchema) -> Result<Self, ParseError> {
        let expr = parse_expression(input, schema)?;
        tracing::debug!(schema = schema.name(), filter = %expr, "Compiled filter");

        Ok(Self {
            source: input.to_string(),
            expr,
        })
    }

    /// The expression as typed
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn matches<Q: Queryable + ?Sized>(&self, entity: &mut Q) -> QueryResult<bool> {
        self.expr.evaluate(entity)
    }
}

impl std::fmt::Display for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.expr)
    }
}
