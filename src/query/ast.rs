//! Filter expression AST and field schemas
//!
//! Defines the operators of the filter language, the parsed expression tree,
//! and the per-entity-kind schemas that decide which field accepts which
//! operator.
//!
//! # Example Expressions
//!
//! ```text
//! running & label.env=prod
//! !running | exited>2w
//! (name~web | image~nginx) & created>"1d 12h"
//! ```

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Existence or boolean truth (bare field)
    Is,
    /// Equal to
    Eq,
    /// Not equal to
    Neq,
    /// Case-insensitive substring
    Like,
    /// Negated case-insensitive substring
    NotLike,
    /// Greater than
    Gt,
    /// Greater than or equal to
    Gte,
    /// Less than
    Lt,
    /// Less than or equal to
    Lte,
}

impl Operator {
    /// Parse from its lexical form
    pub fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "=" => Some(Self::Eq),
            "!=" => Some(Self::Neq),
            "~" => Some(Self::Like),
            "!~" => Some(Self::NotLike),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Gte),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Lte),
            _ => None,
        }
    }

    /// Lexical form, empty for the implicit existence test
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Is => "",
            Self::Eq => "=",
            Self::Neq => "!=",
            Self::Like => "~",
            Self::NotLike => "!~",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Is => write!(f, "is"),
            other => write!(f, "{}", other.symbol()),
        }
    }
}

/// A field as resolved against a schema
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    /// Plain field such as `running`
    Named(String),
    /// Member of a wildcard family such as `label.env`
    Wildcard { prefix: String, key: String },
}

impl Field {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn wildcard(prefix: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Wildcard {
            prefix: prefix.into(),
            key: key.into(),
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{}", name),
            Self::Wildcard { prefix, key } => write!(f, "{}.{}", prefix, key),
        }
    }
}

/// A single field comparison leaf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub field: Field,
    pub op: Operator,
    /// Raw literal text, interpreted by the comparator at evaluation time
    pub pattern: String,
}

/// A parsed filter expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Comparison(Comparison),
}

impl Expr {
    pub fn and(lhs: Expr, rhs: Expr) -> Self {
        Self::And(Box::new(lhs), Box::new(rhs))
    }

    pub fn or(lhs: Expr, rhs: Expr) -> Self {
        Self::Or(Box::new(lhs), Box::new(rhs))
    }

    pub fn not(inner: Expr) -> Self {
        Self::Not(Box::new(inner))
    }

    pub fn compare(field: Field, op: Operator, pattern: impl Into<String>) -> Self {
        Self::Comparison(Comparison {
            field,
            op,
            pattern: pattern.into(),
        })
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::And(l, r) => write!(f, "({} & {})", l, r),
            Self::Or(l, r) => write!(f, "({} | {})", l, r),
            Self::Not(inner) => write!(f, "!{}", inner),
            Self::Comparison(c) if c.op == Operator::Is => write!(f, "{}", c.field),
            Self::Comparison(c) => write!(f, "{}{}{:?}", c.field, c.op.symbol(), c.pattern),
        }
    }
}

/// How a schema entry matches field names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSpec {
    /// Exactly this name
    Exact(String),
    /// `<prefix>.<anything>`
    Wildcard(String),
}

impl FieldSpec {
    fn resolve(&self, name: &str) -> Option<Field> {
        match self {
            Self::Exact(exact) if exact == name => Some(Field::named(name)),
            Self::Wildcard(prefix) => name
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix('.'))
                .filter(|key| !key.is_empty())
                .map(|key| Field::wildcard(prefix.as_str(), key)),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(name) => write!(f, "{}", name),
            Self::Wildcard(prefix) => write!(f, "{}.*", prefix),
        }
    }
}

/// A schema entry: a field and the operators it accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub spec: FieldSpec,
    pub operators: Vec<Operator>,
}

impl FieldRule {
    pub fn allows(&self, op: Operator) -> bool {
        self.operators.contains(&op)
    }
}

/// The legal field/operator combinations for one entity kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    name: String,
    rules: Vec<FieldRule>,
}

impl FieldSchema {
    /// Start building a schema
    pub fn builder(name: impl Into<String>) -> FieldSchemaBuilder {
        FieldSchemaBuilder {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    /// Entity kind this schema describes
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Resolve a concrete field name, exact entries first, then wildcards
    pub fn resolve(&self, name: &str) -> Option<(Field, &FieldRule)> {
        let exact = self
            .rules
            .iter()
            .filter(|rule| matches!(rule.spec, FieldSpec::Exact(_)));
        let wildcards = self
            .rules
            .iter()
            .filter(|rule| matches!(rule.spec, FieldSpec::Wildcard(_)));

        exact
            .chain(wildcards)
            .find_map(|rule| rule.spec.resolve(name).map(|field| (field, rule)))
    }
}

/// Builder for constructing schemas
#[derive(Debug, Clone)]
pub struct FieldSchemaBuilder {
    name: String,
    rules: Vec<FieldRule>,
}

impl FieldSchemaBuilder {
    /// Add a plain field
    pub fn field(mut self, name: impl Into<String>, operators: &[Operator]) -> Self {
        self.rules.push(FieldRule {
            spec: FieldSpec::Exact(name.into()),
            operators: operators.to_vec(),
        });
        self
    }

    /// Add several plain fields sharing the same operators
    pub fn fields(self, names: &[&str], operators: &[Operator]) -> Self {
        names
            .iter()
            .fold(self, |builder, name| builder.field(*name, operators))
    }

    /// Add a wildcard family addressed as `<prefix>.<key>`
    pub fn wildcard(mut self, prefix: impl Into<String>, operators: &[Operator]) -> Self {
        self.rules.push(FieldRule {
            spec: FieldSpec::Wildcard(prefix.into()),
            operators: operators.to_vec(),
        });
        self
    }

    pub fn build(self) -> FieldSchema {
        FieldSchema {
            name: self.name,
            rules: self.rules,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FieldSchema {
        FieldSchema::builder("test")
            .field("running", &[Operator::Is])
            .wildcard("label", &[Operator::Is, Operator::Eq])
            .field("label.special", &[Operator::Like])
            .build()
    }

    #[test]
    fn test_operator_symbols() {
        for op in [
            Operator::Eq,
            Operator::Neq,
            Operator::Like,
            Operator::NotLike,
            Operator::Gt,
            Operator::Gte,
            Operator::Lt,
            Operator::Lte,
        ] {
            assert_eq!(Operator::from_symbol(op.symbol()), Some(op));
        }
        assert_eq!(Operator::from_symbol(""), None);
        assert_eq!(Operator::Is.to_string(), "is");
    }

    #[test]
    fn test_resolve_exact() {
        let schema = schema();
        let (field, rule) = schema.resolve("running").unwrap();
        assert_eq!(field, Field::named("running"));
        assert!(rule.allows(Operator::Is));
        assert!(!rule.allows(Operator::Gt));
    }

    #[test]
    fn test_resolve_wildcard() {
        let schema = schema();
        let (field, _) = schema.resolve("label.env").unwrap();
        assert_eq!(field, Field::wildcard("label", "env"));
        assert_eq!(field.to_string(), "label.env");

        let (field, _) = schema.resolve("label.com.example.tier").unwrap();
        assert_eq!(field, Field::wildcard("label", "com.example.tier"));
    }

    #[test]
    fn test_exact_wins_over_wildcard() {
        let schema = schema();
        let (field, rule) = schema.resolve("label.special").unwrap();
        assert_eq!(field, Field::named("label.special"));
        assert_eq!(rule.operators, vec![Operator::Like]);
    }

    #[test]
    fn test_resolve_unknown() {
        let schema = schema();
        assert!(schema.resolve("paused").is_none());
        assert!(schema.resolve("label").is_none());
        assert!(schema.resolve("label.").is_none());
        assert!(schema.resolve("labels.env").is_none());
    }

    #[test]
    fn test_expr_display() {
        let expr = Expr::and(
            Expr::compare(Field::named("running"), Operator::Is, ""),
            Expr::not(Expr::compare(
                Field::wildcard("label", "env"),
                Operator::Eq,
                "prod",
            )),
        );
        assert_eq!(expr.to_string(), "(running & !label.env=\"prod\")");
    }
}
