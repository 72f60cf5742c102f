//! Filter Expression Parser
//!
//! Parses filter strings into an [`Expr`] tree, validating every comparison
//! against a [`FieldSchema`] as it goes.
//!
//! # Grammar
//!
//! ```text
//! Or         := And ('|' And)*
//! And        := Not ('&' Not)*
//! Not        := '!' Not | Atom
//! Atom       := '(' Or ')' | Comparison
//! Comparison := Field [Operator Pattern]
//! Operator   := '=' | '!=' | '~' | '!~' | '>' | '>=' | '<' | '<='
//! Pattern    := 'quoted' | "quoted" | bare-token
//! ```
//!
//! A bare field is an existence test: `running` means `running IS ""`.

use std::cell::Cell;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, multispace0},
    combinator::{cut, opt, recognize, value},
    error::{context, ContextError, ErrorKind, ParseError as NomParseError},
    sequence::{delimited, pair, preceded},
    IResult,
};

use crate::query::ast::{Expr, FieldRule, FieldSchema, Operator};
use crate::query::error::{ParseError, ParseErrorKind};

/// Parse a filter expression against the schema of one entity kind
pub fn parse_expression(input: &str, schema: &FieldSchema) -> Result<Expr, ParseError> {
    let parser = ExprParser {
        schema,
        depth: Cell::new(0),
    };

    match parser.or_expr(input) {
        Ok((remaining, expr)) => {
            let remaining = remaining.trim_start();
            match remaining.chars().next() {
                None => Ok(expr),
                Some(c) => Err(ParseError::new(
                    ParseErrorKind::Syntax(format!("unexpected '{}'", c)),
                    input.len() - remaining.len(),
                    input,
                )),
            }
        }
        Err(nom::Err::Error(failure)) | Err(nom::Err::Failure(failure)) => {
            Err(failure.into_parse_error(input))
        }
        Err(nom::Err::Incomplete(_)) => Err(ParseError::new(
            ParseErrorKind::Syntax("incomplete expression".to_string()),
            input.len(),
            input,
        )),
    }
}

/// Parse failure carrying the remaining input where it happened
#[derive(Debug)]
struct Failure<'a> {
    input: &'a str,
    reason: Reason,
}

#[derive(Debug)]
enum Reason {
    Nom(ErrorKind),
    Expected(&'static str),
    Schema(ParseErrorKind),
}

impl<'a> Failure<'a> {
    fn fatal(input: &'a str, kind: ParseErrorKind) -> nom::Err<Self> {
        nom::Err::Failure(Self {
            input,
            reason: Reason::Schema(kind),
        })
    }

    fn into_parse_error(self, source: &str) -> ParseError {
        let kind = match self.reason {
            Reason::Schema(kind) => kind,
            Reason::Expected(what) => ParseErrorKind::Syntax(what.to_string()),
            Reason::Nom(kind) => ParseErrorKind::Syntax(format!("unexpected input ({:?})", kind)),
        };
        ParseError::new(kind, source.len() - self.input.len(), source)
    }
}

impl<'a> NomParseError<&'a str> for Failure<'a> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        Self {
            input,
            reason: Reason::Nom(kind),
        }
    }

    fn append(_: &'a str, _: ErrorKind, other: Self) -> Self {
        other
    }
}

impl<'a> ContextError<&'a str> for Failure<'a> {
    fn add_context(_: &'a str, ctx: &'static str, mut other: Self) -> Self {
        // Innermost context wins
        if let Reason::Nom(_) = other.reason {
            other.reason = Reason::Expected(ctx);
        }
        other
    }
}

type PResult<'a, T> = IResult<&'a str, T, Failure<'a>>;

type Operand<'a, 's> = fn(&ExprParser<'s>, &'a str) -> PResult<'a, Expr>;

/// Deepest the expression tree may get, counting negations, groups and
/// chained `&`/`|` links
const MAX_DEPTH: usize = 256;

/// Recursive descent over the grammar, holding the schema used for validation
struct ExprParser<'s> {
    schema: &'s FieldSchema,
    depth: Cell<usize>,
}

impl<'s> ExprParser<'s> {
    fn or_expr<'a>(&self, input: &'a str) -> PResult<'a, Expr> {
        self.chain(input, '|', Self::and_expr, Expr::or)
    }

    fn and_expr<'a>(&self, input: &'a str) -> PResult<'a, Expr> {
        self.chain(input, '&', Self::not_expr, Expr::and)
    }

    /// Left-associative `operand (symbol operand)*`
    fn chain<'a>(
        &self,
        input: &'a str,
        symbol: char,
        operand: Operand<'a, 's>,
        combine: fn(Expr, Expr) -> Expr,
    ) -> PResult<'a, Expr> {
        self.scoped(|| -> PResult<'a, Expr> {
            let (mut input, mut lhs) = operand(self, input)?;

            loop {
                match ws(char::<&str, Failure>(symbol))(input) {
                    Ok((rest, _)) => {
                        // each link pushes the left operand one level down
                        self.descend(rest)?;
                        let (rest, rhs) = cut(|i| operand(self, i))(rest)?;
                        lhs = combine(lhs, rhs);
                        input = rest;
                    }
                    Err(nom::Err::Error(_)) => return Ok((input, lhs)),
                    Err(e) => return Err(e),
                }
            }
        })
    }

    fn not_expr<'a>(&self, input: &'a str) -> PResult<'a, Expr> {
        match ws(char::<&str, Failure>('!'))(input) {
            Ok((rest, _)) => self.scoped(|| -> PResult<'a, Expr> {
                self.descend(rest)?;
                let (rest, inner) = cut(|i| self.not_expr(i))(rest)?;
                Ok((rest, Expr::not(inner)))
            }),
            Err(nom::Err::Error(_)) => self.atom(input),
            Err(e) => Err(e),
        }
    }

    fn atom<'a>(&self, input: &'a str) -> PResult<'a, Expr> {
        alt((
            delimited(
                ws(char('(')),
                cut(|i| {
                    self.scoped(|| -> PResult<'a, Expr> {
                        self.descend(i)?;
                        self.or_expr(i)
                    })
                }),
                cut(context("expected ')'", ws(char(')')))),
            ),
            |i| self.comparison(i),
        ))(input)
    }

    /// Enter one more nesting level, failing once the tree would get too deep
    fn descend<'a>(&self, at: &'a str) -> Result<(), nom::Err<Failure<'a>>> {
        let depth = self.depth.get() + 1;
        if depth > MAX_DEPTH {
            return Err(Failure::fatal(
                at,
                ParseErrorKind::Syntax("expression nested too deeply".to_string()),
            ));
        }
        self.depth.set(depth);
        Ok(())
    }

    /// Run `parse`, then restore the nesting level it started at
    fn scoped<T>(&self, parse: impl FnOnce() -> T) -> T {
        let depth = self.depth.get();
        let result = parse();
        self.depth.set(depth);
        result
    }

    fn comparison<'a>(&self, input: &'a str) -> PResult<'a, Expr> {
        let (input, _) = multispace0::<&str, Failure>(input)?;
        let field_start = input;
        let (input, name) = context("expected a field name", field_name)(input)?;

        let (field, rule) = self.schema.resolve(name).ok_or_else(|| {
            Failure::fatal(field_start, ParseErrorKind::UnknownField(name.to_string()))
        })?;

        let (input, _) = multispace0::<&str, Failure>(input)?;
        let op_start = input;
        let (input, op) = opt(operator)(input)?;

        let Some(op) = op else {
            check_operator(rule, name, Operator::Is, field_start)?;
            return Ok((input, Expr::compare(field, Operator::Is, "")));
        };

        check_operator(rule, name, op, op_start)?;
        let (input, pattern) = cut(ws(context("expected a value", pattern)))(input)?;

        Ok((input, Expr::compare(field, op, pattern)))
    }
}

fn check_operator<'a>(
    rule: &FieldRule,
    name: &str,
    op: Operator,
    at: &'a str,
) -> Result<(), nom::Err<Failure<'a>>> {
    if rule.allows(op) {
        Ok(())
    } else {
        Err(Failure::fatal(
            at,
            ParseErrorKind::IllegalOperator {
                field: name.to_string(),
                op,
            },
        ))
    }
}

/// Skip leading whitespace before `inner`
fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> PResult<'a, O>
where
    F: FnMut(&'a str) -> PResult<'a, O>,
{
    preceded(multispace0, inner)
}

/// Field name, including dotted wildcard members like `label.com.example`
fn field_name(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '/')),
    ))(input)
}

/// Comparison operator, longest form first
fn operator(input: &str) -> PResult<'_, Operator> {
    alt((
        value(Operator::Neq, tag("!=")),
        value(Operator::NotLike, tag("!~")),
        value(Operator::Gte, tag(">=")),
        value(Operator::Lte, tag("<=")),
        value(Operator::Eq, tag("=")),
        value(Operator::Like, tag("~")),
        value(Operator::Gt, tag(">")),
        value(Operator::Lt, tag("<")),
    ))(input)
}

/// Raw pattern text: quoted, or a bare token ending at whitespace or `()|&`
fn pattern(input: &str) -> PResult<'_, &str> {
    alt((
        delimited(
            char('\''),
            take_while(|c: char| c != '\''),
            cut(context("expected closing quote", char('\''))),
        ),
        delimited(
            char('"'),
            take_while(|c: char| c != '"'),
            cut(context("expected closing quote", char('"'))),
        ),
        take_while1(|c: char| !c.is_whitespace() && !matches!(c, '(' | ')' | '|' | '&')),
    ))(input)
}
