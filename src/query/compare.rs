//! Typed comparators
//!
//! Each comparator combines a live attribute value, the operator from the
//! expression, and the raw pattern text. Patterns are interpreted here, not in
//! the parser, so literal errors surface only when a comparison actually runs.

use chrono::{DateTime, Utc};

use crate::query::ast::Operator;
use crate::query::clock::Clock;
use crate::query::error::{ComparisonError, QueryError, QueryResult, ValueKind};
use crate::query::units::{parse_duration, parse_size};

/// Case-insensitive substring test
pub fn like(value: &str, pattern: &str) -> bool {
    value.to_lowercase().contains(&pattern.to_lowercase())
}

/// Compare a string attribute
pub fn compare_str(value: &str, op: Operator, pattern: &str) -> QueryResult<bool> {
    match op {
        Operator::Eq => Ok(value == pattern),
        Operator::Neq => Ok(value != pattern),
        Operator::Like => Ok(like(value, pattern)),
        Operator::NotLike => Ok(!like(value, pattern)),
        op => Err(unsupported(ValueKind::String, op)),
    }
}

/// Compare an integer attribute against a base-10 pattern
pub fn compare_int(value: i64, op: Operator, pattern: &str) -> QueryResult<bool> {
    let against: i64 = pattern
        .trim()
        .parse()
        .map_err(|_| ComparisonError::InvalidPattern(pattern.to_string()))?;

    match op {
        Operator::Eq => Ok(value == against),
        Operator::Gt => Ok(value > against),
        op => Err(unsupported(ValueKind::Integer, op)),
    }
}

/// Compare the time elapsed since `value` against a duration pattern
///
/// An unset timestamp never matches. The pattern is interpreted first so an
/// invalid literal is reported even then.
pub fn compare_elapsed(
    value: Option<DateTime<Utc>>,
    op: Operator,
    pattern: &str,
    clock: &dyn Clock,
) -> QueryResult<bool> {
    let duration = parse_duration(pattern)?;
    if !matches!(op, Operator::Eq | Operator::Gt) {
        return Err(unsupported(ValueKind::Duration, op));
    }

    let Some(timestamp) = value else {
        return Ok(false);
    };

    let elapsed = clock.now().signed_duration_since(timestamp);
    Ok(match op {
        Operator::Gt => elapsed > duration,
        _ => elapsed == duration,
    })
}

/// Compare a byte count against a size pattern
pub fn compare_size(value: i64, op: Operator, pattern: &str) -> QueryResult<bool> {
    let against = parse_size(pattern)?;

    match op {
        Operator::Eq => Ok(value == against),
        Operator::Gt => Ok(value > against),
        op => Err(unsupported(ValueKind::Size, op)),
    }
}

/// True if any element matches
pub fn compare_any<S: AsRef<str>>(values: &[S], op: Operator, pattern: &str) -> QueryResult<bool> {
    let test: fn(&str, &str) -> bool = match op {
        Operator::Eq => |value, pattern| value == pattern,
        Operator::Like => like,
        op => return Err(unsupported(ValueKind::Collection, op)),
    };

    Ok(values.iter().any(|value| test(value.as_ref(), pattern)))
}

fn unsupported(kind: ValueKind, op: Operator) -> QueryError {
    ComparisonError::UnsupportedOperator { kind, op }.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::clock::FixedClock;
    use crate::query::error::LiteralErrorKind;
    use chrono::{Duration, TimeZone};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).unwrap()
    }

    #[test]
    fn test_like() {
        assert!(like("tEsT", "eSt"));
        assert!(like("test", ""));
        assert!(!like("test", "niet"));
    }

    #[test]
    fn test_compare_str() {
        assert!(compare_str("web", Operator::Eq, "web").unwrap());
        assert!(!compare_str("web", Operator::Eq, "WEB").unwrap());
        assert!(compare_str("web", Operator::Neq, "db").unwrap());
        assert!(compare_str("my-Web-1", Operator::Like, "web").unwrap());
        assert!(compare_str("db", Operator::NotLike, "web").unwrap());
        assert!(!compare_str("WEB", Operator::NotLike, "web").unwrap());
    }

    #[test]
    fn test_compare_str_unsupported() {
        let err = compare_str("a", Operator::Gt, "b").unwrap_err();
        assert!(matches!(
            err,
            QueryError::Comparison(ComparisonError::UnsupportedOperator {
                kind: ValueKind::String,
                op: Operator::Gt
            })
        ));
    }

    #[test]
    fn test_compare_int() {
        assert!(compare_int(137, Operator::Eq, "137").unwrap());
        assert!(compare_int(137, Operator::Gt, "0").unwrap());
        assert!(!compare_int(0, Operator::Gt, "0").unwrap());
        assert!(compare_int(0, Operator::Gt, "-1").unwrap());
    }

    #[test]
    fn test_compare_int_errors() {
        assert!(matches!(
            compare_int(1, Operator::Eq, "one").unwrap_err(),
            QueryError::Comparison(ComparisonError::InvalidPattern(_))
        ));
        assert!(matches!(
            compare_int(1, Operator::Lte, "1").unwrap_err(),
            QueryError::Comparison(ComparisonError::UnsupportedOperator { .. })
        ));
    }

    #[test]
    fn test_compare_elapsed() {
        let clock = FixedClock(base());
        let an_hour_ago = Some(base() - Duration::hours(1));

        assert!(compare_elapsed(an_hour_ago, Operator::Eq, "1h", &clock).unwrap());
        assert!(compare_elapsed(an_hour_ago, Operator::Gt, "1m", &clock).unwrap());
        assert!(!compare_elapsed(an_hour_ago, Operator::Eq, "1h 1m", &clock).unwrap());
        assert!(!compare_elapsed(an_hour_ago, Operator::Gt, "1h", &clock).unwrap());
        assert!(compare_elapsed(an_hour_ago, Operator::Eq, "59m 60s", &clock).unwrap());
    }

    #[test]
    fn test_compare_elapsed_unset_never_matches() {
        let clock = FixedClock(base());
        assert!(!compare_elapsed(None, Operator::Gt, "1ms", &clock).unwrap());
        assert!(!compare_elapsed(None, Operator::Eq, "1h", &clock).unwrap());
    }

    #[test]
    fn test_compare_elapsed_bad_literal() {
        let clock = FixedClock(base());
        let err = compare_elapsed(None, Operator::Gt, "soon", &clock).unwrap_err();
        match err {
            QueryError::Literal(e) => assert_eq!(e.kind, LiteralErrorKind::MissingNumber),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_compare_size() {
        assert!(compare_size(2048, Operator::Eq, "2KB").unwrap());
        assert!(compare_size(2048, Operator::Gt, "2kb").unwrap());
        assert!(!compare_size(2000, Operator::Gt, "2kb").unwrap());
        assert!(compare_size(2000, Operator::Eq, "1kb 1000").unwrap());
        assert!(matches!(
            compare_size(1, Operator::Lt, "1").unwrap_err(),
            QueryError::Comparison(ComparisonError::UnsupportedOperator { .. })
        ));
    }

    #[test]
    fn test_compare_any() {
        let cmd = vec!["nginx".to_string(), "-g".to_string(), "daemon off;".to_string()];
        assert!(compare_any(&cmd, Operator::Eq, "-g").unwrap());
        assert!(!compare_any(&cmd, Operator::Eq, "daemon").unwrap());
        assert!(compare_any(&cmd, Operator::Like, "DAEMON").unwrap());
        assert!(!compare_any::<String>(&[], Operator::Like, "x").unwrap());
    }

    #[test]
    fn test_compare_any_unsupported_even_when_empty() {
        assert!(compare_any::<String>(&[], Operator::Neq, "x").is_err());
    }
}
