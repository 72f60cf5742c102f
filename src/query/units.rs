//! Duration and size literals
//!
//! Both literal kinds are a sequence of `<digits><unit>` components, optionally
//! separated by whitespace, whose magnitudes are summed:
//!
//! ```text
//! 1y 2M 3w 4d 5h 6m 7s 8ms
//! 1Gb 2MB 3kb 4
//! ```

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{digit1, multispace0},
    combinator::value,
    IResult,
};

use crate::query::error::{LiteralErrorKind, LiteralParseError};

const SECOND: i64 = 1000;
const MINUTE: i64 = 60 * SECOND;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Duration unit in milliseconds, longest match first
fn duration_unit(input: &str) -> IResult<&str, i64> {
    alt((
        value(30 * DAY, tag("months")),
        value(1, tag("ms")),
        value(SECOND, tag("s")),
        value(MINUTE, tag("m")),
        value(HOUR, tag("h")),
        value(DAY, tag("d")),
        value(7 * DAY, tag("w")),
        value(30 * DAY, tag("M")),
        value(365 * DAY, tag("y")),
    ))(input)
}

/// Size unit in bytes. Uppercase `B` is binary, lowercase `b` decimal.
fn size_unit(input: &str) -> IResult<&str, i64> {
    alt((
        value(1024, tag("KB")),
        value(1000, alt((tag("Kb"), tag("kb")))),
        value(1024 * 1024, tag("MB")),
        value(1000 * 1000, tag("Mb")),
        value(1024 * 1024 * 1024, tag("GB")),
        value(1000 * 1000 * 1000, tag("Gb")),
    ))(input)
}

/// Parse a duration literal such as `"1h 30m"`
pub fn parse_duration(input: &str) -> Result<chrono::Duration, LiteralParseError> {
    let millis = MagnitudeParser::DURATION.parse(input)?;
    Ok(chrono::Duration::milliseconds(millis))
}

/// Parse a size literal such as `"1GB 512MB"` into a byte count
pub fn parse_size(input: &str) -> Result<i64, LiteralParseError> {
    MagnitudeParser::SIZE.parse(input)
}

/// Sums `<count><unit>` components using one unit table
struct MagnitudeParser {
    units: fn(&str) -> IResult<&str, i64>,
    /// Magnitude of a trailing number without unit, if allowed
    bare_tail: Option<i64>,
}

impl MagnitudeParser {
    const DURATION: Self = Self {
        units: duration_unit,
        bare_tail: None,
    };

    const SIZE: Self = Self {
        units: size_unit,
        bare_tail: Some(1),
    };

    fn parse(&self, input: &str) -> Result<i64, LiteralParseError> {
        let error = |kind, rest: &str| LiteralParseError::new(kind, input.len() - rest.len(), input);

        let mut rest = skip_ws(input);
        if rest.is_empty() {
            return Err(error(LiteralErrorKind::NoValue, rest));
        }

        let mut total: i64 = 0;
        while !rest.is_empty() {
            let (after_digits, digits) = digit1::<_, nom::error::Error<&str>>(rest)
                .map_err(|_| error(LiteralErrorKind::MissingNumber, rest))?;
            let count: i64 = digits
                .parse()
                .map_err(|_| error(LiteralErrorKind::TooLarge, rest))?;

            let (after_unit, magnitude) = self
                .unit(after_digits)
                .ok_or_else(|| error(LiteralErrorKind::MissingUnit, after_digits))?;

            total = count
                .checked_mul(magnitude)
                .and_then(|component| total.checked_add(component))
                .ok_or_else(|| error(LiteralErrorKind::TooLarge, rest))?;

            rest = skip_ws(after_unit);
        }

        Ok(total)
    }

    fn unit<'a>(&self, input: &'a str) -> Option<(&'a str, i64)> {
        if input.is_empty() {
            return self.bare_tail.map(|magnitude| (input, magnitude));
        }

        (self.units)(input).ok()
    }
}

fn skip_ws(input: &str) -> &str {
    multispace0::<_, nom::error::Error<&str>>(input)
        .map(|(rest, _)| rest)
        .unwrap_or(input)
}
