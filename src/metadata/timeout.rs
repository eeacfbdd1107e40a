//! Timeout settings and time-string parsing.

use crate::error::DataError;
use crate::names::normalize;
use serde::Serialize;
use std::time::Duration;

/// A bound `[Timeout]` or `Test Timeout` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timeout {
    /// Time string as written.
    pub raw: String,
    /// Parsed duration.
    pub value: Duration,
    /// Optional custom failure message.
    pub message: Option<String>,
}

impl Timeout {
    /// Bind a timeout from setting values; empty values bind to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidTimeout`] when the first value is not a
    /// time string.
    pub fn from_values(values: &[String]) -> Result<Option<Self>, DataError> {
        let Some((raw, rest)) = values.split_first() else {
            return Ok(None);
        };
        if raw.is_empty() || raw.eq_ignore_ascii_case("none") {
            return Ok(None);
        }
        let message = (!rest.is_empty()).then(|| rest.join(" "));
        Ok(Some(Self {
            raw: raw.clone(),
            value: parse_time(raw)?,
            message,
        }))
    }
}

const MILLISECOND: Duration = Duration::from_millis(1);
const SECOND: Duration = Duration::from_secs(1);
const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(60 * 60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

fn unit_length(unit: &str) -> Option<Duration> {
    match unit {
        "ms" | "millis" | "millisecond" | "milliseconds" => Some(MILLISECOND),
        "" | "s" | "sec" | "secs" | "second" | "seconds" => Some(SECOND),
        "m" | "min" | "mins" | "minute" | "minutes" => Some(MINUTE),
        "h" | "hour" | "hours" => Some(HOUR),
        "d" | "day" | "days" => Some(DAY),
        _ => None,
    }
}

/// Scale `unit` by a decimal `number` such as `1.5` without floating point.
fn scale(unit: Duration, number: &str) -> Option<Duration> {
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    let whole_part = if whole.is_empty() {
        Duration::ZERO
    } else {
        unit.checked_mul(whole.parse().ok()?)?
    };
    let thousandths: u32 = format!("{fraction:0<3}").get(..3)?.parse().ok()?;
    let fraction_part = unit.checked_mul(thousandths)? / 1000;
    whole_part.checked_add(fraction_part)
}

/// Parse a time string such as `90`, `1.5s`, `1 min 30 s` or `2 hours`.
///
/// ```rust
/// use kwresolve::metadata::parse_time;
/// use std::time::Duration;
///
/// assert_eq!(parse_time("1 min 30 s").ok(), Some(Duration::from_secs(90)));
/// ```
///
/// # Errors
///
/// Returns [`DataError::InvalidTimeout`] for anything else.
pub fn parse_time(value: &str) -> Result<Duration, DataError> {
    let invalid = || DataError::InvalidTimeout {
        value: value.to_owned(),
    };
    let compact = normalize(value, &[]);
    if compact.is_empty() {
        return Err(invalid());
    }
    let mut total = Duration::ZERO;
    let mut rest = compact.as_str();
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, after_number) = rest.split_at(number_end);
        let unit_end = after_number
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after_number.len());
        let (unit, remainder) = after_number.split_at(unit_end);
        let length = unit_length(unit).ok_or_else(invalid)?;
        let part = scale(length, number).ok_or_else(invalid)?;
        total = total.checked_add(part).ok_or_else(invalid)?;
        rest = remainder;
    }
    Ok(total)
}
