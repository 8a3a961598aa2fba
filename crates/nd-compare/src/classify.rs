//! Change classification heuristics.
//!
//! Each differing byte position carries its value tokens across all dumps;
//! classification decides whether that sequence reads as a use counter, a
//! Unix timestamp, or nothing recognizable. The outcome is a tag, never an
//! error: unrecognizable values are an expected result for ASCII text,
//! flags and key material.

use chrono::{DateTime, Local, TimeZone};

/// Tagged interpretation of one value sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// A numeric progression: consecutive per-capture deltas and their sum.
    Counter { deltas: Vec<i64>, total: i64 },
    /// Every value converts to a plausible local calendar instant.
    Timestamp { instants: Vec<DateTime<Local>> },
    /// Neither reading applies.
    Unclassified,
}

/// Classify the values observed at one byte position, in dump order.
///
/// Tokens made only of decimal digits are read as base-10 numerals even
/// though the dump format is hexadecimal. This reproduces the historical
/// behavior of the analysis: a true hex counter passing through a0..a9
/// drops out of the counter reading. Kept for compatibility, see
/// DESIGN.md.
pub fn classify(values: &[String]) -> Classification {
    if let Some(counter) = as_counter(values) {
        return counter;
    }
    if let Some(timestamp) = as_timestamp(values) {
        return timestamp;
    }
    Classification::Unclassified
}

fn as_counter(values: &[String]) -> Option<Classification> {
    if values.is_empty() || !values.iter().all(|v| is_decimal(v)) {
        return None;
    }
    let numbers: Vec<i64> = values
        .iter()
        .map(|v| v.parse().ok())
        .collect::<Option<_>>()?;
    let deltas: Vec<i64> = numbers.windows(2).map(|w| w[1] - w[0]).collect();
    let total = deltas.iter().sum();
    Some(Classification::Counter { deltas, total })
}

/// All-or-nothing: one value outside the representable epoch range makes
/// the whole sequence unclassified.
fn as_timestamp(values: &[String]) -> Option<Classification> {
    if values.is_empty() {
        return None;
    }
    let instants: Vec<DateTime<Local>> = values
        .iter()
        .map(|v| {
            let seconds = u32::from_str_radix(v, 16).ok()?;
            Local.timestamp_opt(i64::from(seconds), 0).single()
        })
        .collect::<Option<_>>()?;
    Some(Classification::Timestamp { instants })
}

fn is_decimal(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Printable-ASCII reading of one byte token: printable bytes map to their
/// character, the rest to `.`. `None` if the token is not a valid hex byte.
pub fn ascii_char(token: &str) -> Option<char> {
    let value = u8::from_str_radix(token, 16).ok()?;
    Some(if (32..=126).contains(&value) {
        value as char
    } else {
        '.'
    })
}

/// ASCII rendering of a whole token sequence. `None` means the line is
/// reported as not convertible; one bad token poisons only its own line.
pub fn ascii_line(tokens: &[String]) -> Option<String> {
    tokens.iter().map(|t| ascii_char(t)).collect()
}

/// Decimal reading of a token sequence, for the report's decimal
/// transition line. `None` if any token is not valid hex.
pub fn decimal_line(tokens: &[String]) -> Option<Vec<i64>> {
    tokens
        .iter()
        .map(|t| i64::from_str_radix(t, 16).ok())
        .collect()
}
