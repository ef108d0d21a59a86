//! Conversions between ledger micro-denomination strings and human-scale
//! decimal amounts.
//!
//! Every amount that takes part in a comparison goes through [`to_decimal`],
//! so baseline and current values are always rounded identically to six
//! decimal places before any arithmetic happens.

use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;

/// Number of decimal places kept after converting from micro-denomination.
pub const DISPLAY_SCALE: u32 = 6;

/// Ledger amounts are integer strings scaled by 10^6.
const MICRO_FACTOR: i64 = 1_000_000;

/// Result of parsing a raw ledger amount. Unparsable input keeps the zero
/// value with `ok == false` so callers can decide whether to report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOutcome {
    pub value: Decimal,
    pub ok: bool,
}

impl ParseOutcome {
    fn failed() -> Self {
        Self {
            value: Decimal::ZERO,
            ok: false,
        }
    }
}

/// Parses `raw` as a base-10 number (plain or scientific notation), divides
/// it by 10^6 and rounds the result to six decimal places.
///
/// Integer strings go through `i128` so amounts wider than a `Decimal`
/// mantissa lose fractional digits rather than turning into zero. Values
/// whose whole part is out of `Decimal` range clamp to `Decimal::MAX`
/// (or `MIN`). Digit separators such as `_` are rejected.
pub fn parse_amount(raw: &str) -> ParseOutcome {
    if raw.contains('_') {
        return ParseOutcome::failed();
    }
    if let Some(value) = parse_integer(raw) {
        return ParseOutcome { value, ok: true };
    }

    let scaled = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
        .and_then(|micro| micro.checked_div(Decimal::from(MICRO_FACTOR)));
    if let Some(value) = scaled {
        return ParseOutcome {
            value: round_display(value),
            ok: true,
        };
    }

    match raw.parse::<f64>() {
        Ok(micro) if micro.is_finite() => {
            let value = micro / MICRO_FACTOR as f64;
            ParseOutcome {
                value: Decimal::from_f64(value)
                    .map(round_display)
                    .unwrap_or_else(|| clamped(raw, value < 0.0)),
                ok: true,
            }
        }
        _ => ParseOutcome::failed(),
    }
}

fn parse_integer(raw: &str) -> Option<Decimal> {
    let digits = raw.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let negative = raw.starts_with('-');
    let value = raw
        .parse::<i128>()
        .ok()
        .and_then(scale_micro)
        .unwrap_or_else(|| clamped(raw, negative));
    Some(value)
}

/// Divides a micro-amount by 10^6, keeping as many of the six fractional
/// digits as the 96-bit mantissa allows.
fn scale_micro(micro: i128) -> Option<Decimal> {
    (0..=DISPLAY_SCALE).rev().find_map(|scale| {
        let divisor = 10_i128.pow(DISPLAY_SCALE - scale);
        Decimal::try_from_i128_with_scale(div_half_even(micro, divisor), scale).ok()
    })
}

fn div_half_even(value: i128, divisor: i128) -> i128 {
    let quotient = value / divisor;
    let twice_remainder = (value % divisor).abs() * 2;
    if twice_remainder > divisor || (twice_remainder == divisor && quotient % 2 != 0) {
        quotient + value.signum()
    } else {
        quotient
    }
}

fn round_display(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointNearestEven)
}

fn clamped(raw: &str, negative: bool) -> Decimal {
    warn!(raw, "amount exceeds the decimal range, clamping");
    if negative {
        Decimal::MIN
    } else {
        Decimal::MAX
    }
}

/// Human-scale value of a raw micro-amount. Unparsable input yields zero.
pub fn to_decimal(raw: &str) -> Decimal {
    let outcome = parse_amount(raw);
    if !outcome.ok && !raw.is_empty() {
        warn!(raw, "amount is not a number, treating it as zero");
    }
    outcome.value
}

/// Inserts thousands separators when `value` is a whole integer. Anything
/// else, including fixed-point strings such as `"1234.500000"`, is returned
/// untouched.
pub fn format_grouped(value: &str) -> String {
    let Ok(number) = value.parse::<i64>() else {
        return value.to_string();
    };

    let digits = number.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if number < 0 {
        grouped.push('-');
    }
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Canonical display string for a raw micro-amount: six fixed decimals,
/// grouping applied, denomination appended.
pub fn to_display_amount(raw: &str, denom: &str) -> String {
    format!("{}{denom}", format_decimal(to_decimal(raw)))
}

/// Formats an already converted amount with six fixed decimals and grouping.
pub fn format_decimal(value: Decimal) -> String {
    format_grouped(&format!("{:.*}", DISPLAY_SCALE as usize, value))
}
