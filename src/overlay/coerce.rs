//! Numeric coercion for incoming setting values
//!
//! Form inputs deliver either JSON numbers or strings such as `"7.63%"` or
//! `"50"`. Every conversion from a raw payload to a number happens here:
//! colors and contrasts truncate toward zero, boundaries keep their fraction.
//! Strings are read by their leading numeric prefix, so a trailing `%` or
//! unit is ignored. A string without any numeric prefix is rejected.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A raw setting value as it arrives on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    /// Decode a JSON value, rejecting anything that is neither number nor string
    pub fn from_json(field: &str, value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(NumericInput::Number)
                .ok_or_else(|| invalid(field, value.to_string())),
            serde_json::Value::String(s) => Ok(NumericInput::Text(s.clone())),
            other => Err(invalid(field, other.to_string())),
        }
    }

    /// Integer reading, truncated toward zero (`75.9` and `"75.9"` both give 75)
    pub fn truncate_int(&self, field: &str) -> Result<i64> {
        match self {
            NumericInput::Number(n) if n.is_finite() => Ok(n.trunc() as i64),
            NumericInput::Number(n) => Err(invalid(field, n.to_string())),
            NumericInput::Text(s) => int_prefix(s).ok_or_else(|| invalid(field, s.clone())),
        }
    }

    /// Float reading (`"7.63%"` gives 7.63)
    pub fn to_float(&self, field: &str) -> Result<f64> {
        match self {
            NumericInput::Number(n) if n.is_finite() => Ok(*n),
            NumericInput::Number(n) => Err(invalid(field, n.to_string())),
            NumericInput::Text(s) => float_prefix(s).ok_or_else(|| invalid(field, s.clone())),
        }
    }
}

impl From<i64> for NumericInput {
    fn from(value: i64) -> Self {
        NumericInput::Number(value as f64)
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        NumericInput::Number(value)
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        NumericInput::Text(value.to_string())
    }
}

fn invalid(field: &str, value: String) -> Error {
    Error::InvalidNumber {
        field: field.to_string(),
        value,
    }
}

/// Length of an optional leading sign
fn sign_len(s: &str) -> usize {
    match s.as_bytes().first() {
        Some(b'+') | Some(b'-') => 1,
        _ => 0,
    }
}

fn digit_run(bytes: &[u8], from: usize) -> usize {
    bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Base-10 integer prefix of `s`, ignoring leading whitespace
fn int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let sign = sign_len(s);
    let digits = digit_run(s.as_bytes(), sign);
    if digits == 0 {
        return None;
    }
    let negative = s.starts_with('-');
    // Only overflow can fail once the digit run is non-empty.
    Some(
        s[..sign + digits]
            .parse::<i64>()
            .unwrap_or(if negative { i64::MIN } else { i64::MAX }),
    )
}

/// Decimal float prefix of `s` (sign, digits, fraction, exponent)
fn float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = sign_len(s);

    let int_digits = digit_run(bytes, end);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digit_run(bytes, end + 1);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let exp_sign = sign_len(&s[end + 1..]);
        let exp_digits = digit_run(bytes, end + 1 + exp_sign);
        if exp_digits > 0 {
            end += 1 + exp_sign + exp_digits;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}
