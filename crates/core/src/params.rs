//! Typed extraction of setting values from `serde_json::Value`.
//!
//! Controllers hand the simulator loosely typed JSON (slider numbers, text
//! input strings, checkbox booleans). These helpers convert a value into the
//! type a setting needs, or report a [`EngineError::SettingTypeMismatch`] so
//! the caller can keep the previous value.

use serde_json::Value;

use crate::error::EngineError;

/// Unit suffixes that text inputs append to numeric values.
const UNIT_SUFFIXES: &[&str] = &["px", "%", "°", "deg", "s"];

/// Returns the JSON type name used in mismatch errors.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parses numeric text typed into a control, tolerating one trailing unit.
///
/// `"42"`, `" 12.5px "`, `"50%"` and `"90°"` parse; `"fast"` and `"NaN"` do not.
pub fn parse_numeric_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let number = UNIT_SUFFIXES
        .iter()
        .find_map(|unit| trimmed.strip_suffix(unit))
        .unwrap_or(trimmed)
        .trim();
    number.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn mismatch(name: &str, expected: &str, value: &Value) -> EngineError {
    EngineError::SettingTypeMismatch {
        name: name.to_owned(),
        expected: expected.to_owned(),
        got: json_type_name(value).to_owned(),
    }
}

/// Extracts a finite `f64` from a JSON number or numeric text.
pub fn expect_f64(name: &str, value: &Value) -> Result<f64, EngineError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric_text(s),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| mismatch(name, "number", value))
}

/// Extracts a count. Fractional input truncates toward zero; negative input is rejected.
pub fn expect_usize(name: &str, value: &Value) -> Result<usize, EngineError> {
    if let Some(n) = value.as_u64() {
        return Ok(n as usize);
    }
    let v = expect_f64(name, value).map_err(|_| mismatch(name, "integer", value))?;
    if v < 0.0 {
        return Err(mismatch(name, "non-negative integer", value));
    }
    Ok(v.trunc() as usize)
}

/// Extracts a `bool`.
pub fn expect_bool(name: &str, value: &Value) -> Result<bool, EngineError> {
    value.as_bool().ok_or_else(|| mismatch(name, "boolean", value))
}

/// Extracts a string slice.
pub fn expect_str<'a>(name: &str, value: &'a Value) -> Result<&'a str, EngineError> {
    value.as_str().ok_or_else(|| mismatch(name, "string", value))
}

/// Extracts an array of strings.
pub fn expect_str_array<'a>(name: &str, value: &'a Value) -> Result<Vec<&'a str>, EngineError> {
    let items = value
        .as_array()
        .ok_or_else(|| mismatch(name, "array of strings", value))?;
    items
        .iter()
        .map(|item| item.as_str().ok_or_else(|| mismatch(name, "array of strings", item)))
        .collect()
}
