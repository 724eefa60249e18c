//! Typed lookups for extracting parameters from a `serde_json::Value` object.
//!
//! Two families:
//! - `param_*` take a default and never fail. Missing keys and wrong types
//!   both fall back to the default.
//! - `opt_param_*` are used for partial updates ("patches"). A missing or
//!   `null` key yields `Ok(None)`; a key with the wrong JSON type is reported
//!   as [`EngineError::ParamTypeMismatch`] so bad input is not silently ignored.

use crate::error::EngineError;
use serde_json::Value;

/// Extracts an `f64` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Extracts a `usize` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .map(|v| v as usize)
        .unwrap_or(default)
}

/// Extracts a `bool` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

/// Short JSON type name used in mismatch errors.
pub fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn present<'a>(params: &'a Value, name: &str) -> Option<&'a Value> {
    params.get(name).filter(|v| !v.is_null())
}

fn mismatch(name: &str, expected: &str, got: &Value) -> EngineError {
    EngineError::ParamTypeMismatch {
        name: name.to_owned(),
        expected: expected.to_owned(),
        got: json_type_name(got).to_owned(),
    }
}

/// Optional `f64`: `Ok(None)` when absent, error when not a number.
pub fn opt_param_f64(params: &Value, name: &str) -> Result<Option<f64>, EngineError> {
    match present(params, name) {
        None => Ok(None),
        Some(v) => v.as_f64().map(Some).ok_or_else(|| mismatch(name, "number", v)),
    }
}

/// Optional `usize`: `Ok(None)` when absent, error when not a non-negative integer.
pub fn opt_param_usize(params: &Value, name: &str) -> Result<Option<usize>, EngineError> {
    match present(params, name) {
        None => Ok(None),
        Some(v) => v
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| mismatch(name, "non-negative integer", v)),
    }
}

/// Optional `bool`: `Ok(None)` when absent, error when not a boolean.
pub fn opt_param_bool(params: &Value, name: &str) -> Result<Option<bool>, EngineError> {
    match present(params, name) {
        None => Ok(None),
        Some(v) => v.as_bool().map(Some).ok_or_else(|| mismatch(name, "boolean", v)),
    }
}

/// Optional `&str`: `Ok(None)` when absent, error when not a string.
pub fn opt_param_str<'a>(params: &'a Value, name: &str) -> Result<Option<&'a str>, EngineError> {
    match present(params, name) {
        None => Ok(None),
        Some(v) => v.as_str().map(Some).ok_or_else(|| mismatch(name, "string", v)),
    }
}

/// Optional closed interval given as a two-element numeric array `[min, max]`.
///
/// Rejects arrays of the wrong length and intervals with `min > max`.
pub fn opt_param_interval(params: &Value, name: &str) -> Result<Option<(f64, f64)>, EngineError> {
    let Some(v) = present(params, name) else {
        return Ok(None);
    };
    let pair = v
        .as_array()
        .filter(|a| a.len() == 2)
        .ok_or_else(|| mismatch(name, "[min, max] array", v))?;
    let min = pair[0]
        .as_f64()
        .ok_or_else(|| mismatch(name, "[min, max] array", v))?;
    let max = pair[1]
        .as_f64()
        .ok_or_else(|| mismatch(name, "[min, max] array", v))?;
    if min > max {
        return Err(EngineError::InvalidParam {
            name: name.to_owned(),
            reason: format!("min ({min}) must not exceed max ({max})"),
        });
    }
    Ok(Some((min, max)))
}
