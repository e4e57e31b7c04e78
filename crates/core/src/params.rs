//! Helpers for pulling typed values out of a `serde_json::Value` params object.
//!
//! Missing keys fall back to the default. Keys that are present with the
//! wrong JSON type are reported as [`EngineError::ParamTypeMismatch`] so a
//! typo in `--params` is not silently ignored.

use crate::error::EngineError;
use serde_json::Value;

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(name: &str, expected: &str, got: &Value) -> EngineError {
    EngineError::ParamTypeMismatch {
        name: name.to_string(),
        expected: expected.to_string(),
        got: json_type_name(got).to_string(),
    }
}

/// Extracts an `f64` from `params[name]`. Integers are accepted.
pub fn param_f64(params: &Value, name: &str, default: f64) -> Result<f64, EngineError> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(default),
        Some(v) => v.as_f64().ok_or_else(|| mismatch(name, "f64", v)),
    }
}

/// Extracts a non-negative integer from `params[name]`.
pub fn param_usize(params: &Value, name: &str, default: usize) -> Result<usize, EngineError> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(default),
        Some(v) => v
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| mismatch(name, "unsigned integer", v)),
    }
}

/// Extracts a `bool` from `params[name]`.
pub fn param_bool(params: &Value, name: &str, default: bool) -> Result<bool, EngineError> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(default),
        Some(v) => v.as_bool().ok_or_else(|| mismatch(name, "bool", v)),
    }
}

/// Extracts an optional `u64`; `null` and a missing key both give `default`.
pub fn param_u64_opt(
    params: &Value,
    name: &str,
    default: Option<u64>,
) -> Result<Option<u64>, EngineError> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(default),
        Some(v) => v
            .as_u64()
            .map(Some)
            .ok_or_else(|| mismatch(name, "unsigned integer", v)),
    }
}

/// Extracts a string from `params[name]`; `None` when missing or `null`.
pub fn param_str<'a>(params: &'a Value, name: &str) -> Result<Option<&'a str>, EngineError> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v.as_str().map(Some).ok_or_else(|| mismatch(name, "string", v)),
    }
}

/// Extracts a list of strings (e.g. hex colors) from `params[name]`.
pub fn param_strings(
    params: &Value,
    name: &str,
) -> Result<Option<Vec<String>>, EngineError> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(String::from)
                    .ok_or_else(|| mismatch(name, "array of strings", item))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(v) => Err(mismatch(name, "array of strings", v)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn param_f64_extracts_integer_as_float() {
        let params = json!({"scale": 10});
        assert_eq!(param_f64(&params, "scale", 0.0).unwrap(), 10.0);
    }

    #[test]
    fn param_f64_returns_default_when_missing_or_null() {
        let params = json!({"scale": null});
        assert_eq!(param_f64(&params, "scale", 5.0).unwrap(), 5.0);
        assert_eq!(param_f64(&params, "other", 3.0).unwrap(), 3.0);
    }

    #[test]
    fn param_f64_rejects_wrong_type() {
        let params = json!({"scale": "big"});
        let err = param_f64(&params, "scale", 1.0).unwrap_err();
        assert!(matches!(err, EngineError::ParamTypeMismatch { ref name, .. } if name == "scale"));
    }

    #[test]
    fn param_usize_rejects_negative_and_float() {
        assert!(param_usize(&json!({"n": -1}), "n", 5).is_err());
        assert!(param_usize(&json!({"n": 2.5}), "n", 5).is_err());
        assert_eq!(param_usize(&json!({"n": 42}), "n", 5).unwrap(), 42);
    }

    #[test]
    fn param_bool_extracts_and_defaults() {
        assert!(!param_bool(&json!({"b": false}), "b", true).unwrap());
        assert!(param_bool(&json!({}), "b", true).unwrap());
        assert!(param_bool(&json!({"b": 1}), "b", true).is_err());
    }

    #[test]
    fn param_u64_opt_handles_null_and_value() {
        assert_eq!(param_u64_opt(&json!({"seed": null}), "seed", None).unwrap(), None);
        assert_eq!(param_u64_opt(&json!({"seed": 9}), "seed", None).unwrap(), Some(9));
    }

    #[test]
    fn param_str_rejects_non_strings() {
        assert_eq!(param_str(&json!({"bg": "#101010"}), "bg").unwrap(), Some("#101010"));
        assert_eq!(param_str(&json!({"bg": null}), "bg").unwrap(), None);
        let err = param_str(&json!({"bg": 5}), "bg").unwrap_err();
        assert!(matches!(err, EngineError::ParamTypeMismatch { ref got, .. } if got == "number"));
    }

    #[test]
    fn param_strings_reads_array() {
        let params = json!({"palette": ["#ff0000", "#00ff00"]});
        let got = param_strings(&params, "palette").unwrap().unwrap();
        assert_eq!(got, vec!["#ff0000", "#00ff00"]);
        assert!(param_strings(&json!({"palette": [1]}), "palette").is_err());
        assert!(param_strings(&json!({}), "palette").unwrap().is_none());
    }

    #[test]
    fn non_object_params_use_defaults() {
        let params = json!("not an object");
        assert_eq!(param_usize(&params, "n", 7).unwrap(), 7);
    }
}
