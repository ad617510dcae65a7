//! JSON on the command line
//!
//! Parameters come in as a JSON array (positional) or object (keyed, with the
//! mode decided by [`ParamSet::from_entries`]). Expanded parameters and result
//! values go back out as JSON.

use qexpand_core::{FlatParams, ParamKey, ParamSet, ParamValue, QexpandError, Result, Value};
use serde_json::Value as JsonValue;

/// Parse parameters given as JSON text.
pub fn parse_params(json: &str) -> Result<ParamSet> {
    let value: JsonValue = serde_json::from_str(json)?;
    params_from_json(value)
}

pub fn params_from_json(value: JsonValue) -> Result<ParamSet> {
    match value {
        JsonValue::Null => Ok(ParamSet::default()),
        JsonValue::Array(items) => Ok(ParamSet::Positional(
            items
                .into_iter()
                .map(param_from_json)
                .collect::<Result<Vec<_>>>()?,
        )),
        JsonValue::Object(map) => {
            let entries = map
                .into_iter()
                .map(|(key, value)| Ok((ParamKey::parse(&key), param_from_json(value)?)))
                .collect::<Result<Vec<_>>>()?;
            Ok(ParamSet::from_entries(entries))
        }
        other => Err(QexpandError::InvalidParams(format!(
            "expected a JSON array or object, got {}",
            other
        ))),
    }
}

/// A top-level array becomes a sequence; anything else is a scalar.
fn param_from_json(value: JsonValue) -> Result<ParamValue> {
    match value {
        JsonValue::Array(items) => Ok(ParamValue::Sequence(
            items
                .into_iter()
                .map(scalar_from_json)
                .collect::<Result<Vec<_>>>()?,
        )),
        other => Ok(ParamValue::Scalar(scalar_from_json(other)?)),
    }
}

fn scalar_from_json(value: JsonValue) -> Result<Value> {
    Ok(match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(b),
        // Integers beyond i64 keep their digits rather than rounding to f64
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Int64(i),
            None if n.is_u64() => Value::Decimal(n.to_string()),
            None => n.as_f64().map(Value::Float64).unwrap_or(Value::Null),
        },
        JsonValue::String(s) => Value::String(s),
        JsonValue::Array(items) => {
            return Err(QexpandError::InvalidParams(format!(
                "nested arrays are not supported (found an array of {} inside a sequence)",
                items.len()
            )));
        }
        object @ JsonValue::Object(_) => Value::Json(object),
    })
}

pub fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int32(i) => JsonValue::from(*i),
        Value::Int64(i) => JsonValue::from(*i),
        Value::Float64(f) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::Decimal(d) => match d.parse::<u64>() {
            Ok(u) => JsonValue::from(u),
            Err(_) => JsonValue::String(d.clone()),
        },
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Bytes(b) => JsonValue::from(b.clone()),
        Value::Uuid(u) => JsonValue::String(u.to_string()),
        Value::Date(d) => JsonValue::String(d.to_string()),
        Value::Time(t) => JsonValue::String(t.to_string()),
        Value::DateTime(dt) => JsonValue::String(dt.to_string()),
        Value::DateTimeUtc(dt) => JsonValue::String(dt.to_rfc3339()),
        Value::Json(j) => j.clone(),
        Value::Array(items) => JsonValue::Array(items.iter().map(value_to_json).collect()),
    }
}

/// Positional parameters become an array, named ones an object.
pub fn flat_params_to_json(params: &FlatParams) -> JsonValue {
    match params {
        FlatParams::Positional(values) => {
            JsonValue::Array(values.iter().map(value_to_json).collect())
        }
        FlatParams::Named(map) => JsonValue::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), value_to_json(value)))
                .collect(),
        ),
    }
}
