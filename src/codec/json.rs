//! Conversions between [`Value`] and `serde_json::Value`.
//!
//! JSON is the usual way hosts describe constructor arguments in tests and
//! tooling. Only shapes that have a wire tag convert; JSON objects do not.

use serde_json::{Number, Value as Json};

use super::value::Value;
use crate::error::BridgeError;

impl TryFrom<Json> for Value {
    type Error = BridgeError;

    /// Integers become `Int32` when they fit, otherwise `Int64`.
    fn try_from(json: Json) -> Result<Self, Self::Error> {
        Ok(match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => number_to_value(&n)?,
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::Sequence(
                items
                    .into_iter()
                    .map(Value::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            Json::Object(_) => {
                return Err(BridgeError::UnsupportedValueKind(
                    "JSON objects have no value tag".to_string(),
                ))
            }
        })
    }
}

fn number_to_value(n: &Number) -> Result<Value, BridgeError> {
    if let Some(i) = n.as_i64() {
        return Ok(match i32::try_from(i) {
            Ok(small) => Value::Int32(small),
            Err(_) => Value::Int64(i),
        });
    }
    if n.is_u64() {
        return Err(BridgeError::UnsupportedValueKind(format!(
            "integer {} does not fit in int64",
            n
        )));
    }
    n.as_f64()
        .map(Value::Real64)
        .ok_or_else(|| BridgeError::UnsupportedValueKind(format!("unrepresentable number {}", n)))
}

impl From<Value> for Json {
    /// Non-finite floats have no JSON form and become `null`.
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(b),
            Value::Int32(i) => Json::from(i),
            Value::Int64(i) => Json::from(i),
            Value::Real64(f) => Number::from_f64(f).map_or(Json::Null, Json::Number),
            Value::String(s) => Json::String(s),
            Value::Sequence(items) => Json::Array(items.into_iter().map(Json::from).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_to_value() {
        let value = Value::try_from(json!([null, true, 1, 5_000_000_000i64, 1.5, "s", []])).unwrap();
        assert_eq!(
            value,
            Value::Sequence(vec![
                Value::Null,
                Value::Bool(true),
                Value::Int32(1),
                Value::Int64(5_000_000_000),
                Value::Real64(1.5),
                Value::from("s"),
                Value::Sequence(vec![]),
            ])
        );
    }

    #[test]
    fn test_json_object_unsupported() {
        let err = Value::try_from(json!({ "a": 1 })).unwrap_err();
        assert!(matches!(err, BridgeError::UnsupportedValueKind(_)));
    }

    #[test]
    fn test_nested_object_unsupported() {
        let err = Value::try_from(json!([1, [{ "a": 1 }]])).unwrap_err();
        assert!(matches!(err, BridgeError::UnsupportedValueKind(_)));
    }

    #[test]
    fn test_u64_overflow_unsupported() {
        let err = Value::try_from(json!(u64::MAX)).unwrap_err();
        assert!(err.to_string().contains("does not fit"));
    }

    #[test]
    fn test_value_to_json() {
        let json = Json::from(Value::from(vec![Value::Int32(2), Value::Real64(f64::NAN)]));
        assert_eq!(json, json!([2, null]));
    }
}
