use serde_json::{Map, Number, Value};

use super::course::parse_price;

/// Top-level keys a course payload may persist
pub const COURSE_FIELDS: [&str; 8] = [
    "title",
    "price",
    "description",
    "category",
    "instructor",
    "syllabus",
    "specifications",
    "metadata",
];

/// Narrow a payload to the recognized course fields. Never rejects: values
/// that cannot be normalized pass through unchanged.
pub fn sanitize_course(payload: &Value) -> Map<String, Value> {
    let mut sanitized = Map::new();
    let Some(payload) = payload.as_object() else {
        return sanitized;
    };

    for key in COURSE_FIELDS {
        let Some(value) = payload.get(key).filter(|v| !v.is_null()) else {
            continue;
        };
        let value = match key {
            "title" | "description" => trimmed(value),
            "price" => parse_price(value).map_or_else(|| value.clone(), price_value),
            _ => value.clone(),
        };
        sanitized.insert(key.to_string(), value);
    }

    sanitized
}

fn trimmed(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.trim().to_string()),
        other => other.clone(),
    }
}

/// Whole prices are stored as integers so `50` stays `50` on the wire
pub fn price_value(price: f64) -> Value {
    if price.fract() == 0.0 && price.abs() < i64::MAX as f64 {
        Value::from(price as i64)
    } else {
        Number::from_f64(price).map_or(Value::Null, Value::Number)
    }
}
