use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::database::models::Level;

pub const TITLE_MIN_CHARS: usize = 5;
pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 5000;
pub const PRICE_MAX: f64 = 10000.0;

/// Outcome of validating a course payload. `errors` keeps field order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// A finite number, or a string that parses to one
pub fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

pub fn parse_price(value: &Value) -> Option<f64> {
    parse_number(value)
}

/// Present and not null
fn supplied<'a>(payload: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    payload.get(key).filter(|v| !v.is_null())
}

/// Check a course payload. Every violation is reported, not only the first.
///
/// With `is_partial_update` the required fields may be omitted; anything
/// supplied is still checked.
pub fn validate_course(payload: &Value, is_partial_update: bool) -> ValidationResult {
    let Some(payload) = payload.as_object() else {
        return ValidationResult::from_errors(vec!["Request body must be a JSON object".to_string()]);
    };

    let mut errors = Vec::new();
    check_title(payload, is_partial_update, &mut errors);
    check_price(payload, is_partial_update, &mut errors);
    check_description(payload, &mut errors);
    check_category(payload, &mut errors);
    check_syllabus(payload, &mut errors);
    check_specifications(payload, &mut errors);

    ValidationResult::from_errors(errors)
}

fn check_title(payload: &Map<String, Value>, is_partial_update: bool, errors: &mut Vec<String>) {
    // An explicit null is supplied and fails like a missing title
    if !payload.contains_key("title") && is_partial_update {
        return;
    }

    match supplied(payload, "title").and_then(Value::as_str) {
        None => errors.push("Title is required and must be a string".to_string()),
        Some(title) => {
            let chars = title.trim().chars().count();
            if chars < TITLE_MIN_CHARS {
                errors.push(format!("Title must be at least {} characters long", TITLE_MIN_CHARS));
            } else if chars > TITLE_MAX_CHARS {
                errors.push(format!("Title must not exceed {} characters", TITLE_MAX_CHARS));
            }
        }
    }
}

fn check_price(payload: &Map<String, Value>, is_partial_update: bool, errors: &mut Vec<String>) {
    if !payload.contains_key("price") && is_partial_update {
        return;
    }
    let Some(price) = supplied(payload, "price") else {
        errors.push("Price is required".to_string());
        return;
    };

    match parse_price(price) {
        None => errors.push("Price must be a valid number".to_string()),
        Some(p) if p < 0.0 => errors.push("Price cannot be negative".to_string()),
        Some(p) if p > PRICE_MAX => errors.push(format!("Price cannot exceed {}", PRICE_MAX)),
        Some(_) => {}
    }
}

fn check_description(payload: &Map<String, Value>, errors: &mut Vec<String>) {
    let Some(description) = supplied(payload, "description") else {
        return;
    };

    match description.as_str() {
        None => errors.push("Description must be a string".to_string()),
        Some(d) if d.trim().chars().count() > DESCRIPTION_MAX_CHARS => {
            errors.push(format!("Description must not exceed {} characters", DESCRIPTION_MAX_CHARS))
        }
        Some(_) => {}
    }
}

fn check_category(payload: &Map<String, Value>, errors: &mut Vec<String>) {
    let Some(category) = supplied(payload, "category") else {
        return;
    };
    let Some(category) = category.as_object() else {
        errors.push("Category must be an object".to_string());
        return;
    };

    if supplied(category, "name").is_some_and(|name| !name.is_string()) {
        errors.push("Category name must be a string".to_string());
    }
    if supplied(category, "tags").is_some_and(|tags| !tags.is_array()) {
        errors.push("Category tags must be an array".to_string());
    }
}

fn check_syllabus(payload: &Map<String, Value>, errors: &mut Vec<String>) {
    let Some(syllabus) = supplied(payload, "syllabus") else {
        return;
    };
    let Some(modules) = syllabus.as_array() else {
        errors.push("Syllabus must be an array".to_string());
        return;
    };

    for (index, module) in modules.iter().enumerate() {
        let position = index + 1;
        let title = module.get("title").and_then(Value::as_str);
        if title.is_none() {
            errors.push(format!(
                "Syllabus module {}: title is required and must be a string",
                position
            ));
        }
        let lessons = module.as_object().and_then(|m| supplied(m, "lessons"));
        if lessons.is_some_and(|lessons| !lessons.is_array()) {
            errors.push(format!("Syllabus module {}: lessons must be an array", position));
        }
    }
}

fn check_specifications(payload: &Map<String, Value>, errors: &mut Vec<String>) {
    let Some(specifications) = supplied(payload, "specifications") else {
        return;
    };
    let Some(specifications) = specifications.as_object() else {
        errors.push("Specifications must be an object".to_string());
        return;
    };

    if let Some(level) = supplied(specifications, "level") {
        let known = level.as_str().is_some_and(|l| l.parse::<Level>().is_ok());
        if !known {
            let allowed = Level::ALL.iter().map(Level::as_str).collect::<Vec<_>>().join(", ");
            errors.push(format!("Level must be one of: {}", allowed));
        }
    }
    if supplied(specifications, "subtitles").is_some_and(|v| !v.is_array()) {
        errors.push("Subtitles must be an array".to_string());
    }
    if supplied(specifications, "requirements").is_some_and(|v| !v.is_array()) {
        errors.push("Requirements must be an array".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_course() -> Value {
        json!({
            "title": "Rust for Beginners",
            "price": 49.99,
            "description": "Ownership, borrowing and lifetimes",
            "category": { "name": "Development", "tags": ["rust"] },
            "syllabus": [{ "title": "Getting started", "lessons": ["install", "hello world"] }],
            "specifications": { "level": "Beginner", "subtitles": ["English"], "requirements": [] }
        })
    }

    #[test]
    fn accepts_a_complete_course() {
        let result = validate_course(&valid_course(), false);
        assert!(result.is_valid, "{:?}", result.errors);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn creation_requires_title_and_price() {
        let result = validate_course(&json!({ "description": "no title, no price" }), false);
        assert!(!result.is_valid);
        assert_eq!(
            result.errors,
            vec!["Title is required and must be a string", "Price is required"]
        );
    }

    #[test]
    fn explicit_null_title_and_price_are_rejected() {
        let expected = vec!["Title is required and must be a string", "Price is required"];
        let nulls = json!({ "title": null, "price": null });
        assert_eq!(validate_course(&nulls, false).errors, expected);
        assert_eq!(validate_course(&nulls, true).errors, expected);

        let result = validate_course(&json!({ "price": null }), true);
        assert_eq!(result.errors, vec!["Price is required"]);
    }

    #[test]
    fn partial_update_without_price_is_valid() {
        let result = validate_course(&json!({ "title": "A better title" }), true);
        assert!(result.is_valid, "{:?}", result.errors);
        assert!(validate_course(&json!({}), true).is_valid);
    }

    #[test]
    fn partial_update_still_checks_supplied_fields() {
        let result = validate_course(&json!({ "price": -1, "title": "abc" }), true);
        assert_eq!(
            result.errors,
            vec!["Title must be at least 5 characters long", "Price cannot be negative"]
        );
    }

    #[test]
    fn title_length_counts_trimmed_characters() {
        let padded = json!({ "title": "   abcd   ", "price": 1 });
        assert_eq!(validate_course(&padded, false).errors, vec!["Title must be at least 5 characters long"]);

        let long = json!({ "title": "x".repeat(201), "price": 1 });
        assert_eq!(validate_course(&long, false).errors, vec!["Title must not exceed 200 characters"]);

        let boundary = json!({ "title": "é".repeat(200), "price": 1 });
        assert!(validate_course(&boundary, false).is_valid);
    }

    #[test]
    fn price_rules() {
        let check = |price: Value| validate_course(&json!({ "title": "Valid title", "price": price }), false).errors;
        assert!(check(json!(0)).is_empty());
        assert!(check(json!(10000)).is_empty());
        assert!(check(json!("19.99")).is_empty());
        assert_eq!(check(json!(10000.01)), vec!["Price cannot exceed 10000"]);
        assert_eq!(check(json!(-0.5)), vec!["Price cannot be negative"]);
        assert_eq!(check(json!("free")), vec!["Price must be a valid number"]);
        assert_eq!(check(json!(true)), vec!["Price must be a valid number"]);
        assert_eq!(check(json!("")), vec!["Price must be a valid number"]);
    }

    #[test]
    fn collects_every_nested_violation_in_field_order() {
        let payload = json!({
            "title": 42,
            "price": "abc",
            "description": ["not", "text"],
            "category": { "name": 7, "tags": "design" },
            "syllabus": [
                { "title": "ok", "lessons": [] },
                { "lessons": "intro" }
            ],
            "specifications": { "level": "Expert", "subtitles": "en", "requirements": {} }
        });
        let result = validate_course(&payload, false);
        assert_eq!(
            result.errors,
            vec![
                "Title is required and must be a string",
                "Price must be a valid number",
                "Description must be a string",
                "Category name must be a string",
                "Category tags must be an array",
                "Syllabus module 2: title is required and must be a string",
                "Syllabus module 2: lessons must be an array",
                "Level must be one of: Beginner, Intermediate, Advanced, All Levels",
                "Subtitles must be an array",
                "Requirements must be an array",
            ]
        );
    }

    #[test]
    fn wrong_container_types() {
        let payload = json!({
            "title": "Valid title",
            "price": 5,
            "category": "Design",
            "syllabus": { "title": "one" },
            "specifications": "Beginner"
        });
        assert_eq!(
            validate_course(&payload, false).errors,
            vec![
                "Category must be an object",
                "Syllabus must be an array",
                "Specifications must be an object",
            ]
        );
    }

    #[test]
    fn description_limit() {
        let payload = json!({ "title": "Valid title", "price": 5, "description": "d".repeat(5001) });
        assert_eq!(
            validate_course(&payload, false).errors,
            vec!["Description must not exceed 5000 characters"]
        );
    }

    #[test]
    fn rejects_non_object_bodies() {
        let result = validate_course(&json!(["title"]), true);
        assert_eq!(result.errors, vec!["Request body must be a JSON object"]);
    }
}
