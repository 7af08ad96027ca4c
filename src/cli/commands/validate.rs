use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use serde_json::{json, Value};

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::database::models::slugify;
use crate::validation::{sanitize_course, validate_course};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[arg(help = "Course payload file (.json, .yaml or .yml)")]
    pub file: PathBuf,

    #[arg(long, help = "Validate as a partial update instead of a creation")]
    pub partial: bool,
}

pub fn handle(args: ValidateArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let payload = load_payload(&args.file)?;

    match check(&payload, args.partial) {
        Ok(sanitized) => output_success(&output_format, "Course payload is valid", Some(sanitized)),
        Err(errors) => {
            output_error(&output_format, "Course validation failed", &errors)?;
            anyhow::bail!("{} validation error(s) in {}", errors.len(), args.file.display())
        }
    }
}

/// YAML by extension, JSON otherwise
pub fn load_payload(path: &Path) -> anyhow::Result<Value> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        serde_yaml::from_str(&raw).with_context(|| format!("{} is not valid YAML", path.display()))
    } else {
        serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))
    }
}

/// The sanitized payload plus its derived slug, or the ordered validation errors
pub fn check(payload: &Value, is_partial_update: bool) -> Result<Value, Vec<String>> {
    let result = validate_course(payload, is_partial_update);
    if !result.is_valid {
        return Err(result.errors);
    }

    let sanitized = sanitize_course(payload);
    let slug = sanitized.get("title").and_then(Value::as_str).map(slugify);
    Ok(json!({
        "course": sanitized,
        "slug": slug
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_payload_reports_slug() {
        let payload = json!({
            "title": "  Rust for Pythonistas ",
            "price": "49.00",
            "unknown": true
        });
        let report = check(&payload, false).unwrap();
        assert_eq!(report["slug"], json!("rust-for-pythonistas"));
        assert_eq!(report["course"]["title"], json!("Rust for Pythonistas"));
        assert!(report["course"].get("unknown").is_none());
    }

    #[test]
    fn invalid_payload_returns_errors_in_order() {
        let errors = check(&json!({ "price": -1 }), false).unwrap_err();
        assert_eq!(errors[0], "Title is required and must be a string");
        assert_eq!(errors[1], "Price cannot be negative");
    }

    #[test]
    fn partial_update_without_title_has_no_slug() {
        let report = check(&json!({ "price": 10 }), true).unwrap();
        assert_eq!(report["slug"], Value::Null);
    }

    #[test]
    fn reads_yaml_and_json_files() {
        let dir = std::env::temp_dir();
        let yaml = dir.join(format!("coursemart-validate-{}.yaml", std::process::id()));
        std::fs::write(&yaml, "title: Intro to YAML\nprice: 0\n").unwrap();
        assert_eq!(load_payload(&yaml).unwrap()["title"], json!("Intro to YAML"));

        let json_file = dir.join(format!("coursemart-validate-{}.json", std::process::id()));
        std::fs::write(&json_file, r#"{"title": "Intro to JSON", "price": 5}"#).unwrap();
        assert_eq!(load_payload(&json_file).unwrap()["price"], json!(5));

        let _ = std::fs::remove_file(yaml);
        let _ = std::fs::remove_file(json_file);
    }
}
