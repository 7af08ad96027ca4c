use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::database::models::Course;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(body)) = (data, response.as_object_mut()) {
                body.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message with optional detail lines
pub fn output_error(output_format: &OutputFormat, message: &str, details: &[String]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let response = json!({
                "success": false,
                "error": message,
                "details": details
            });
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
            for detail in details {
                eprintln!("  - {}", detail);
            }
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(output_format: &OutputFormat, collection_name: &str, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ collection_name: [] }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// One line per course in text mode, the full documents in JSON mode
pub fn output_courses(output_format: &OutputFormat, courses: &[Course]) -> anyhow::Result<()> {
    if courses.is_empty() {
        return output_empty_collection(output_format, "courses", "No courses match");
    }

    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "courses": courses }))?);
        }
        OutputFormat::Text => {
            for course in courses {
                println!("{}", course_line(course));
            }
            println!("{} course(s)", courses.len());
        }
    }
    Ok(())
}

fn course_line(course: &Course) -> String {
    let level = course.specifications.level.map(|l| l.as_str()).unwrap_or("-");
    let created = course
        .metadata
        .created_at
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:<24} {:>9.2}  {:<16} {:<13} {}  {}",
        course.id, course.price, course.category.name, level, created, course.title
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Level;

    #[test]
    fn course_line_tolerates_missing_fields() {
        let course = Course {
            id: "abc".to_string(),
            title: "Intro to Rust".to_string(),
            price: 19.5,
            ..Default::default()
        };
        let line = course_line(&course);
        assert!(line.starts_with("abc"));
        assert!(line.contains("19.50"));
        assert!(line.ends_with("Intro to Rust"));

        let mut leveled = course.clone();
        leveled.specifications.level = Some(Level::AllLevels);
        assert!(course_line(&leveled).contains("All Levels"));
    }
}
