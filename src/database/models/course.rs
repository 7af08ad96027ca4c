use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

use crate::database::document::Document;

/// Course difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
    #[serde(rename = "All Levels")]
    AllLevels,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Beginner, Level::Intermediate, Level::Advanced, Level::AllLevels];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "Beginner",
            Level::Intermediate => "Intermediate",
            Level::Advanced => "Advanced",
            Level::AllLevels => "All Levels",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| format!("unknown level '{}'", s))
    }
}

// Fields the validator does not check are read leniently.

/// `null` reads as the default
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Strings as-is, numbers and booleans rendered; anything else is absent
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}

/// Unknown levels read as unset
fn lenient_level<'de, D>(deserializer: D) -> Result<Option<Level>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s.parse().ok(),
        _ => None,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub subcategory: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub avatar: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyllabusModule {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lessons: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specifications {
    #[serde(default, deserialize_with = "lenient_level")]
    pub level: Option<Level>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subtitles: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub requirements: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseMetadata {
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_by: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub views: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub enrollments: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub avg_rating: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_published: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub featured: bool,
}

/// Typed read model of a course document, as served by `GET /api/courses`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub slug: String,
    pub price: f64,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: Category,
    #[serde(default, deserialize_with = "null_as_default")]
    pub instructor: Instructor,
    #[serde(default, deserialize_with = "null_as_default")]
    pub syllabus: Vec<SyllabusModule>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub specifications: Specifications,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reviews: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: CourseMetadata,
}

impl Course {
    pub fn from_document(doc: &Document) -> Result<Self, serde_json::Error> {
        serde_json::from_value(doc.to_value())
    }
}

/// Lowercase, collapse every run of non `[a-z0-9]` characters into one `-`,
/// and trim `-` from both ends.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// The identity that owns a course: `instructor.id`, else `metadata.createdBy`
pub fn owner_id(course: &Document) -> Option<&str> {
    course
        .str_at("instructor.id")
        .filter(|id| !id.is_empty())
        .or_else(|| course.str_at("metadata.createdBy"))
}

/// Denormalized live enrollment count
pub fn enrollment_count(course: &Document) -> i64 {
    course.i64_at("metadata.enrollments").unwrap_or(0)
}

pub fn default_category() -> Value {
    json!({
        "id": "cat_general",
        "name": "General",
        "subcategory": "Uncategorized",
        "tags": []
    })
}

pub fn default_specifications() -> Value {
    json!({
        "level": "Beginner",
        "duration": "0 hours",
        "language": "English",
        "subtitles": ["English"],
        "requirements": []
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    #[test]
    fn slug_examples() {
        assert_eq!(slugify("Node.js API Development!"), "node-js-api-development");
        assert_eq!(slugify("  --Complete Vue 3 Masterclass--  "), "complete-vue-3-masterclass");
        assert_eq!(slugify("UI/UX Design Fundamentals"), "ui-ux-design-fundamentals");
        assert_eq!(slugify("Docker & Kubernetes Guide"), "docker-kubernetes-guide");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn slug_is_idempotent() {
        for title in ["Node.js API Development!", "Git & GitHub Mastery", "Ça va? Déjà vu"] {
            let once = slugify(title);
            assert_eq!(slugify(&once), once);
        }
    }

    #[test]
    fn non_ascii_letters_become_separators() {
        assert_eq!(slugify("Ça va? Déjà vu"), "a-va-d-j-vu");
    }

    #[test]
    fn levels_round_trip_through_strings() {
        assert_eq!("All Levels".parse::<Level>(), Ok(Level::AllLevels));
        assert!("Expert".parse::<Level>().is_err());
        assert_eq!(serde_json::to_value(Level::AllLevels).unwrap(), json!("All Levels"));
    }

    #[test]
    fn owner_falls_back_to_created_by() {
        let data: Map<String, Value> = json!({ "metadata": { "createdBy": "u1" } })
            .as_object()
            .cloned()
            .unwrap();
        let doc = Document::new("c1", data);
        assert_eq!(owner_id(&doc), Some("u1"));

        let data = json!({ "instructor": { "id": "u2" }, "metadata": { "createdBy": "u1" } })
            .as_object()
            .cloned()
            .unwrap();
        assert_eq!(owner_id(&Document::new("c1", data)), Some("u2"));
    }

    #[test]
    fn parses_course_documents_leniently() {
        let data = json!({
            "title": "Rust for Beginners",
            "price": 19.5,
            "category": { "name": "Development", "tags": ["rust"] },
            "specifications": { "level": "Beginner" },
            "metadata": { "createdAt": "2024-01-02T03:04:05Z", "isPublished": true }
        });
        let doc = Document::from_value("c1", data).unwrap();
        let course = Course::from_document(&doc).unwrap();
        assert_eq!(course.id, "c1");
        assert_eq!(course.category.name, "Development");
        assert_eq!(course.specifications.level, Some(Level::Beginner));
        assert!(course.metadata.is_published);
        assert_eq!(course.metadata.enrollments, 0);
    }

    #[test]
    fn reads_unvalidated_fields_leniently() {
        let data = json!({
            "title": "Odd but valid",
            "price": 10,
            "instructor": { "id": "u1", "name": "Ada", "bio": 123, "avatar": { "url": "x" }, "email": null },
            "specifications": { "level": "Expert", "subtitles": null, "requirements": null },
            "syllabus": [{ "title": "Intro", "lessons": null }],
            "category": { "name": "Design", "tags": null, "subcategory": 7 }
        });
        let doc = Document::from_value("c1", data).unwrap();
        let course = Course::from_document(&doc).unwrap();

        assert_eq!(course.instructor.bio.as_deref(), Some("123"));
        assert_eq!(course.instructor.avatar, None);
        assert_eq!(course.instructor.email, None);
        assert_eq!(course.specifications.level, None);
        assert!(course.specifications.subtitles.is_empty());
        assert!(course.syllabus[0].lessons.is_empty());
        assert!(course.category.tags.is_empty());
        assert_eq!(course.category.subcategory.as_deref(), Some("7"));
    }
}
