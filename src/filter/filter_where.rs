use crate::database::models::Course;

use super::types::ALL;

/// AND-composed catalog predicates
#[derive(Debug, Clone, Default)]
pub struct FilterWhere {
    /// Lowercased, trimmed search text
    search: Option<String>,
    category: Option<String>,
    level: Option<String>,
}

impl FilterWhere {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty text means no search
    pub fn set_search(&mut self, text: &str) {
        let text = text.trim();
        self.search = (!text.is_empty()).then(|| text.to_lowercase());
    }

    pub fn set_category(&mut self, selection: &str) {
        self.category = Self::selection(selection);
    }

    pub fn set_level(&mut self, selection: &str) {
        self.level = Self::selection(selection);
    }

    /// `All` (or nothing) selects everything
    fn selection(value: &str) -> Option<String> {
        let value = value.trim();
        (!value.is_empty() && value != ALL).then(|| value.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.category.is_none() && self.level.is_none()
    }

    pub fn matches(&self, course: &Course) -> bool {
        if let Some(search) = &self.search {
            if !course.title.to_lowercase().contains(search.as_str()) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if course.category.name != *category {
                return false;
            }
        }
        if let Some(level) = &self.level {
            let course_level = course.specifications.level.map(|l| l.as_str());
            if course_level != Some(level.as_str()) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Level;

    fn course(title: &str, category: &str, level: Option<Level>) -> Course {
        let mut course = Course {
            title: title.to_string(),
            ..Default::default()
        };
        course.category.name = category.to_string();
        course.specifications.level = level;
        course
    }

    #[test]
    fn search_is_case_insensitive_and_trimmed() {
        let mut filter = FilterWhere::new();
        filter.set_search("  RUST ");
        assert!(filter.matches(&course("Learning Rust", "Development", None)));
        assert!(!filter.matches(&course("Go in Action", "Development", None)));

        filter.set_search("   ");
        assert!(filter.is_empty());
    }

    #[test]
    fn all_sentinel_disables_category_and_level() {
        let mut filter = FilterWhere::new();
        filter.set_category(ALL);
        filter.set_level(ALL);
        assert!(filter.is_empty());
        assert!(filter.matches(&course("Anything", "Design", None)));
    }

    #[test]
    fn category_and_level_match_exactly() {
        let mut filter = FilterWhere::new();
        filter.set_category("Design");
        filter.set_level("All Levels");
        assert!(filter.matches(&course("UX", "Design", Some(Level::AllLevels))));
        assert!(!filter.matches(&course("UX", "design", Some(Level::AllLevels))));
        assert!(!filter.matches(&course("UX", "Design", Some(Level::Beginner))));
        assert!(!filter.matches(&course("UX", "Design", None)));
    }
}
