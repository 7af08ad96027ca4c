use crate::database::models::Course;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterData, SortKey};

/// Derived catalog view: filters first, then a stable sort.
///
/// ```ignore
/// let view = Filter::new().search("rust").category("Development").order("price-asc")?.apply(&courses);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Filter {
    where_data: FilterWhere,
    order: SortKey,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw selections; only the sort key can be rejected
    pub fn assign(data: &FilterData) -> Result<Self, FilterError> {
        let mut filter = Self::new();
        if let Some(search) = &data.search {
            filter = filter.search(search);
        }
        if let Some(category) = &data.category {
            filter = filter.category(category);
        }
        if let Some(level) = &data.level {
            filter = filter.level(level);
        }
        if let Some(sort) = &data.sort {
            filter = filter.order(sort)?;
        }
        Ok(filter)
    }

    pub fn search(mut self, text: &str) -> Self {
        self.where_data.set_search(text);
        self
    }

    pub fn category(mut self, selection: &str) -> Self {
        self.where_data.set_category(selection);
        self
    }

    pub fn level(mut self, selection: &str) -> Self {
        self.where_data.set_level(selection);
        self
    }

    pub fn order(mut self, key: &str) -> Result<Self, FilterError> {
        self.order = FilterOrder::validate_and_parse(key)?;
        Ok(self)
    }

    pub fn sort_key(&self) -> SortKey {
        self.order
    }

    pub fn apply(&self, courses: &[Course]) -> Vec<Course> {
        let mut view: Vec<Course> = courses
            .iter()
            .filter(|course| self.where_data.matches(course))
            .cloned()
            .collect();
        view.sort_by(|a, b| FilterOrder::compare(self.order, a, b));
        view
    }
}
