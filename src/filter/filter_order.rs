use std::cmp::Ordering;

use crate::database::models::Course;

use super::error::FilterError;
use super::types::{SortDirection, SortField, SortKey};

pub struct FilterOrder;

impl FilterOrder {
    /// Accepts the catalog sort keys plus `date-asc` / `date-desc` aliases
    pub fn validate_and_parse(key: &str) -> Result<SortKey, FilterError> {
        match key.trim().to_ascii_lowercase().as_str() {
            "" | "newest" | "date-desc" => Ok(SortKey::Newest),
            "oldest" | "date-asc" => Ok(SortKey::Oldest),
            "price-asc" => Ok(SortKey::PriceAsc),
            "price-desc" => Ok(SortKey::PriceDesc),
            _ => Err(FilterError::UnsupportedSortKey(key.to_string())),
        }
    }

    /// Total order for `key`. Courses without a creation time sort as oldest.
    pub fn compare(key: SortKey, a: &Course, b: &Course) -> Ordering {
        let ascending = match key.field() {
            SortField::Price => a.price.total_cmp(&b.price),
            SortField::CreatedAt => a.metadata.created_at.cmp(&b.metadata.created_at),
        };
        match key.direction() {
            SortDirection::Asc => ascending,
            SortDirection::Desc => ascending.reverse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keys_and_aliases() {
        assert_eq!(FilterOrder::validate_and_parse("price-asc"), Ok(SortKey::PriceAsc));
        assert_eq!(FilterOrder::validate_and_parse("Price-Desc"), Ok(SortKey::PriceDesc));
        assert_eq!(FilterOrder::validate_and_parse("date-asc"), Ok(SortKey::Oldest));
        assert_eq!(FilterOrder::validate_and_parse("date-desc"), Ok(SortKey::Newest));
        assert_eq!(FilterOrder::validate_and_parse(""), Ok(SortKey::Newest));
        assert_eq!(
            FilterOrder::validate_and_parse("rating"),
            Err(FilterError::UnsupportedSortKey("rating".to_string()))
        );
    }

    #[test]
    fn missing_creation_time_sorts_first_when_ascending() {
        let undated = Course::default();
        let mut dated = Course::default();
        dated.metadata.created_at = Some(chrono::Utc::now());

        assert_eq!(FilterOrder::compare(SortKey::Oldest, &undated, &dated), Ordering::Less);
        assert_eq!(FilterOrder::compare(SortKey::Newest, &undated, &dated), Ordering::Greater);
    }
}
