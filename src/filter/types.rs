use serde::{Deserialize, Serialize};
use std::fmt;

/// Selection meaning "no filter" for category and level
pub const ALL: &str = "All";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    PriceAsc,
    PriceDesc,
    Oldest,
    #[default]
    Newest,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::PriceAsc => "price-asc",
            SortKey::PriceDesc => "price-desc",
            SortKey::Oldest => "oldest",
            SortKey::Newest => "newest",
        }
    }

    pub fn field(&self) -> SortField {
        match self {
            SortKey::PriceAsc | SortKey::PriceDesc => SortField::Price,
            SortKey::Oldest | SortKey::Newest => SortField::CreatedAt,
        }
    }

    pub fn direction(&self) -> SortDirection {
        match self {
            SortKey::PriceAsc | SortKey::Oldest => SortDirection::Asc,
            SortKey::PriceDesc | SortKey::Newest => SortDirection::Desc,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Price,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Raw catalog selections, e.g. from CLI flags or a query string
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterData {
    pub search: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub sort: Option<String>,
}
