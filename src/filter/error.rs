use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum FilterError {
    #[error("Unsupported sort key: {0} (expected price-asc, price-desc, newest or oldest)")]
    UnsupportedSortKey(String),
}
