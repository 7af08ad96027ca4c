pub mod browse;
pub mod token;
pub mod validate;
