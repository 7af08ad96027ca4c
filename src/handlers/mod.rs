// handlers/mod.rs - two security tiers
//
// Public (no auth, or optional identity) → Protected (bearer token required,
// with instructor and ownership gates layered per route)
pub mod extract;
pub mod protected;
pub mod public;

pub use extract::{ApiJson, JsonOrForm};
