//! Data models for the community matching backend.
//!
//! Field names serialize in camelCase to match the presentation layer's JSON contract.

mod analytics;
mod matches;
mod user;

pub use analytics::*;
pub use matches::*;
pub use user::*;
