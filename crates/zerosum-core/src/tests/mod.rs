//! Cross-module scenario tests.
//!
//! - `integration.rs`: full matches driven through the turn engine
//! - `determinism.rs`: seeded bot-vs-bot matches replay identically
//! - `helpers.rs`: match setup and a minimal bot host loop

mod helpers;
mod integration;

pub use helpers::*;
