//! Shared utilities for curfew
//!
//! This crate provides:
//! - User identifiers
//! - Time utilities (mockable local clock, wall-clock times, weekday labels)
//! - Default paths for config, data, log, status and lock files

mod ids;
mod paths;
mod time;

pub use ids::*;
pub use paths::*;
pub use time::*;
