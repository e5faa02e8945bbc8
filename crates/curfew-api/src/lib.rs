//! Shared value types for curfew
//!
//! These are the values that cross crate boundaries:
//! - Usage snapshots computed by the engine on each check
//! - Enforcement reasons and actions
//! - The gap-filled daily series consumed by reporting

mod series;
mod types;

pub use series::*;
pub use types::*;
