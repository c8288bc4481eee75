//! Algorithms module for the query projection
//!
//! Contains:
//! - Event batch optimizer (precedence sort)
//! - Fetch plan builder

pub mod fetch_plan;
pub mod optimizer;

pub use fetch_plan::build_fetch_plan;
pub use optimizer::{is_mapped, optimize, precedence, EventBatchOptimizer};
