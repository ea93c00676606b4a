// src/capacity/mod.rs

//! Capacity Allocator.
//!
//! - [`allocator`] turns planned effort plus a resource calendar into a
//!   projected completion and utilization.
//! - [`risk`] holds the fixed utilization → risk bands.

pub mod allocator;
pub mod risk;

pub use allocator::{
    forecast, AllocatorSettings, CapacityForecast, DayAllocation, DEFAULT_LOOKAHEAD_DAYS,
    MAX_LOOKAHEAD_DAYS,
};
pub use risk::{risk_for_utilization, LOW_RISK_MAX_PCT, MEDIUM_RISK_MAX_PCT};
