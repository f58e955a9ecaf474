//! Background Tasks Module
//!
//! Contains background tasks owned by a cache instance.
//!
//! # Tasks
//! - Eviction sweep: removes entries past their grace period at a fixed interval

mod sweep;

pub use sweep::{spawn_sweep_task, SweepHandle, Sweepable};
