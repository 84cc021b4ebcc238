//! Scheduler - priority-ordered event queue and run loop
//!
//! See `engine.rs` for the run loop, `queue.rs` for the heap keying, and
//! `stop.rs` for stop-condition factories.

pub mod engine;
pub(crate) mod queue;
pub mod stop;

// Re-export main types for convenience
pub use engine::{EventScheduler, SchedulerConfig, SimulationError};
pub use stop::{stop_after_events, stop_at_max_time, stop_never};
