//! Discrete Event Simulation Core - Rust Engine
//!
//! A reusable discrete-event simulation (DES) core: events carry a firing
//! time, an action, and a private context; the scheduler drains them in
//! `(time, insertion order)` order while advancing a logical clock.
//!
//! # Architecture
//!
//! - **core**: logical clock (`SimClock`)
//! - **models**: domain types (`Event`, `EventHandle`, `FiredEvent`, `Trace`)
//! - **scheduler**: event queue, run loop, stop conditions
//!
//! # Critical Invariants
//!
//! 1. The clock never regresses: `current_time` is monotonically
//!    non-decreasing across pops, even when an already-due event fires.
//! 2. Events sharing a timestamp fire in the exact order they were
//!    scheduled (FIFO tie-break via a monotonic sequence number). Events
//!    themselves are never compared against each other.
//! 3. Each event fires exactly once. Cancellation is O(1) deactivation,
//!    not heap removal: an inactive event is popped as a no-op.
//!
//! # Example
//!
//! ```
//! use des_core::{ActionResult, Context, Event, EventScheduler, stop_at_max_time};
//! use serde_json::{json, Value};
//! use std::collections::HashMap;
//!
//! let mut scheduler = EventScheduler::new();
//!
//! let mut context = HashMap::new();
//! context.insert("customer".to_string(), json!("c-1"));
//!
//! let arrival = Event::new(
//!     2.0,
//!     |context: &mut Context<Value>, _scheduler: &mut EventScheduler| -> ActionResult<Value> {
//!         Ok(Some(json!({"arrived": context["customer"].clone()})))
//!     },
//!     context,
//! );
//!
//! scheduler.schedule(arrival).unwrap();
//! scheduler.run(stop_at_max_time(2.0)).unwrap();
//! assert_eq!(scheduler.current_time(), 2.0);
//! ```

// Module declarations
pub mod core;
pub mod models;
pub mod scheduler;

// Re-exports for convenience
pub use crate::core::time::SimClock;
pub use models::{
    event::{Action, ActionError, ActionResult, Context, Event, EventHandle},
    trace::{FiredEvent, Trace},
};
pub use scheduler::{
    engine::{EventScheduler, SchedulerConfig, SimulationError},
    stop::{stop_after_events, stop_at_max_time, stop_never},
};
