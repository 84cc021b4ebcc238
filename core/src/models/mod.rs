//! Domain models for the simulation core

pub mod event;
pub mod trace;

// Re-exports
pub use event::{Action, ActionError, ActionResult, Context, Event, EventHandle};
pub use trace::{FiredEvent, Trace};
