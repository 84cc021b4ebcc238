//! Stop-condition factories
//!
//! A run terminates when its stop condition returns true. Conditions are
//! closures receiving the scheduler before each pop, so they can read the
//! clock and queue without capturing a borrow across the run; factories here
//! close only over their own parameters, never over an ambient scheduler.

use crate::scheduler::engine::EventScheduler;

/// Stop once the clock has reached `max_time`.
///
/// The event that advances the clock to `max_time` still fires; the run stops
/// before the next pop.
///
/// # Example
/// ```
/// use des_core::{EventScheduler, stop_at_max_time};
/// use serde_json::Value;
///
/// let mut stop = stop_at_max_time(10.0);
/// let scheduler: EventScheduler<Value> = EventScheduler::new();
/// assert!(!stop(&scheduler)); // clock at 0.0
/// ```
pub fn stop_at_max_time<V: 'static>(max_time: f64) -> impl FnMut(&EventScheduler<V>) -> bool {
    move |scheduler| scheduler.current_time() >= max_time
}

/// Stop after `max_events` events have been popped.
///
/// Counts iterations it lets through, so it needs no scheduler state.
pub fn stop_after_events<V: 'static>(max_events: usize) -> impl FnMut(&EventScheduler<V>) -> bool {
    let mut popped = 0usize;
    move |_scheduler| {
        if popped >= max_events {
            true
        } else {
            popped += 1;
            false
        }
    }
}

/// Never stop.
///
/// With this condition `run` fires every event and then returns
/// `SimulationError::EmptyQueue`; use `drain` when running dry is the goal.
pub fn stop_never<V: 'static>() -> impl FnMut(&EventScheduler<V>) -> bool {
    |_scheduler| false
}
