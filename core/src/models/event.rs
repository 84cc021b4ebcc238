//! Event model
//!
//! An [`Event`] is one unit of scheduled work:
//! - a firing `time` (immutable once constructed),
//! - an [`Action`] invoked when the scheduler pops the event,
//! - a private `context` map the action may mutate freely,
//! - an activation flag for O(1) cancellation.
//!
//! # Activation and cancellation
//!
//! Scheduling moves the event into the scheduler's queue, so the caller
//! cannot touch the event itself afterwards. [`EventScheduler::schedule`]
//! therefore returns an [`EventHandle`] sharing the event's activation flag:
//! deactivating through the handle cancels the event without the O(n) cost of
//! removing it from the heap. The entry stays queued and is popped as a no-op
//! (the clock still advances to its time; the action is never invoked).
//!
//! # Re-entrant scheduling
//!
//! Actions receive `&mut EventScheduler` alongside their context, so an event
//! can schedule follow-up events during the run. This is the mechanism for
//! periodic timers and chained workflows. The scheduler can hand itself out
//! because the firing event has already been detached from the queue.
//!
//! [`EventScheduler::schedule`]: crate::EventScheduler::schedule

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::models::trace::FiredEvent;
use crate::scheduler::engine::EventScheduler;

/// Per-event mutable context: string keys to caller-defined values.
pub type Context<V> = HashMap<String, V>;

/// Error produced by a failing action.
///
/// Boxed so callers can surface any error type; the scheduler wraps it with
/// the simulation time and sequence number at the point of failure.
pub type ActionError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// What an action returns: an optional log entry, or a failure.
pub type ActionResult<V> = Result<Option<V>, ActionError>;

/// Strategy interface for event actions.
///
/// Blanket-implemented for closures, so most callers never implement this
/// directly:
///
/// ```
/// use des_core::{ActionResult, Context, EventScheduler};
/// use serde_json::Value;
///
/// let action = |_context: &mut Context<Value>,
///               _scheduler: &mut EventScheduler|
///  -> ActionResult<Value> { Ok(None) };
/// # let _ = des_core::Event::new(0.0, action, Default::default());
/// ```
pub trait Action<V: 'static> {
    /// Execute the action.
    ///
    /// May mutate `context`, schedule follow-up events on `scheduler`, and
    /// return an optional log entry for observers.
    fn call(
        &mut self,
        context: &mut Context<V>,
        scheduler: &mut EventScheduler<V>,
    ) -> ActionResult<V>;
}

impl<V: 'static, F> Action<V> for F
where
    F: FnMut(&mut Context<V>, &mut EventScheduler<V>) -> ActionResult<V>,
{
    fn call(
        &mut self,
        context: &mut Context<V>,
        scheduler: &mut EventScheduler<V>,
    ) -> ActionResult<V> {
        self(context, scheduler)
    }
}

/// One unit of scheduled work.
///
/// Generic over the context/log value type `V`; defaults to
/// [`serde_json::Value`] so heterogeneous payloads work out of the box while
/// typed simulations can pin `V` to a domain type and catch shape mismatches
/// at compile time.
///
/// # Example
/// ```
/// use des_core::{ActionResult, Context, Event, EventScheduler};
/// use serde_json::{json, Value};
/// use std::collections::HashMap;
///
/// let mut context = HashMap::new();
/// context.insert("count".to_string(), json!(0));
///
/// let event = Event::new(
///     4.0,
///     |context: &mut Context<Value>, _scheduler: &mut EventScheduler| -> ActionResult<Value> {
///         context.insert("count".to_string(), json!(1));
///         Ok(None)
///     },
///     context,
/// );
///
/// assert_eq!(event.time(), 4.0);
/// assert!(event.is_active());
/// ```
pub struct Event<V: 'static = Value> {
    /// Simulation time at which the event is eligible to fire
    time: f64,

    /// Work to perform when the event fires
    action: Box<dyn Action<V>>,

    /// Mutable state private to this event
    context: Context<V>,

    /// Activation flag, shared with the handle returned by `schedule()`
    active: Rc<Cell<bool>>,
}

impl<V: 'static> Event<V> {
    /// Construct an event.
    ///
    /// No validation happens here; a negative `time` is legitimate (signed
    /// timelines are supported) and finiteness is checked at `schedule()`.
    /// Events are created active.
    pub fn new<A>(time: f64, action: A, context: Context<V>) -> Self
    where
        A: Action<V> + 'static,
    {
        Self {
            time,
            action: Box::new(action),
            context,
            active: Rc::new(Cell::new(true)),
        }
    }

    /// The time at which this event fires. Immutable after construction.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Whether the action will run when the event is popped.
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Mark the event active. Idempotent.
    pub fn activate(&self) {
        self.active.set(true);
    }

    /// Mark the event inactive so its action is skipped when popped. Idempotent.
    pub fn deactivate(&self) {
        self.active.set(false);
    }

    /// Read access to the event's context.
    pub fn context(&self) -> &Context<V> {
        &self.context
    }

    /// Mutable access to the event's context (before scheduling).
    pub fn context_mut(&mut self) -> &mut Context<V> {
        &mut self.context
    }

    /// Shared activation flag, used by `schedule()` to build the handle.
    pub(crate) fn activation_flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.active)
    }

    /// Fire the event: invoke the action if active, skip it otherwise.
    ///
    /// Consumes the event, so firing is single-use by construction. Called
    /// exactly once, by the owning scheduler, after the entry has been popped
    /// from the queue.
    pub(crate) fn fire(
        mut self,
        seq: u64,
        scheduler: &mut EventScheduler<V>,
    ) -> Result<FiredEvent<V>, ActionError> {
        let log_entry = if self.active.get() {
            self.action.call(&mut self.context, scheduler)?
        } else {
            None
        };

        Ok(FiredEvent {
            time: self.time,
            seq,
            log_entry,
            context: self.context,
        })
    }
}

impl<V: 'static + fmt::Debug> fmt::Debug for Event<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("time", &self.time)
            .field("active", &self.active.get())
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

/// Cancellation handle for a scheduled event.
///
/// Returned by `schedule()`. Shares the event's activation flag, so
/// deactivating through the handle cancels the queued event in O(1).
///
/// `Rc`-based on purpose: the scheduler is single-threaded by design, and the
/// non-`Send` handle keeps it that way.
#[derive(Debug, Clone)]
pub struct EventHandle {
    time: f64,
    seq: u64,
    active: Rc<Cell<bool>>,
}

impl EventHandle {
    pub(crate) fn new(time: f64, seq: u64, active: Rc<Cell<bool>>) -> Self {
        Self { time, seq, active }
    }

    /// The scheduled firing time of the underlying event.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// The sequence number assigned at `schedule()` time (FIFO tie-break key).
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Whether the event will run its action when popped.
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Re-arm the event. Idempotent; only meaningful before the event pops.
    pub fn activate(&self) {
        self.active.set(true);
    }

    /// Cancel the event without removing it from the queue. Idempotent.
    pub fn deactivate(&self) {
        self.active.set(false);
    }
}
