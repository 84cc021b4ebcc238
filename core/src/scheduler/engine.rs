//! EventScheduler - the main simulation loop
//!
//! Owns the event queue and the logical clock, and drives the simulation by
//! repeatedly firing the earliest pending event:
//!
//! ```text
//! loop:
//! 1. Evaluate the stop condition; return if satisfied
//! 2. Pop the earliest (time, seq) entry; typed error if the queue is empty
//! 3. Advance the clock to the entry's time (never backwards)
//! 4. Fire the event (skip the action if deactivated)
//! 5. Hand the fired record to the observer
//! ```
//!
//! # Determinism
//!
//! Firing order is totally determined by `(time, schedule-call order)`, so the
//! same sequence of `schedule()` calls replays identically. A failing action
//! aborts the run with the queue and clock left exactly as they were at the
//! failure, inspectable for debugging; silent recovery would corrupt the
//! simulated timeline.
//!
//! # Threading
//!
//! Single-threaded and synchronous by design: logical time ordering, not
//! wall-clock concurrency, is the correctness mechanism. There is no internal
//! locking, and blocking I/O inside an action serializes with the whole run.

use serde_json::Value;
use thiserror::Error;

use crate::core::time::SimClock;
use crate::models::event::{ActionError, Event, EventHandle};
use crate::models::trace::FiredEvent;
use crate::scheduler::queue::{EventQueue, QueueEntry};

/// Simulation error types
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The queue ran dry while the stop condition was still unsatisfied.
    #[error("event queue exhausted at time {current_time} before the stop condition was satisfied")]
    EmptyQueue {
        /// Clock value when the queue ran dry
        current_time: f64,
    },

    /// An event or scheduler parameter failed validation.
    #[error("invalid event: {reason}")]
    InvalidEvent { reason: String },

    /// An action failed; wraps the failure with its simulation coordinates.
    #[error("action failed at time {time} (event #{seq}): {source}")]
    ActionFailed {
        /// The failing event's scheduled time
        time: f64,
        /// The failing event's sequence number
        seq: u64,
        #[source]
        source: ActionError,
    },
}

/// Scheduler configuration.
///
/// # Fields
///
/// * `epoch` - Starting value of the logical clock (default 0.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerConfig {
    /// Starting value of the logical clock; must be finite
    pub epoch: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { epoch: 0.0 }
    }
}

/// Discrete-event scheduler: priority-ordered event queue plus logical clock.
///
/// Each simulation run constructs its own scheduler; there is no ambient or
/// global instance. The scheduler exclusively owns its queue, and events hold
/// no back-reference to it.
///
/// # Example
///
/// ```
/// use des_core::{ActionResult, Context, Event, EventScheduler, stop_at_max_time};
/// use serde_json::{json, Value};
/// use std::collections::HashMap;
///
/// let mut scheduler = EventScheduler::new();
///
/// scheduler
///     .schedule(Event::new(
///         1.5,
///         |_context: &mut Context<Value>,
///          _scheduler: &mut EventScheduler|
///          -> ActionResult<Value> { Ok(Some(json!("ping"))) },
///         HashMap::new(),
///     ))
///     .unwrap();
///
/// scheduler.run(stop_at_max_time(1.5)).unwrap();
/// assert_eq!(scheduler.current_time(), 1.5);
/// assert!(scheduler.is_exhausted());
/// ```
pub struct EventScheduler<V: 'static = Value> {
    /// Logical clock; advances only when an event is popped
    clock: SimClock,

    /// All scheduled, not-yet-fired events
    queue: EventQueue<V>,
}

impl<V: 'static> EventScheduler<V> {
    /// Create a scheduler with the clock at 0.0.
    pub fn new() -> Self {
        Self {
            clock: SimClock::default(),
            queue: EventQueue::new(),
        }
    }

    /// Create a scheduler whose clock starts at `epoch`.
    ///
    /// # Errors
    ///
    /// `SimulationError::InvalidEvent` if `epoch` is not finite.
    pub fn with_epoch(epoch: f64) -> Result<Self, SimulationError> {
        Self::from_config(SchedulerConfig { epoch })
    }

    /// Create a scheduler from a validated configuration.
    pub fn from_config(config: SchedulerConfig) -> Result<Self, SimulationError> {
        Self::validate_config(&config)?;
        Ok(Self {
            clock: SimClock::new(config.epoch),
            queue: EventQueue::new(),
        })
    }

    fn validate_config(config: &SchedulerConfig) -> Result<(), SimulationError> {
        if !config.epoch.is_finite() {
            return Err(SimulationError::InvalidEvent {
                reason: format!("epoch must be finite, got {}", config.epoch),
            });
        }
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current logical time. Monotonically non-decreasing.
    pub fn current_time(&self) -> f64 {
        self.clock.now()
    }

    /// The clock's starting value.
    pub fn epoch(&self) -> f64 {
        self.clock.epoch()
    }

    /// Number of scheduled, not-yet-fired events (including deactivated ones).
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty.
    pub fn is_exhausted(&self) -> bool {
        self.queue.is_empty()
    }

    /// Time of the next event to pop, if any.
    pub fn next_event_time(&self) -> Option<f64> {
        self.queue.peek_time()
    }

    // ========================================================================
    // Scheduling
    // ========================================================================

    /// Insert an event into the queue, keyed by `(time, sequence)`.
    ///
    /// May be called before or during a run; an action scheduling a follow-up
    /// with `time <= current_time` is legitimate and fires on a later
    /// iteration at its own literal time, without rewinding the clock.
    ///
    /// Returns a handle sharing the event's activation flag, for O(1)
    /// cancellation after the event has been handed over.
    ///
    /// # Errors
    ///
    /// `SimulationError::InvalidEvent` if the event's time is NaN or infinite.
    pub fn schedule(&mut self, event: Event<V>) -> Result<EventHandle, SimulationError> {
        let time = event.time();
        if !time.is_finite() {
            return Err(SimulationError::InvalidEvent {
                reason: format!("event time must be finite, got {time}"),
            });
        }

        let flag = event.activation_flag();
        let seq = self.queue.push(event);
        Ok(EventHandle::new(time, seq, flag))
    }

    // ========================================================================
    // Run Loop
    // ========================================================================

    /// Fire events in order until `stop` returns true.
    ///
    /// `stop` is evaluated before each pop, receiving the scheduler so
    /// predicates can read the clock and queue. Log entries are discarded;
    /// use [`run_with_observer`](Self::run_with_observer) to collect them.
    ///
    /// # Errors
    ///
    /// * `SimulationError::EmptyQueue` - queue exhausted before `stop` fired
    /// * `SimulationError::ActionFailed` - an action failed; the run aborts
    ///   with clock and queue left at the failure point
    pub fn run<S>(&mut self, stop: S) -> Result<(), SimulationError>
    where
        S: FnMut(&EventScheduler<V>) -> bool,
    {
        self.run_with_observer(stop, |_fired| {})
    }

    /// [`run`](Self::run), handing every fired record to `on_event`.
    ///
    /// The observer sees every pop, including deactivated no-op events, in
    /// firing order. [`Trace::observer`](crate::Trace::observer) plugs in
    /// directly:
    ///
    /// ```
    /// use des_core::{EventScheduler, Trace};
    /// use serde_json::Value;
    ///
    /// let mut scheduler: EventScheduler = EventScheduler::new();
    /// let mut trace: Trace<Value> = Trace::new();
    /// let fired = scheduler.drain_with_observer(trace.observer()).unwrap();
    /// assert_eq!(fired, 0);
    /// ```
    pub fn run_with_observer<S, O>(
        &mut self,
        mut stop: S,
        mut on_event: O,
    ) -> Result<(), SimulationError>
    where
        S: FnMut(&EventScheduler<V>) -> bool,
        O: FnMut(FiredEvent<V>),
    {
        while !stop(self) {
            let entry = self.queue.pop().ok_or(SimulationError::EmptyQueue {
                current_time: self.clock.now(),
            })?;
            let fired = self.fire_entry(entry)?;
            on_event(fired);
        }
        Ok(())
    }

    /// Fire events until the queue is empty, returning how many fired.
    ///
    /// Unlike [`run`](Self::run), an empty queue is the goal here, not an
    /// error.
    pub fn drain(&mut self) -> Result<usize, SimulationError> {
        self.drain_with_observer(|_fired| {})
    }

    /// [`drain`](Self::drain) with an observer for every fired record.
    pub fn drain_with_observer<O>(&mut self, mut on_event: O) -> Result<usize, SimulationError>
    where
        O: FnMut(FiredEvent<V>),
    {
        let mut fired_count = 0;
        while let Some(entry) = self.queue.pop() {
            let fired = self.fire_entry(entry)?;
            on_event(fired);
            fired_count += 1;
        }
        Ok(fired_count)
    }

    /// Advance the clock to the popped entry and fire its event.
    ///
    /// The clock clamps (`max(now, time)`): an already-due event fires at its
    /// own literal time in the record, but never rewinds the clock.
    fn fire_entry(&mut self, entry: QueueEntry<V>) -> Result<FiredEvent<V>, SimulationError> {
        self.clock.advance_to(entry.time);
        let time = entry.time;
        let seq = entry.seq;
        entry
            .event
            .fire(seq, self)
            .map_err(|source| SimulationError::ActionFailed { time, seq, source })
    }
}

impl<V: 'static> Default for EventScheduler<V> {
    fn default() -> Self {
        Self::new()
    }
}
