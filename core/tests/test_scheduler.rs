//! Integration tests for the EventScheduler run loop
//!
//! Covers ordering, tie-breaking, cancellation, stop conditions, re-entrant
//! scheduling, and failure semantics.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::{json, Value};

use des_core::{
    stop_at_max_time, stop_never, ActionResult, Context, Event, EventScheduler, SimulationError,
};

type SharedLog = Rc<RefCell<Vec<String>>>;

/// Action that appends `tag` to a shared log when it fires.
fn tag_action(
    log: SharedLog,
    tag: &'static str,
) -> impl FnMut(&mut Context<Value>, &mut EventScheduler<Value>) -> ActionResult<Value> {
    move |_context, _scheduler| {
        log.borrow_mut().push(tag.to_string());
        Ok(None)
    }
}

fn noop() -> impl FnMut(&mut Context<Value>, &mut EventScheduler<Value>) -> ActionResult<Value> {
    |_context, _scheduler| Ok(None)
}

#[test]
fn test_fifo_tie_break_scenario() {
    // Schedule [A@5, B@2, C@2]; stop once the clock reaches 5.
    // Time 2 fires B then C in scheduling order, then time 5 fires A.
    let log: SharedLog = Rc::new(RefCell::new(Vec::new()));
    let mut scheduler = EventScheduler::new();

    scheduler
        .schedule(Event::new(5.0, tag_action(log.clone(), "A"), HashMap::new()))
        .unwrap();
    scheduler
        .schedule(Event::new(2.0, tag_action(log.clone(), "B"), HashMap::new()))
        .unwrap();
    scheduler
        .schedule(Event::new(2.0, tag_action(log.clone(), "C"), HashMap::new()))
        .unwrap();

    scheduler.run(stop_at_max_time(5.0)).unwrap();

    assert_eq!(*log.borrow(), vec!["B", "C", "A"]);
    assert_eq!(scheduler.current_time(), 5.0);
}

#[test]
fn test_stop_leaves_later_events_queued() {
    let log: SharedLog = Rc::new(RefCell::new(Vec::new()));
    let mut scheduler = EventScheduler::new();

    scheduler
        .schedule(Event::new(5.0, tag_action(log.clone(), "A"), HashMap::new()))
        .unwrap();
    scheduler
        .schedule(Event::new(7.0, tag_action(log.clone(), "D"), HashMap::new()))
        .unwrap();

    scheduler.run(stop_at_max_time(5.0)).unwrap();

    // D remains queued; the stop condition fired before it was popped.
    assert_eq!(*log.borrow(), vec!["A"]);
    assert_eq!(scheduler.pending_events(), 1);
    assert_eq!(scheduler.next_event_time(), Some(7.0));
}

#[test]
fn test_deactivated_event_advances_clock_without_firing() {
    let log: SharedLog = Rc::new(RefCell::new(Vec::new()));
    let mut scheduler = EventScheduler::new();

    let handle = scheduler
        .schedule(Event::new(
            10.0,
            tag_action(log.clone(), "never"),
            HashMap::new(),
        ))
        .unwrap();
    handle.deactivate();

    scheduler.run(stop_at_max_time(10.0)).unwrap();

    assert!(log.borrow().is_empty());
    assert_eq!(scheduler.current_time(), 10.0);
    assert!(scheduler.is_exhausted());
}

#[test]
fn test_reactivated_event_fires() {
    let log: SharedLog = Rc::new(RefCell::new(Vec::new()));
    let mut scheduler = EventScheduler::new();

    let handle = scheduler
        .schedule(Event::new(3.0, tag_action(log.clone(), "X"), HashMap::new()))
        .unwrap();
    handle.deactivate();
    handle.activate();

    scheduler.run(stop_at_max_time(3.0)).unwrap();
    assert_eq!(*log.borrow(), vec!["X"]);
}

#[test]
fn test_handle_deactivate_is_idempotent() {
    let mut scheduler: EventScheduler = EventScheduler::new();
    let handle = scheduler
        .schedule(Event::new(1.0, noop(), HashMap::new()))
        .unwrap();

    handle.deactivate();
    handle.deactivate();
    assert!(!handle.is_active());

    handle.activate();
    handle.activate();
    assert!(handle.is_active());
}

#[test]
fn test_empty_queue_raises_typed_error() {
    let mut scheduler: EventScheduler = EventScheduler::new();

    let err = scheduler.run(stop_never()).unwrap_err();
    match err {
        SimulationError::EmptyQueue { current_time } => assert_eq!(current_time, 0.0),
        other => panic!("expected EmptyQueue, got {other:?}"),
    }
}

#[test]
fn test_exhaustion_mid_run_raises() {
    let mut scheduler: EventScheduler = EventScheduler::new();
    scheduler
        .schedule(Event::new(4.0, noop(), HashMap::new()))
        .unwrap();

    let err = scheduler.run(stop_never()).unwrap_err();
    match err {
        SimulationError::EmptyQueue { current_time } => assert_eq!(current_time, 4.0),
        other => panic!("expected EmptyQueue, got {other:?}"),
    }
}

#[test]
fn test_non_finite_time_rejected_at_schedule() {
    let mut scheduler: EventScheduler = EventScheduler::new();

    for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let result = scheduler.schedule(Event::new(bad, noop(), HashMap::new()));
        assert!(matches!(
            result,
            Err(SimulationError::InvalidEvent { .. })
        ));
    }
    assert_eq!(scheduler.pending_events(), 0);
}

#[test]
fn test_reentrant_scheduling_chained_timer() {
    // Each firing schedules the next, one time unit later.
    fn chain(
        log: SharedLog,
        remaining: u32,
    ) -> impl FnMut(&mut Context<Value>, &mut EventScheduler<Value>) -> ActionResult<Value> {
        move |_context, scheduler| {
            log.borrow_mut().push(format!("t{}", scheduler.current_time()));
            if remaining > 0 {
                scheduler.schedule(Event::new(
                    scheduler.current_time() + 1.0,
                    chain(log.clone(), remaining - 1),
                    HashMap::new(),
                ))?;
            }
            Ok(None)
        }
    }

    let log: SharedLog = Rc::new(RefCell::new(Vec::new()));
    let mut scheduler = EventScheduler::new();
    scheduler
        .schedule(Event::new(0.0, chain(log.clone(), 3), HashMap::new()))
        .unwrap();

    scheduler.run(stop_at_max_time(3.0)).unwrap();

    assert_eq!(*log.borrow(), vec!["t0", "t1", "t2", "t3"]);
}

#[test]
fn test_same_tick_follow_up_fires_in_same_run() {
    // An action scheduling a follow-up at the current time must see it fire
    // later in the same run, not skipped.
    let log: SharedLog = Rc::new(RefCell::new(Vec::new()));
    let mut scheduler = EventScheduler::new();

    let follow_log = log.clone();
    let spawner = move |_context: &mut Context<Value>,
                        scheduler: &mut EventScheduler<Value>|
          -> ActionResult<Value> {
        follow_log.borrow_mut().push("parent".to_string());
        scheduler.schedule(Event::new(
            scheduler.current_time(),
            tag_action(follow_log.clone(), "child"),
            HashMap::new(),
        ))?;
        Ok(None)
    };

    scheduler
        .schedule(Event::new(2.0, spawner, HashMap::new()))
        .unwrap();

    // Stop only once both events at t=2 have fired.
    scheduler
        .run(|s: &EventScheduler<Value>| s.current_time() >= 2.0 && s.is_exhausted())
        .unwrap();

    assert_eq!(*log.borrow(), vec!["parent", "child"]);
    assert_eq!(scheduler.current_time(), 2.0);
}

#[test]
fn test_past_time_event_never_rewinds_clock() {
    let mut scheduler: EventScheduler = EventScheduler::new();

    scheduler
        .schedule(Event::new(5.0, noop(), HashMap::new()))
        .unwrap();
    // Scheduled "in the past" relative to where the clock will be.
    scheduler
        .schedule(Event::new(1.0, noop(), HashMap::new()))
        .unwrap();

    let mut observed = Vec::new();
    scheduler
        .run_with_observer(stop_at_max_time(5.0), |fired| observed.push(fired.time))
        .unwrap();
    assert_eq!(observed, vec![1.0, 5.0]);

    // A late insertion before "now" fires without moving the clock backwards.
    scheduler
        .schedule(Event::new(2.0, noop(), HashMap::new()))
        .unwrap();
    let mut late = Vec::new();
    scheduler
        .drain_with_observer(|fired| late.push(fired.time))
        .unwrap();

    assert_eq!(late, vec![2.0]); // record keeps the literal time
    assert_eq!(scheduler.current_time(), 5.0); // clock did not regress
}

#[test]
fn test_failing_action_aborts_and_preserves_state() {
    let mut scheduler: EventScheduler = EventScheduler::new();

    let failing = |_context: &mut Context<Value>,
                   _scheduler: &mut EventScheduler<Value>|
     -> ActionResult<Value> { Err("downstream refused the payload".into()) };

    scheduler
        .schedule(Event::new(1.0, failing, HashMap::new()))
        .unwrap();
    scheduler
        .schedule(Event::new(2.0, noop(), HashMap::new()))
        .unwrap();

    let err = scheduler.run(stop_never()).unwrap_err();
    match err {
        SimulationError::ActionFailed { time, seq, .. } => {
            assert_eq!(time, 1.0);
            assert_eq!(seq, 0);
        }
        other => panic!("expected ActionFailed, got {other:?}"),
    }

    // Clock and queue are inspectable at the failure point.
    assert_eq!(scheduler.current_time(), 1.0);
    assert_eq!(scheduler.pending_events(), 1);
}

#[test]
fn test_time_monotonicity_across_pops() {
    let mut scheduler: EventScheduler = EventScheduler::new();
    for time in [9.0, 1.0, 4.0, 4.0, 0.5, 7.25] {
        scheduler
            .schedule(Event::new(time, noop(), HashMap::new()))
            .unwrap();
    }

    let mut clocks = Vec::new();
    scheduler
        .run_with_observer(stop_never(), |fired| clocks.push(fired.time))
        .unwrap_err(); // drains then reports EmptyQueue

    assert!(clocks.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(clocks.len(), 6);
}

#[test]
fn test_context_carries_parameters_and_results() {
    let mut scheduler = EventScheduler::new();

    let mut context = HashMap::new();
    context.insert("amount".to_string(), json!(250));

    let doubler = |context: &mut Context<Value>,
                   _scheduler: &mut EventScheduler<Value>|
     -> ActionResult<Value> {
        let amount = context["amount"].as_i64().unwrap_or(0);
        context.insert("doubled".to_string(), json!(amount * 2));
        Ok(Some(json!({ "doubled": amount * 2 })))
    };

    scheduler
        .schedule(Event::new(1.0, doubler, context))
        .unwrap();

    let mut records = Vec::new();
    scheduler
        .drain_with_observer(|fired| records.push(fired))
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].log_entry, Some(json!({ "doubled": 500 })));
    assert_eq!(records[0].context["doubled"], json!(500));
}
