// SPDX-License-Identifier: MIT

use super::*;
use crate::fake::{FakeCall, FakeEngine};
use crate::store::InMemoryBreakpointStore;
use dbg_core::{BreakEventKind, TargetEventKind, ThreadInfo};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex as StdMutex;

fn engine() -> Arc<FakeEngine> {
    Arc::new(FakeEngine::new())
}

fn session(engine: Arc<FakeEngine>) -> Session {
    Session::new(engine, SessionOptions::default(), SessionConfig::default(), None)
}

#[tokio::test]
async fn run_transitions_idle_to_running_and_fires_target_started() {
    let s = session(engine());
    let started = Arc::new(AtomicU32::new(0));
    let c = started.clone();
    s.on_target_started(move || {
        c.fetch_add(1, Ordering::Relaxed);
    });

    s.run(StartInfo::default()).await.unwrap();

    assert_eq!(s.state(), SessionState::Running);
    assert_eq!(started.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn continue_while_idle_is_rejected() {
    let s = session(engine());
    let err = s.continue_().await.unwrap_err();
    assert!(matches!(err, SessionError::InvalidState { .. }));
}

#[tokio::test]
async fn notify_target_event_stop_moves_running_to_stopped() {
    let s = session(engine());
    s.run(StartInfo::default()).await.unwrap();
    assert_eq!(s.state(), SessionState::Running);

    s.callbacks().notify_target_event(TargetEvent::new(TargetEventKind::TargetStopped));
    assert_eq!(s.state(), SessionState::Stopped);
}

#[tokio::test]
async fn notify_target_event_exit_is_terminal() {
    let s = session(engine());
    s.run(StartInfo::default()).await.unwrap();
    s.callbacks().notify_target_event(TargetEvent::new(TargetEventKind::TargetExited));

    assert_eq!(s.state(), SessionState::Exited);
    assert!(s.continue_().await.is_err());
}

#[tokio::test]
async fn get_processes_is_memoized_until_a_target_event_arrives() {
    let e = engine();
    let s = session(e.clone());

    let first = s.get_processes().await.unwrap();
    let second = s.get_processes().await.unwrap();
    assert_eq!(first, second);

    s.callbacks().notify_target_event(TargetEvent::new(TargetEventKind::TargetStopped));
    // Cache invalidated; a fresh call still succeeds (value-equal, since the
    // fake engine returns a stable process list).
    let third = s.get_processes().await.unwrap();
    assert_eq!(third, first);
}

#[tokio::test]
async fn dispose_is_idempotent_and_makes_commands_no_ops() {
    let s = session(engine());
    s.dispose();
    s.dispose();
    assert!(s.is_disposed());
    // Run is a NoOp post-dispose, not an InvalidState error.
    assert!(s.run(StartInfo::default()).await.is_ok());
    assert_eq!(s.state(), SessionState::Idle);
}

#[tokio::test]
async fn bound_break_event_added_before_start_has_no_handle() {
    let s = session(engine());
    let store = InMemoryBreakpointStore::new();
    let be = BreakEvent::new(BreakEventKind::Breakpoint {
        file: "a.rs".to_string(),
        line: 1,
        column: None,
        condition: None,
        hit_count_filter: None,
        trace_expression: None,
    });
    store.add(be.clone());
    s.set_store(Arc::new(store)).await;

    // Adding happens asynchronously via a spawned task reacting to the
    // store listener; give it a tick to run.
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    let info = s.break_event_info(&be).unwrap();
    assert!(info.handle.is_none());
}

#[tokio::test]
async fn engine_failure_during_continue_forces_stopped_and_invokes_handler() {
    let e = engine();
    let seen = Arc::new(AtomicU32::new(0));
    let c = seen.clone();
    let s = Session::new(
        e.clone(),
        SessionOptions::default(),
        SessionConfig::default().exception_handler(move |_| {
            c.fetch_add(1, Ordering::Relaxed);
        }),
        None,
    );
    s.run(StartInfo::default()).await.unwrap();
    s.callbacks().notify_target_event(TargetEvent::new(TargetEventKind::TargetStopped));
    e.fail_next_continue();

    s.continue_().await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    assert_eq!(seen.load(Ordering::Relaxed), 1);
    assert_eq!(s.state(), SessionState::Stopped);
}

#[tokio::test]
async fn is_read_only_reflects_engine_setting() {
    let e = engine();
    let s = session(e.clone());
    assert!(!s.is_read_only());
    e.set_allow_break_event_changes(false);
    assert!(s.is_read_only());
}

#[tokio::test]
async fn notify_break_event_relocated_mutates_the_line_without_a_reentrant_update() {
    let e = engine();
    let store = Arc::new(InMemoryBreakpointStore::new());
    let s = Session::new(e.clone(), SessionOptions::default(), SessionConfig::default(), Some(store.clone()));
    s.run(StartInfo::default()).await.unwrap();

    let be = BreakEvent::new(BreakEventKind::Breakpoint {
        file: "a.rs".to_string(),
        line: 10,
        column: None,
        condition: None,
        hit_count_filter: None,
        trace_expression: None,
    });
    store.add(be.clone());
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let handle = s.break_event_info(&be).and_then(|i| i.handle).expect("breakpoint should be bound");

    s.callbacks().notify_break_event_relocated(&handle, 43);
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    assert_eq!(be.line(), Some(43));
    let updates = e.calls().iter().filter(|c| matches!(c, FakeCall::Update(..))).count();
    assert_eq!(updates, 0, "an engine-driven relocation must not echo back through the store as an update");
}

#[tokio::test]
async fn notify_break_event_relocated_is_a_no_op_for_an_unknown_handle() {
    let e = engine();
    let s = session(e.clone());
    s.run(StartInfo::default()).await.unwrap();

    s.callbacks().notify_break_event_relocated(&EngineHandle::new("no-such-handle"), 5);
    // No panic, no engine call: simply nothing to relocate.
    assert!(e.calls().iter().all(|c| !matches!(c, FakeCall::Update(..))));
}

#[tokio::test]
async fn notify_started_delivers_a_target_ready_event_carrying_the_thread() {
    let s = session(engine());
    let seen: Arc<StdMutex<Option<TargetEvent>>> = Arc::new(StdMutex::new(None));
    let c = seen.clone();
    s.on_any_target_event(move |event| {
        *c.lock().unwrap() = Some(event.clone());
    });

    s.callbacks().notify_started(Some(ThreadInfo { pid: 1, tid: 7, name: Some("main".to_string()) }));

    let event = seen.lock().unwrap().clone().expect("notify_started should fire an event");
    assert_eq!(event.kind(), TargetEventKind::TargetReady);
    assert_eq!(event.thread.map(|t| t.tid), Some(7));
}

#[tokio::test]
async fn notify_started_with_no_thread_still_fires_target_ready() {
    let s = session(engine());
    let seen: Arc<StdMutex<Option<TargetEvent>>> = Arc::new(StdMutex::new(None));
    let c = seen.clone();
    s.on_any_target_event(move |event| {
        *c.lock().unwrap() = Some(event.clone());
    });

    s.callbacks().notify_started(None);

    let event = seen.lock().unwrap().clone().expect("notify_started should fire an event");
    assert_eq!(event.kind(), TargetEventKind::TargetReady);
    assert!(event.thread.is_none());
}

#[tokio::test]
async fn get_processes_result_is_attached_to_the_live_session() {
    let s = session(engine());
    let processes = s.get_processes().await.unwrap();
    assert!(processes.session().is_some());
    assert_eq!(processes.len(), 1);
}

#[tokio::test]
async fn attached_session_back_reference_does_not_outlive_the_session() {
    let s = session(engine());
    let processes = s.get_processes().await.unwrap();
    drop(s);
    assert!(processes.session().is_none());
}
