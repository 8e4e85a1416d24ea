// SPDX-License-Identifier: MIT

use super::*;
use crate::fake::FakeEngine;
use crate::store::InMemoryBreakpointStore;
use dbg_core::BreakEventKind;

fn bp(file: &str, line: u32) -> BreakEvent {
    BreakEvent::new(BreakEventKind::Breakpoint {
        file: file.to_string(),
        line,
        column: None,
        condition: None,
        hit_count_filter: None,
        trace_expression: None,
    })
}

#[tokio::test]
async fn add_before_start_records_unbound() {
    let registry = BreakEventRegistry::new();
    let be = bp("a.rs", 1);

    registry.add(&be, false, &FakeEngine::new()).await.unwrap();

    let info = registry.info_of(&be).unwrap();
    assert!(info.handle.is_none());
    assert_eq!(info.display_status(), "will not currently be hit");
}

#[tokio::test]
async fn add_after_start_binds_a_handle() {
    let registry = BreakEventRegistry::new();
    let engine = FakeEngine::new();
    let be = bp("a.rs", 1);

    registry.add(&be, true, &engine).await.unwrap();

    let info = registry.info_of(&be).unwrap();
    assert!(info.handle.is_some());
    assert_eq!(info.display_status(), "ok");
}

#[tokio::test]
async fn insert_failure_records_null_handle_and_message() {
    let registry = BreakEventRegistry::new();
    let engine = FakeEngine::new();
    let be = bp("foo.cs", 42);
    engine.fail_next_insert_at(be.location_string());

    let result = registry.add(&be, true, &engine).await;

    assert!(result.is_err());
    let info = registry.info_of(&be).unwrap();
    assert!(info.handle.is_none());
    assert!(info.is_valid);
    assert!(info.status_message.as_deref().unwrap().contains("Could not set breakpoint at location 'foo.cs:42'"));
}

#[tokio::test]
async fn insert_then_remove_leaves_registry_empty_and_nets_zero_handles() {
    let registry = BreakEventRegistry::new();
    let engine = FakeEngine::new();
    let be = bp("a.rs", 1);

    registry.add(&be, true, &engine).await.unwrap();
    registry.remove(&be, &engine).await;

    assert!(registry.is_empty());
    let inserts = engine.calls().iter().filter(|c| matches!(c, crate::fake::FakeCall::Insert(_))).count();
    let removes = engine.calls().iter().filter(|c| matches!(c, crate::fake::FakeCall::Remove(_))).count();
    assert_eq!(inserts, removes);
}

#[tokio::test]
async fn disable_then_enable_produces_two_enable_calls_and_no_insert_or_remove() {
    let registry = BreakEventRegistry::new();
    let engine = FakeEngine::new();
    let be = bp("a.rs", 1);
    registry.add(&be, true, &engine).await.unwrap();

    registry.update_enabled(&be, false, &engine).await;
    registry.update_enabled(&be, true, &engine).await;

    let enables = engine.calls().iter().filter(|c| matches!(c, crate::fake::FakeCall::Enable(..))).count();
    assert_eq!(enables, 2);
    let inserts = engine.calls().iter().filter(|c| matches!(c, crate::fake::FakeCall::Insert(_))).count();
    assert_eq!(inserts, 1);
}

#[tokio::test]
async fn source_reload_retries_insert_on_load_after_register_with_null_handle() {
    let registry = BreakEventRegistry::new();
    let engine = FakeEngine::new();
    let be = bp("/abs/foo.cs", 10);
    engine.fail_next_insert_at(be.location_string());

    registry.add(&be, true, &engine).await.unwrap_err();
    assert!(registry.info_of(&be).unwrap().handle.is_none());

    registry.source_file_loaded("/abs/foo.cs", PathCasePolicy::CaseSensitive, &engine).await;

    let info = registry.info_of(&be).unwrap();
    assert!(info.handle.is_some());
}

#[tokio::test]
async fn source_unload_then_reload_yields_null_then_fresh_handle() {
    let registry = BreakEventRegistry::new();
    let engine = FakeEngine::new();
    let be = bp("/abs/foo.cs", 10);
    registry.add(&be, true, &engine).await.unwrap();
    let bound_handle = registry.info_of(&be).unwrap().handle.unwrap();

    registry.source_file_unloaded("/abs/foo.cs", PathCasePolicy::CaseSensitive);
    assert!(registry.info_of(&be).unwrap().handle.is_none());

    registry.source_file_loaded("/abs/foo.cs", PathCasePolicy::CaseSensitive, &engine).await;
    let new_handle = registry.info_of(&be).unwrap().handle.unwrap();
    assert_ne!(bound_handle, new_handle);
}

#[tokio::test]
async fn clear_issues_one_remove_per_bound_break_event() {
    let registry = BreakEventRegistry::new();
    let engine = FakeEngine::new();
    let a = bp("a.rs", 1);
    let b = bp("b.rs", 2);
    registry.add(&a, true, &engine).await.unwrap();
    registry.add(&b, true, &engine).await.unwrap();

    registry.clear(&engine).await;

    let removes = engine.calls().iter().filter(|c| matches!(c, crate::fake::FakeCall::Remove(_))).count();
    assert_eq!(removes, 2);
    assert!(registry.is_empty());
}

#[tokio::test]
async fn set_status_fires_only_on_actual_change() {
    let registry = BreakEventRegistry::new();
    let engine = FakeEngine::new();
    let be = bp("a.rs", 1);
    registry.add(&be, true, &engine).await.unwrap();

    let fired = std::sync::Arc::new(std::sync::atomic::AtomicU32::new(0));
    let f = fired.clone();
    registry.on_status_changed(move |_, _| {
        f.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    });

    registry.set_status(&be, false, Some("bad line".to_string()));
    registry.set_status(&be, false, Some("bad line".to_string()));

    assert_eq!(fired.load(std::sync::atomic::Ordering::Relaxed), 1);
}

#[tokio::test]
async fn adjust_location_mutates_the_line_and_notifies_the_store_while_adjusting() {
    let registry = BreakEventRegistry::new();
    let engine = FakeEngine::new();
    let be = bp("a.rs", 1);
    registry.add(&be, true, &engine).await.unwrap();

    let store = InMemoryBreakpointStore::new();
    store.add(be.clone());

    assert!(!registry.is_adjusting());
    registry.adjust_location(&be, 42, &store);
    assert!(!registry.is_adjusting(), "the flag must be cleared again once adjust_location returns");

    assert_eq!(be.line(), Some(42));
}

#[test]
fn begin_and_end_adjusting_toggle_is_adjusting() {
    let registry = BreakEventRegistry::new();
    assert!(!registry.is_adjusting());
    registry.begin_adjusting();
    assert!(registry.is_adjusting());
    registry.end_adjusting();
    assert!(!registry.is_adjusting());
}
