// SPDX-License-Identifier: MIT

use super::*;

fn sample_breakpoint() -> BreakEvent {
    BreakEvent::new(BreakEventKind::Breakpoint {
        file: "foo.rs".to_string(),
        line: 42,
        column: None,
        condition: None,
        hit_count_filter: None,
        trace_expression: None,
    })
}

#[test]
fn clones_share_identity_and_mutable_state() {
    let bp = sample_breakpoint();
    let clone = bp.clone();

    assert_eq!(bp.id(), clone.id());
    assert_eq!(bp, clone);

    bp.record_hit();
    assert_eq!(clone.hit_count(), 1);
}

#[test]
fn distinct_break_events_have_distinct_ids() {
    let a = sample_breakpoint();
    let b = sample_breakpoint();
    assert_ne!(a.id(), b.id());
    assert_ne!(a, b);
}

#[test]
fn location_string_for_breakpoint_is_file_colon_line() {
    let bp = sample_breakpoint();
    assert_eq!(bp.location_string(), "foo.rs:42");
}

#[test]
fn location_string_for_catchpoint_is_exception_type() {
    let cp = BreakEvent::new(BreakEventKind::Catchpoint {
        exception_type: "System.NullReferenceException".to_string(),
        include_subclasses: true,
    });
    assert_eq!(cp.location_string(), "System.NullReferenceException");
}

#[test]
fn display_status_prefers_explicit_message() {
    let mut info = BreakEventInfo::bound(EngineHandle::new("h1"));
    info.status_message = Some("custom".to_string());
    assert_eq!(info.display_status(), "custom");
}

#[test]
fn display_status_ok_when_valid_and_bound() {
    let info = BreakEventInfo::bound(EngineHandle::new("h1"));
    assert_eq!(info.display_status(), "ok");
}

#[test]
fn display_status_unhit_when_unbound() {
    let info = BreakEventInfo::unbound();
    assert_eq!(info.display_status(), "will not currently be hit");
}

#[test]
fn display_status_unhit_when_invalid() {
    let mut info = BreakEventInfo::bound(EngineHandle::new("h1"));
    info.is_valid = false;
    assert_eq!(info.display_status(), "will not currently be hit");
}

#[test]
fn set_line_overrides_line_and_location_string() {
    let bp = sample_breakpoint();
    bp.set_line(43);
    assert_eq!(bp.line(), Some(43));
    assert_eq!(bp.location_string(), "foo.rs:43");
}

#[test]
fn set_line_is_a_no_op_on_catchpoints() {
    let cp = BreakEvent::new(BreakEventKind::Catchpoint {
        exception_type: "System.NullReferenceException".to_string(),
        include_subclasses: true,
    });
    cp.set_line(7);
    assert_eq!(cp.line(), None);
}

#[test]
fn tag_round_trips_through_downcast() {
    let bp = BreakEvent::with_tag(
        BreakEventKind::Breakpoint {
            file: "foo.rs".to_string(),
            line: 1,
            column: None,
            condition: None,
            hit_count_filter: None,
            trace_expression: None,
        },
        42u32,
    );
    assert_eq!(bp.tag().downcast_ref::<u32>(), Some(&42));
}
