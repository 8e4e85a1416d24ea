// SPDX-License-Identifier: MIT

//! The break-event data model: breakpoints and catchpoints as seen by the
//! user-facing store, plus the opaque engine handle that binds one to a
//! live backend slot.

use parking_lot::Mutex;
use std::any::Any;
use std::sync::Arc;

use crate::define_id;

define_id! {
    /// Stable key used by the break-event registry to track a [`BreakEvent`]
    /// across engine rebinds. Assigned once, at construction, never reused.
    pub struct BreakEventId("be-");
}

/// Opaque, backend-assigned identifier for an installed break event.
///
/// Implementations may stuff an integer, a pointer-derived token, or a
/// composite string into this; equality and hashing are purely structural
/// over whatever the backend chose to put in here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EngineHandle(pub String);

impl EngineHandle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl std::fmt::Display for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A hit-count filter, e.g. "break every Nth hit" or "break after N hits".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitCountMode {
    GreaterOrEqual(u32),
    EqualTo(u32),
    MultipleOf(u32),
}

/// The kind-specific payload of a [`BreakEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakEventKind {
    Breakpoint {
        file: String,
        line: u32,
        column: Option<u32>,
        condition: Option<String>,
        hit_count_filter: Option<HitCountMode>,
        trace_expression: Option<String>,
    },
    Catchpoint {
        exception_type: String,
        include_subclasses: bool,
    },
}

/// Mutable fields updated by the session as the target runs.
#[derive(Debug, Clone, Default)]
struct BreakEventMut {
    enabled: bool,
    hit_count: u32,
    last_trace_value: Option<String>,
    /// Engine-driven relocation of a breakpoint's line, e.g. after a hot
    /// edit remaps code. `None` until the engine first relocates it; the
    /// original line from `kind` stays the one last agreed with the store.
    line_override: Option<u32>,
}

/// A user-visible breakpoint or catchpoint, owned by the external
/// [`crate::store::BreakpointStore`](../session crate) but referenced by the
/// session's registry.
///
/// Identity is by reference: cloning a `BreakEvent` clones the `Arc`, not the
/// entity, so two clones observe the same mutable state and compare equal
/// under [`BreakEvent::id`].
#[derive(Clone)]
pub struct BreakEvent {
    id: BreakEventId,
    kind: Arc<BreakEventKind>,
    state: Arc<Mutex<BreakEventMut>>,
    tag: Arc<dyn Any + Send + Sync>,
}

impl BreakEvent {
    pub fn new(kind: BreakEventKind) -> Self {
        Self::with_tag(kind, ())
    }

    pub fn with_tag<T: Any + Send + Sync>(kind: BreakEventKind, tag: T) -> Self {
        Self {
            id: BreakEventId::new(),
            kind: Arc::new(kind),
            state: Arc::new(Mutex::new(BreakEventMut { enabled: true, ..Default::default() })),
            tag: Arc::new(tag),
        }
    }

    pub fn id(&self) -> BreakEventId {
        self.id
    }

    pub fn kind(&self) -> &BreakEventKind {
        &self.kind
    }

    pub fn tag(&self) -> &(dyn Any + Send + Sync) {
        &*self.tag
    }

    pub fn enabled(&self) -> bool {
        self.state.lock().enabled
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.state.lock().enabled = enabled;
    }

    pub fn hit_count(&self) -> u32 {
        self.state.lock().hit_count
    }

    pub fn record_hit(&self) {
        self.state.lock().hit_count += 1;
    }

    pub fn last_trace_value(&self) -> Option<String> {
        self.state.lock().last_trace_value.clone()
    }

    pub fn set_last_trace_value(&self, value: impl Into<String>) {
        self.state.lock().last_trace_value = Some(value.into());
    }

    /// File path for breakpoints; `None` for catchpoints.
    pub fn file(&self) -> Option<&str> {
        match &*self.kind {
            BreakEventKind::Breakpoint { file, .. } => Some(file),
            BreakEventKind::Catchpoint { .. } => None,
        }
    }

    pub fn line(&self) -> Option<u32> {
        match &*self.kind {
            BreakEventKind::Breakpoint { line, .. } => {
                Some(self.state.lock().line_override.unwrap_or(*line))
            }
            BreakEventKind::Catchpoint { .. } => None,
        }
    }

    /// Relocate a breakpoint's line, as reported by the engine (e.g. a hot
    /// edit remapped the underlying code). A no-op on catchpoints.
    pub fn set_line(&self, new_line: u32) {
        if matches!(&*self.kind, BreakEventKind::Breakpoint { .. }) {
            self.state.lock().line_override = Some(new_line);
        }
    }

    /// Human-readable `file:line` used in log lines, falls back to the
    /// exception type name for catchpoints.
    pub fn location_string(&self) -> String {
        match &*self.kind {
            BreakEventKind::Breakpoint { file, .. } => {
                format!("{file}:{}", self.line().unwrap_or_default())
            }
            BreakEventKind::Catchpoint { exception_type, .. } => exception_type.clone(),
        }
    }
}

impl std::fmt::Debug for BreakEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BreakEvent")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("enabled", &self.enabled())
            .finish()
    }
}

impl PartialEq for BreakEvent {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for BreakEvent {}

impl std::hash::Hash for BreakEvent {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Session-private bookkeeping for a registered [`BreakEvent`].
///
/// Invariant: if `is_valid` is false or `handle` is `None`, the displayed
/// status is "will not currently be hit" unless `status_message` overrides
/// it. See [`BreakEventInfo::display_status`].
#[derive(Debug, Clone, Default)]
pub struct BreakEventInfo {
    pub handle: Option<EngineHandle>,
    pub is_valid: bool,
    pub status_message: Option<String>,
}

impl BreakEventInfo {
    pub fn unbound() -> Self {
        Self { handle: None, is_valid: true, status_message: None }
    }

    pub fn bound(handle: EngineHandle) -> Self {
        Self { handle: Some(handle), is_valid: true, status_message: None }
    }

    pub fn display_status(&self) -> &str {
        if let Some(msg) = &self.status_message {
            msg
        } else if self.is_valid && self.handle.is_some() {
            "ok"
        } else {
            "will not currently be hit"
        }
    }
}

#[cfg(test)]
#[path = "breakpoint_tests.rs"]
mod tests;
