// SPDX-License-Identifier: MIT

//! The break-event store: an external, potentially shared collaborator the
//! session subscribes to. User edits (add/remove/modify/enable) flow in as
//! [`StoreListener`] callbacks; the session answers `checking_read_only`
//! queries raised by a UI timer without ever blocking it.

use dbg_core::BreakEvent;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub type ListenerId = u64;

/// Callbacks the session (or any other observer) registers with a
/// [`BreakpointStore`].
pub trait StoreListener: Send + Sync {
    fn on_break_event_added(&self, be: &BreakEvent);
    fn on_break_event_removed(&self, be: &BreakEvent);
    fn on_break_event_modified(&self, be: &BreakEvent);
    fn on_break_event_enable_changed(&self, be: &BreakEvent);

    /// The store is asking whether break-event edits are currently allowed.
    /// `respond` must be invoked synchronously, exactly once, before this
    /// call returns — callers (e.g. a UI timer) depend on not blocking.
    fn checking_read_only(&self, respond: &mut dyn FnMut(bool));
}

/// An externally-owned registry of user break-events.
///
/// The session does not persist break events; this trait is the seam the
/// owning UI/store implementation plugs into.
pub trait BreakpointStore: Send + Sync {
    fn break_events(&self) -> Vec<BreakEvent>;
    fn subscribe(&self, listener: Arc<dyn StoreListener>) -> ListenerId;
    fn unsubscribe(&self, id: ListenerId);

    /// Engine-initiated status pushback (validity, message). Stores that
    /// don't display break-event status may ignore this.
    fn notify_status_changed(&self, _be: &BreakEvent) {}

    /// Session-initiated modification pushback, currently used only for
    /// engine-driven line relocation (`BreakEventRegistry::adjust_location`).
    /// Stores that display breakpoint details should refresh from `be`.
    fn notify_modified(&self, _be: &BreakEvent) {}
}

/// A minimal in-memory [`BreakpointStore`], used as the session's
/// auto-created store and by the demo harness. Not a persistence layer —
/// per the Non-goals, breakpoints never survive process restart.
#[derive(Default)]
pub struct InMemoryBreakpointStore {
    events: Mutex<Vec<BreakEvent>>,
    listeners: Mutex<HashMap<ListenerId, Arc<dyn StoreListener>>>,
    next_id: AtomicU64,
}

impl InMemoryBreakpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, be: BreakEvent) {
        self.events.lock().push(be.clone());
        for listener in self.listeners.lock().values() {
            listener.on_break_event_added(&be);
        }
    }

    pub fn remove(&self, be: &BreakEvent) {
        self.events.lock().retain(|e| e.id() != be.id());
        for listener in self.listeners.lock().values() {
            listener.on_break_event_removed(be);
        }
    }

    pub fn modify(&self, be: &BreakEvent) {
        for listener in self.listeners.lock().values() {
            listener.on_break_event_modified(be);
        }
    }

    pub fn set_enabled(&self, be: &BreakEvent, enabled: bool) {
        be.set_enabled(enabled);
        for listener in self.listeners.lock().values() {
            listener.on_break_event_enable_changed(be);
        }
    }

    /// Poll every subscriber's read-only answer, as a UI timer would. Any
    /// listener reporting read-only makes the whole store read-only.
    pub fn check_read_only(&self) -> bool {
        let mut read_only = false;
        for listener in self.listeners.lock().values() {
            let mut answer = false;
            listener.checking_read_only(&mut |v| answer = v);
            read_only |= answer;
        }
        read_only
    }
}

impl BreakpointStore for InMemoryBreakpointStore {
    fn break_events(&self) -> Vec<BreakEvent> {
        self.events.lock().clone()
    }

    fn subscribe(&self, listener: Arc<dyn StoreListener>) -> ListenerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().insert(id, listener);
        id
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.listeners.lock().remove(&id);
    }

    fn notify_modified(&self, be: &BreakEvent) {
        self.modify(be);
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
