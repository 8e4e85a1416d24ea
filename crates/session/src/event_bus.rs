// SPDX-License-Identifier: MIT

//! Multiplexes target events to typed subscribers.
//!
//! Delivery is synchronous on the thread that invoked `notify_target_event`
//! (the engine callback thread, never the dispatcher) and runs outside the
//! session lock. Subscribers for a specific kind run before the catch-all;
//! registration order determines invocation order within a kind.

use dbg_core::{BusyState, TargetEvent, TargetEventKind};
use parking_lot::RwLock;
use std::collections::HashMap;

type TargetEventHandler = Box<dyn Fn(&TargetEvent) + Send + Sync>;
type TargetStartedHandler = Box<dyn Fn() + Send + Sync>;
type BusyStateHandler = Box<dyn Fn(&BusyState) + Send + Sync>;

/// Typed pub/sub hub for [`TargetEvent`]s plus the two standalone signals
/// (`target_started`, `busy_state_changed`) the user-facing stream exposes.
#[derive(Default)]
pub struct EventBus {
    by_kind: RwLock<HashMap<TargetEventKind, Vec<TargetEventHandler>>>,
    catch_all: RwLock<Vec<TargetEventHandler>>,
    target_started: RwLock<Vec<TargetStartedHandler>>,
    busy_state: RwLock<Vec<BusyStateHandler>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a single [`TargetEventKind`].
    pub fn on_kind(&self, kind: TargetEventKind, handler: impl Fn(&TargetEvent) + Send + Sync + 'static) {
        self.by_kind.write().entry(kind).or_default().push(Box::new(handler));
    }

    /// Subscribe to every [`TargetEvent`], regardless of kind.
    pub fn on_any(&self, handler: impl Fn(&TargetEvent) + Send + Sync + 'static) {
        self.catch_all.write().push(Box::new(handler));
    }

    pub fn on_target_started(&self, handler: impl Fn() + Send + Sync + 'static) {
        self.target_started.write().push(Box::new(handler));
    }

    pub fn on_busy_state_changed(&self, handler: impl Fn(&BusyState) + Send + Sync + 'static) {
        self.busy_state.write().push(Box::new(handler));
    }

    /// Deliver `event` to kind-specific subscribers, then the catch-all
    /// subscribers, in registration order within each group.
    pub fn dispatch(&self, event: &TargetEvent) {
        if let Some(handlers) = self.by_kind.read().get(&event.kind()) {
            for handler in handlers {
                handler(event);
            }
        }
        for handler in self.catch_all.read().iter() {
            handler(event);
        }
    }

    pub fn fire_target_started(&self) {
        for handler in self.target_started.read().iter() {
            handler();
        }
    }

    pub fn fire_busy_state_changed(&self, state: &BusyState) {
        for handler in self.busy_state.read().iter() {
            handler(state);
        }
    }
}

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;
