// SPDX-License-Identifier: MIT

//! Maps user break-events to backend handles and tracks their validity and
//! status, synchronizing a declarative store with an imperative engine that
//! may fail, reload source files, or relocate code.

use dbg_core::{BreakEvent, BreakEventId, BreakEventInfo, PathCasePolicy};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::engine::Engine;
use crate::error::SessionError;
use crate::store::BreakpointStore;

type StatusChangedHandler = Box<dyn Fn(&BreakEvent, &BreakEventInfo) + Send + Sync>;

/// Session-owned registry binding [`BreakEvent`]s to engine handles.
///
/// Every mutating method here is meant to be called while the caller holds
/// the session lock for its synchronous bookkeeping; the `async` methods
/// release no lock of their own across the engine call — callers are
/// responsible for not holding the session lock across the `.await` (see
/// the crate-level concurrency notes in `session.rs`).
#[derive(Default)]
pub struct BreakEventRegistry {
    entries: Mutex<HashMap<BreakEventId, (BreakEvent, BreakEventInfo)>>,
    on_status_changed: Mutex<Vec<StatusChangedHandler>>,
    /// Set while the registry itself is the originator of a pending store
    /// mutation (store swap, or an engine-driven `adjust_location`), so the
    /// session's own store listener suppresses the resulting echo instead of
    /// treating it as a user edit.
    adjusting: AtomicBool,
}

impl BreakEventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_status_changed(&self, handler: impl Fn(&BreakEvent, &BreakEventInfo) + Send + Sync + 'static) {
        self.on_status_changed.lock().push(Box::new(handler));
    }

    fn fire_status_changed(&self, be: &BreakEvent, info: &BreakEventInfo) {
        for handler in self.on_status_changed.lock().iter() {
            handler(be, info);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn info_of(&self, be: &BreakEvent) -> Option<BreakEventInfo> {
        self.entries.lock().get(&be.id()).map(|(_, info)| info.clone())
    }

    fn record(&self, be: &BreakEvent, info: BreakEventInfo) {
        self.entries.lock().insert(be.id(), (be.clone(), info.clone()));
        self.fire_status_changed(be, &info);
    }

    /// Seed an already-existing break event (from a store handed to the
    /// session at construction) as unbound, before the engine has started.
    pub fn record_initial(&self, be: &BreakEvent) {
        self.record(be, BreakEventInfo::unbound());
    }

    fn bind_failure(be: &BreakEvent, message: String) -> (BreakEventInfo, SessionError) {
        let location = be.location_string();
        let info = BreakEventInfo {
            handle: None,
            is_valid: true,
            status_message: Some(format!("Could not set breakpoint at location '{location}': {message}")),
        };
        (info, SessionError::BreakpointBindFailure { location, message })
    }

    /// Register a break event. If the session has not yet started, the
    /// break event is recorded unbound and handle creation is deferred.
    pub async fn add(
        &self,
        be: &BreakEvent,
        started: bool,
        engine: &dyn Engine,
    ) -> Result<(), SessionError> {
        if !started {
            self.record(be, BreakEventInfo::unbound());
            return Ok(());
        }
        match engine.on_insert_break_event(be, be.enabled()).await {
            Ok(handle) => {
                self.record(be, BreakEventInfo::bound(handle));
                Ok(())
            }
            Err(e) => {
                let (info, err) = Self::bind_failure(be, e.0);
                tracing::warn!(location = %be.location_string(), error = %err, "could not set breakpoint");
                self.record(be, info);
                Err(err)
            }
        }
    }

    /// Unregister a break event. Always drops the map entry; an engine
    /// failure here is logged, never propagated.
    pub async fn remove(&self, be: &BreakEvent, engine: &dyn Engine) {
        let existing = self.entries.lock().remove(&be.id());
        if let Some((_, info)) = existing {
            if let Some(handle) = info.handle {
                if let Err(e) = engine.on_remove_break_event(&handle).await {
                    tracing::warn!(error = %e, break_event = %be.location_string(), "engine failed to remove break event");
                }
            }
        }
    }

    /// Push a modified break event to the engine. If currently unbound this
    /// retries insertion — the path used after `source_file_loaded`.
    pub async fn update(
        &self,
        be: &BreakEvent,
        started: bool,
        engine: &dyn Engine,
    ) -> Result<(), SessionError> {
        let existing_handle = self.entries.lock().get(&be.id()).and_then(|(_, i)| i.handle.clone());
        match existing_handle {
            Some(handle) => match engine.on_update_break_event(&handle, be).await {
                Ok(new_handle) => {
                    self.record(be, BreakEventInfo::bound(new_handle));
                    Ok(())
                }
                Err(e) => {
                    let (info, err) = Self::bind_failure(be, e.0);
                    tracing::warn!(location = %be.location_string(), error = %err, "could not rebind breakpoint");
                    self.record(be, info);
                    Err(err)
                }
            },
            None => self.add(be, started, engine).await,
        }
    }

    /// Toggle the enabled flag on a bound break event. A no-op if unbound —
    /// the new enabled state is still reflected once re-inserted.
    pub async fn update_enabled(&self, be: &BreakEvent, enabled: bool, engine: &dyn Engine) {
        let handle = self.entries.lock().get(&be.id()).and_then(|(_, i)| i.handle.clone());
        if let Some(handle) = handle {
            if let Err(e) = engine.on_enable_break_event(&handle, enabled).await {
                tracing::warn!(error = %e, break_event = %be.location_string(), "engine failed to toggle break event");
            }
        }
    }

    /// Engine-initiated status update. Fires `status_changed` only if the
    /// stored validity or message actually changed.
    pub fn set_status(&self, be: &BreakEvent, is_valid: bool, message: Option<String>) {
        let updated = {
            let mut entries = self.entries.lock();
            entries.get_mut(&be.id()).and_then(|(_, info)| {
                let changed = info.is_valid != is_valid || info.status_message != message;
                info.is_valid = is_valid;
                info.status_message = message.clone();
                changed.then(|| info.clone())
            })
        };
        if let Some(info) = updated {
            self.fire_status_changed(be, &info);
        }
    }

    /// Retry insertion for every unbound breakpoint in `path`.
    pub async fn source_file_loaded(&self, path: &str, policy: PathCasePolicy, engine: &dyn Engine) {
        let candidates = self.matching_unbound(path, policy);
        for be in candidates {
            // Errors are already logged and recorded by `update`/`add`.
            let _ = self.update(&be, true, engine).await;
        }
    }

    fn matching_unbound(&self, path: &str, policy: PathCasePolicy) -> Vec<BreakEvent> {
        self.entries
            .lock()
            .values()
            .filter(|(be, info)| {
                info.handle.is_none() && be.file().map(|f| policy.paths_equal(f, path)).unwrap_or(false)
            })
            .map(|(be, _)| be.clone())
            .collect()
    }

    /// Null the handle for every bound breakpoint in `path`. The engine is
    /// not called — the backend is assumed to have already dropped it.
    pub fn source_file_unloaded(&self, path: &str, policy: PathCasePolicy) {
        let changed: Vec<(BreakEvent, BreakEventInfo)> = {
            let mut entries = self.entries.lock();
            let mut changed = Vec::new();
            for (be, info) in entries.values_mut() {
                if info.handle.is_some() && be.file().map(|f| policy.paths_equal(f, path)).unwrap_or(false) {
                    info.handle = None;
                    changed.push((be.clone(), info.clone()));
                }
            }
            changed
        };
        for (be, info) in changed {
            self.fire_status_changed(&be, &info);
        }
    }

    /// Remove every registered break event, calling `on_remove_break_event`
    /// for each bound one. Used when the store is replaced.
    pub async fn clear(&self, engine: &dyn Engine) {
        let entries: Vec<(BreakEvent, BreakEventInfo)> = self.entries.lock().drain().map(|(_, v)| v).collect();
        for (be, info) in entries {
            if let Some(handle) = &info.handle {
                if let Err(e) = engine.on_remove_break_event(handle).await {
                    tracing::warn!(error = %e, break_event = %be.location_string(), "engine failed to remove break event during store swap");
                }
            }
            self.fire_status_changed(&be, &BreakEventInfo::unbound());
        }
    }

    pub fn break_events(&self) -> Vec<BreakEvent> {
        self.entries.lock().values().map(|(be, _)| be.clone()).collect()
    }

    /// Reverse lookup used when the engine reports activity against a handle
    /// rather than a [`BreakEvent`] (e.g. a custom breakpoint action).
    pub fn find_by_handle(&self, handle: &dbg_core::EngineHandle) -> Option<BreakEvent> {
        self.entries
            .lock()
            .values()
            .find(|(_, info)| info.handle.as_ref() == Some(handle))
            .map(|(be, _)| be.clone())
    }

    /// Whether the registry is currently suppressing the store-echoed
    /// notification for a mutation it originated itself.
    pub fn is_adjusting(&self) -> bool {
        self.adjusting.load(Ordering::Relaxed)
    }

    pub fn begin_adjusting(&self) {
        self.adjusting.store(true, Ordering::Relaxed);
    }

    pub fn end_adjusting(&self) {
        self.adjusting.store(false, Ordering::Relaxed);
    }

    /// Engine-driven relocation of a bound breakpoint's source line (§4.3).
    /// Mutates the shared [`BreakEvent`] in place — the store and registry
    /// observe the same instance by reference, per the data model — and
    /// pushes a `modified` notification to the store so other listeners
    /// (e.g. a UI) refresh, while suppressing the echo back through this
    /// session's own store listener via the reentrancy flag.
    pub fn adjust_location(&self, be: &BreakEvent, new_line: u32, store: &dyn BreakpointStore) {
        self.begin_adjusting();
        be.set_line(new_line);
        store.notify_modified(be);
        self.end_adjusting();
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
