// SPDX-License-Identifier: MIT

//! An in-memory [`Engine`] used by the test suite and the demo binary.
//!
//! Mirrors the teacher's `FakeAgentAdapter`: every call is recorded for
//! assertions, and failures can be injected per break-event location to
//! exercise the bind-failure and forced-stop recovery paths.

use async_trait::async_trait;
use dbg_core::{AssemblyLine, Backtrace, BreakEvent, EngineHandle, ProcessInfo, ThreadInfo};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::engine::{Engine, EngineError, StartInfo};

/// One recorded call, for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCall {
    Run,
    Attach(u32),
    Detach,
    Exit,
    Stop,
    Continue,
    StepLine,
    NextLine,
    StepInstruction,
    NextInstruction,
    Finish,
    SetActiveThread(u32, u64),
    Insert(String),
    Remove(EngineHandle),
    Update(EngineHandle, String),
    Enable(EngineHandle, bool),
    ResolveExpression(String, String),
}

/// A fully in-memory, deterministic [`Engine`] for tests and the demo
/// harness. Not a concrete debugging backend — no process is ever spawned.
pub struct FakeEngine {
    calls: Mutex<Vec<FakeCall>>,
    next_handle: AtomicU64,
    /// Locations (as reported by `BreakEvent::location_string`) on which
    /// `on_insert_break_event`/`on_update_break_event` should fail once.
    fail_insert_at: Mutex<HashSet<String>>,
    allow_break_event_changes: std::sync::atomic::AtomicBool,
    fail_next_continue: std::sync::atomic::AtomicBool,
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_handle: AtomicU64::new(1),
            fail_insert_at: Mutex::new(HashSet::new()),
            allow_break_event_changes: std::sync::atomic::AtomicBool::new(true),
            fail_next_continue: std::sync::atomic::AtomicBool::new(false),
        }
    }
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.calls.lock().clone()
    }

    /// The next `on_insert_break_event`/`on_update_break_event` call for this
    /// location returns an error, then succeeds normally afterward.
    pub fn fail_next_insert_at(&self, location: impl Into<String>) {
        self.fail_insert_at.lock().insert(location.into());
    }

    pub fn set_allow_break_event_changes(&self, allow: bool) {
        self.allow_break_event_changes.store(allow, Ordering::Relaxed);
    }

    /// The next `on_continue` call fails, then succeeds normally afterward.
    pub fn fail_next_continue(&self) {
        self.fail_next_continue.store(true, Ordering::Relaxed);
    }

    fn record(&self, call: FakeCall) {
        self.calls.lock().push(call);
    }

    fn next_handle(&self) -> EngineHandle {
        let n = self.next_handle.fetch_add(1, Ordering::Relaxed);
        EngineHandle::new(format!("fake-{n}"))
    }
}

#[async_trait]
impl Engine for FakeEngine {
    async fn on_run(&self, _start_info: StartInfo) -> Result<(), EngineError> {
        self.record(FakeCall::Run);
        Ok(())
    }

    async fn on_attach(&self, process_id: u32) -> Result<(), EngineError> {
        self.record(FakeCall::Attach(process_id));
        Ok(())
    }

    async fn on_detach(&self) -> Result<(), EngineError> {
        self.record(FakeCall::Detach);
        Ok(())
    }

    async fn on_exit(&self) -> Result<(), EngineError> {
        self.record(FakeCall::Exit);
        Ok(())
    }

    async fn on_stop(&self) -> Result<(), EngineError> {
        self.record(FakeCall::Stop);
        Ok(())
    }

    async fn on_continue(&self) -> Result<(), EngineError> {
        self.record(FakeCall::Continue);
        if self.fail_next_continue.swap(false, Ordering::Relaxed) {
            return Err(EngineError::new("continue failed"));
        }
        Ok(())
    }

    async fn on_step_line(&self) -> Result<(), EngineError> {
        self.record(FakeCall::StepLine);
        Ok(())
    }

    async fn on_next_line(&self) -> Result<(), EngineError> {
        self.record(FakeCall::NextLine);
        Ok(())
    }

    async fn on_step_instruction(&self) -> Result<(), EngineError> {
        self.record(FakeCall::StepInstruction);
        Ok(())
    }

    async fn on_next_instruction(&self) -> Result<(), EngineError> {
        self.record(FakeCall::NextInstruction);
        Ok(())
    }

    async fn on_finish(&self) -> Result<(), EngineError> {
        self.record(FakeCall::Finish);
        Ok(())
    }

    async fn on_set_active_thread(&self, pid: u32, tid: u64) -> Result<(), EngineError> {
        self.record(FakeCall::SetActiveThread(pid, tid));
        Ok(())
    }

    async fn on_insert_break_event(
        &self,
        be: &BreakEvent,
        _activate: bool,
    ) -> Result<EngineHandle, EngineError> {
        let location = be.location_string();
        self.record(FakeCall::Insert(location.clone()));
        if self.fail_insert_at.lock().remove(&location) {
            return Err(EngineError::new(format!("unknown location '{location}'")));
        }
        Ok(self.next_handle())
    }

    async fn on_remove_break_event(&self, handle: &EngineHandle) -> Result<(), EngineError> {
        self.record(FakeCall::Remove(handle.clone()));
        Ok(())
    }

    async fn on_update_break_event(
        &self,
        handle: &EngineHandle,
        be: &BreakEvent,
    ) -> Result<EngineHandle, EngineError> {
        let location = be.location_string();
        self.record(FakeCall::Update(handle.clone(), location.clone()));
        if self.fail_insert_at.lock().remove(&location) {
            return Err(EngineError::new(format!("unknown location '{location}'")));
        }
        Ok(handle.clone())
    }

    async fn on_enable_break_event(&self, handle: &EngineHandle, enabled: bool) -> Result<(), EngineError> {
        self.record(FakeCall::Enable(handle.clone(), enabled));
        Ok(())
    }

    fn allow_break_event_changes(&self) -> bool {
        self.allow_break_event_changes.load(Ordering::Relaxed)
    }

    async fn on_get_processes(&self) -> Result<Vec<ProcessInfo>, EngineError> {
        Ok(vec![ProcessInfo { pid: 1234, name: "fake-target".to_string() }])
    }

    async fn on_get_threads(&self, pid: u32) -> Result<Vec<ThreadInfo>, EngineError> {
        Ok(vec![ThreadInfo { pid, tid: 1, name: Some("main".to_string()) }])
    }

    async fn on_get_thread_backtrace(&self, _pid: u32, _tid: u64) -> Result<Backtrace, EngineError> {
        Ok(Backtrace::default())
    }

    async fn on_disassemble_file(&self, _path: &str) -> Result<Option<Vec<AssemblyLine>>, EngineError> {
        Ok(None)
    }

    async fn on_resolve_expression(&self, expr: &str, location: &str) -> Result<String, EngineError> {
        self.record(FakeCall::ResolveExpression(expr.to_string(), location.to_string()));
        Ok(expr.to_string())
    }

    async fn on_cancel_async_evaluations(&self) {}

    fn can_cancel_async_evaluations(&self) -> bool {
        true
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
