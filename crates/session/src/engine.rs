// SPDX-License-Identifier: MIT

//! The abstract `Engine` interface: everything a concrete debugging backend
//! (native, managed, remote protocol) must implement. The session façade
//! never knows which backend it is driving.

use async_trait::async_trait;
use dbg_core::{AssemblyLine, Backtrace, BreakEvent, EngineHandle, ProcessInfo, ThreadInfo};
use std::path::PathBuf;

/// Opaque failure from an engine method. The session never inspects the
/// contents beyond logging and handing it to the exception handler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct EngineError(pub String);

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Parameters for launching a new target process.
#[derive(Debug, Clone, Default)]
pub struct StartInfo {
    pub command: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

/// The pure-virtual backend interface. Concrete debugging backends (native
/// ptrace, a runtime wire protocol, a remote transport) implement this;
/// native/managed/remote backends themselves are out of scope here — only
/// this interface and the in-memory `fake` test implementation live in this
/// crate.
///
/// Backends that retain break-event handles across `notify_source_file_unloaded`
/// are out of contract: the session unconditionally treats the handle as
/// gone and will issue a fresh `on_insert_break_event` on the next
/// `notify_source_file_loaded`, which double-binds if the old handle is
/// still live on the backend side.
#[async_trait]
pub trait Engine: Send + Sync + 'static {
    async fn on_run(&self, start_info: StartInfo) -> Result<(), EngineError>;
    async fn on_attach(&self, process_id: u32) -> Result<(), EngineError>;
    async fn on_detach(&self) -> Result<(), EngineError>;
    async fn on_exit(&self) -> Result<(), EngineError>;
    async fn on_stop(&self) -> Result<(), EngineError>;

    async fn on_continue(&self) -> Result<(), EngineError>;
    async fn on_step_line(&self) -> Result<(), EngineError>;
    async fn on_next_line(&self) -> Result<(), EngineError>;
    async fn on_step_instruction(&self) -> Result<(), EngineError>;
    async fn on_next_instruction(&self) -> Result<(), EngineError>;
    async fn on_finish(&self) -> Result<(), EngineError>;
    async fn on_set_active_thread(&self, pid: u32, tid: u64) -> Result<(), EngineError>;

    async fn on_insert_break_event(
        &self,
        be: &BreakEvent,
        activate: bool,
    ) -> Result<EngineHandle, EngineError>;
    async fn on_remove_break_event(&self, handle: &EngineHandle) -> Result<(), EngineError>;
    async fn on_update_break_event(
        &self,
        handle: &EngineHandle,
        be: &BreakEvent,
    ) -> Result<EngineHandle, EngineError>;
    async fn on_enable_break_event(
        &self,
        handle: &EngineHandle,
        enabled: bool,
    ) -> Result<(), EngineError>;
    fn allow_break_event_changes(&self) -> bool;

    async fn on_get_processes(&self) -> Result<Vec<ProcessInfo>, EngineError>;
    async fn on_get_threads(&self, pid: u32) -> Result<Vec<ThreadInfo>, EngineError>;
    async fn on_get_thread_backtrace(&self, pid: u32, tid: u64) -> Result<Backtrace, EngineError>;
    async fn on_disassemble_file(
        &self,
        path: &str,
    ) -> Result<Option<Vec<AssemblyLine>>, EngineError>;

    async fn on_resolve_expression(&self, expr: &str, location: &str) -> Result<String, EngineError>;
    async fn on_cancel_async_evaluations(&self);
    fn can_cancel_async_evaluations(&self) -> bool;
}
