// SPDX-License-Identifier: MIT

//! Target events and the value objects an engine returns alongside them.
//!
//! These are plain data: the session crate wraps [`ProcessInfo`],
//! [`ThreadInfo`] and [`Backtrace`] with a weak back-reference to the
//! session when it hands them to a caller (see `dbg_session::Attached`).

/// A running or exited process as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
}

/// A thread within a process as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadInfo {
    pub pid: u32,
    pub tid: u64,
    pub name: Option<String>,
}

/// One frame of a backtrace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    pub file: Option<String>,
    pub line: Option<u32>,
    pub function: String,
}

/// A thread's call stack at the moment it was captured.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Backtrace {
    pub frames: Vec<StackFrame>,
}

/// One disassembled instruction line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyLine {
    pub address: u64,
    pub text: String,
}

/// The kind of an asynchronous notification raised by the engine.
///
/// [`TargetEventKind::is_stop_event`] determines whether receipt of this
/// kind transitions the session from Running to Stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetEventKind {
    TargetReady,
    TargetStopped,
    TargetInterrupted,
    TargetHitBreakpoint,
    TargetSignaled,
    TargetExited,
    TargetExceptionThrown,
    TargetUnhandledException,
    ThreadStarted,
    ThreadStopped,
}

impl TargetEventKind {
    /// Whether receipt of an event of this kind moves Running -> Stopped.
    ///
    /// `TargetExited` is handled separately by the state machine (it moves
    /// any state to the terminal Exited state) and is therefore not a stop
    /// event in this sense.
    pub fn is_stop_event(self) -> bool {
        matches!(
            self,
            TargetEventKind::TargetStopped
                | TargetEventKind::TargetInterrupted
                | TargetEventKind::TargetHitBreakpoint
                | TargetEventKind::TargetSignaled
                | TargetEventKind::TargetExceptionThrown
                | TargetEventKind::TargetUnhandledException
                | TargetEventKind::ThreadStopped
        )
    }

    pub fn is_exit_event(self) -> bool {
        matches!(self, TargetEventKind::TargetExited)
    }
}

/// An asynchronous notification from the engine about the state of the
/// debug target.
#[derive(Debug, Clone, Default)]
pub struct TargetEvent {
    pub kind: Option<TargetEventKind>,
    pub process: Option<ProcessInfo>,
    pub thread: Option<ThreadInfo>,
    pub backtrace: Option<Backtrace>,
}

impl TargetEvent {
    pub fn new(kind: TargetEventKind) -> Self {
        Self { kind: Some(kind), process: None, thread: None, backtrace: None }
    }

    pub fn kind(&self) -> TargetEventKind {
        // A TargetEvent is always constructed through `new`; `kind` is only
        // `None` for the `Default` value used by tests that build one field
        // at a time via struct-update syntax.
        self.kind.unwrap_or(TargetEventKind::TargetStopped)
    }

    pub fn with_process(mut self, process: ProcessInfo) -> Self {
        self.process = Some(process);
        self
    }

    pub fn with_thread(mut self, thread: ThreadInfo) -> Self {
        self.thread = Some(thread);
        self
    }

    pub fn with_backtrace(mut self, backtrace: Backtrace) -> Self {
        self.backtrace = Some(backtrace);
        self
    }

    pub fn is_stop_event(&self) -> bool {
        self.kind().is_stop_event()
    }

    pub fn is_exit_event(&self) -> bool {
        self.kind().is_exit_event()
    }
}

/// Busy-state notification surfaced to the UI while the engine performs a
/// long-running background operation outside of the normal command flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusyState {
    pub is_busy: bool,
    pub description: Option<String>,
}

#[cfg(test)]
#[path = "target_event_tests.rs"]
mod tests;
