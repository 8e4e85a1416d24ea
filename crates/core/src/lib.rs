// SPDX-License-Identifier: MIT

//! dbg-core: shared value types for the debugger session front-end.
//!
//! This crate holds pure data — break events, target events, process/thread
//! value objects, and session configuration — with no engine or dispatch
//! logic. The `dbg-session` crate builds the behavioral layer on top.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod breakpoint;
pub mod id;
pub mod options;
pub mod target_event;

pub use breakpoint::{
    BreakEvent, BreakEventId, BreakEventInfo, BreakEventKind, EngineHandle, HitCountMode,
};
pub use id::{short, IdBuf};
pub use options::{
    AttachPreferences, DispatcherConfig, EvaluationOptions, PathCasePolicy, SessionOptions,
    SteppingGranularity,
};
pub use target_event::{
    AssemblyLine, Backtrace, BusyState, ProcessInfo, StackFrame, TargetEvent, TargetEventKind,
    ThreadInfo,
};
