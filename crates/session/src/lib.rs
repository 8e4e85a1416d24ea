// SPDX-License-Identifier: MIT

//! dbg-session: the behavioral layer of the debugger session front-end.
//!
//! Ties the abstract [`Engine`] backend interface to a stateful [`Session`]
//! façade: a dispatcher serializing mutating commands, a break-event
//! registry synchronizing a declarative store with the imperative engine,
//! a typed event bus, an expression resolver cache, and the session state
//! machine gating which commands are valid in which state.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod event_bus;
pub mod registry;
pub mod resolver_cache;
pub mod session;
pub mod state_machine;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use engine::{Engine, EngineError, StartInfo};
pub use error::SessionError;
pub use event_bus::EventBus;
pub use registry::BreakEventRegistry;
pub use resolver_cache::{EvaluatorLookup, ExpressionResolverCache, ResolverHook};
pub use session::{
    Attached, BreakpointTraceHandler, CustomBreakEventHitHandler, ExceptionHandler, OutputHandler,
    Session, SessionCallbacks, SessionConfig,
};
pub use state_machine::{Admission, Command, SessionState};
pub use store::{BreakpointStore, InMemoryBreakpointStore, ListenerId, StoreListener};
