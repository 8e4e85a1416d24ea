// SPDX-License-Identifier: MIT

//! The session-layer error taxonomy.

use crate::engine::EngineError;
use crate::state_machine::SessionState;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("engine failure during {operation}: {source}")]
    EngineFailure {
        operation: &'static str,
        #[source]
        source: EngineError,
    },

    #[error("could not set breakpoint at location '{location}': {message}")]
    BreakpointBindFailure { location: String, message: String },

    #[error("command '{command}' is not valid in state {state}")]
    InvalidState { command: &'static str, state: SessionState },

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("expression resolver failed: {0}")]
    ResolverFailure(String),
}
