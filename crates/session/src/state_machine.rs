// SPDX-License-Identifier: MIT

//! The session state machine: states, the commands each state accepts, and
//! the `OnRunning` transition commands that start execution must raise
//! before the engine is called.

use crate::error::SessionError;

/// The four session states from idle construction through to the terminal
/// exited state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Stopped,
    Exited,
}

impl SessionState {
    pub fn is_running(self) -> bool {
        matches!(self, SessionState::Running)
    }

    pub fn is_exited(self) -> bool {
        matches!(self, SessionState::Exited)
    }
}

/// Every mutating operation the façade exposes, used to look the command up
/// in the per-state admission table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Run,
    Attach,
    Detach,
    Continue,
    Stop,
    Exit,
    NextLine,
    StepLine,
    NextInstruction,
    StepInstruction,
    Finish,
    SetActiveThread,
    Disassemble,
    ResolveExpression,
    CancelAsyncEvaluations,
}

impl Command {
    pub fn name(self) -> &'static str {
        match self {
            Command::Run => "run",
            Command::Attach => "attach",
            Command::Detach => "detach",
            Command::Continue => "continue",
            Command::Stop => "stop",
            Command::Exit => "exit",
            Command::NextLine => "next_line",
            Command::StepLine => "step_line",
            Command::NextInstruction => "next_instruction",
            Command::StepInstruction => "step_instruction",
            Command::Finish => "finish",
            Command::SetActiveThread => "set_active_thread",
            Command::Disassemble => "disassemble_file",
            Command::ResolveExpression => "resolve_expression",
            Command::CancelAsyncEvaluations => "cancel_async_evaluations",
        }
    }

    /// Whether a successful admission of this command raises the internal
    /// `OnRunning` transition (and the `target_started` signal) before the
    /// engine is invoked.
    pub fn starts_execution(self) -> bool {
        matches!(
            self,
            Command::Run
                | Command::Attach
                | Command::Continue
                | Command::NextLine
                | Command::StepLine
                | Command::NextInstruction
                | Command::StepInstruction
                | Command::Finish
        )
    }
}

/// The result of checking a command against the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The command should proceed to the engine.
    Proceed,
    /// The command is accepted but has no effect (e.g. `stop` while Idle).
    NoOp,
}

impl SessionState {
    /// Check whether `command` may run in this state.
    ///
    /// `stop` and `cancel_async_evaluations` are never hard errors: engines
    /// are explicitly allowed to ignore `stop` when not running, and
    /// cancellation of async evaluations is harmless in any state — both are
    /// downgraded to [`Admission::NoOp`] rather than [`SessionError::InvalidState`].
    pub fn admit(self, command: Command) -> Result<Admission, SessionError> {
        use Command::*;
        use SessionState::*;

        if command == Stop {
            return Ok(if self == Running { Admission::Proceed } else { Admission::NoOp });
        }
        if command == CancelAsyncEvaluations {
            return Ok(if self == Exited { Admission::NoOp } else { Admission::Proceed });
        }

        let proceeds = matches!(
            (self, command),
            (Idle, Run | Attach)
                | (Running, Exit | Detach)
                | (Stopped, Continue | NextLine | StepLine | NextInstruction | StepInstruction | Finish)
                | (Stopped, SetActiveThread | Disassemble | ResolveExpression)
                | (Stopped, Exit | Detach)
        );

        if proceeds {
            Ok(Admission::Proceed)
        } else {
            Err(SessionError::InvalidState { command: command.name(), state: self })
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionState::Idle => "Idle",
            SessionState::Running => "Running",
            SessionState::Stopped => "Stopped",
            SessionState::Exited => "Exited",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
#[path = "state_machine_tests.rs"]
mod tests;
