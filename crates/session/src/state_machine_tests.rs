// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn idle_accepts_run_and_attach_but_rejects_continue() {
    assert_eq!(SessionState::Idle.admit(Command::Run), Ok(Admission::Proceed));
    assert_eq!(SessionState::Idle.admit(Command::Attach), Ok(Admission::Proceed));
    assert!(SessionState::Idle.admit(Command::Continue).is_err());
}

#[test]
fn running_rejects_step_family_and_continue() {
    for command in [
        Command::Continue,
        Command::NextLine,
        Command::StepLine,
        Command::NextInstruction,
        Command::StepInstruction,
        Command::Finish,
    ] {
        assert!(SessionState::Running.admit(command).is_err(), "{command:?} should be rejected while Running");
    }
}

#[test]
fn running_accepts_exit_and_detach() {
    assert_eq!(SessionState::Running.admit(Command::Exit), Ok(Admission::Proceed));
    assert_eq!(SessionState::Running.admit(Command::Detach), Ok(Admission::Proceed));
}

#[test]
fn stopped_accepts_stepping_and_query_commands() {
    for command in [
        Command::Continue,
        Command::NextLine,
        Command::StepLine,
        Command::NextInstruction,
        Command::StepInstruction,
        Command::Finish,
        Command::SetActiveThread,
        Command::Disassemble,
        Command::ResolveExpression,
        Command::Exit,
        Command::Detach,
    ] {
        assert_eq!(SessionState::Stopped.admit(command), Ok(Admission::Proceed), "{command:?} should proceed while Stopped");
    }
}

#[test]
fn exited_rejects_everything_except_stop_and_cancel() {
    for command in [
        Command::Run,
        Command::Attach,
        Command::Detach,
        Command::Continue,
        Command::Exit,
        Command::NextLine,
        Command::StepLine,
        Command::NextInstruction,
        Command::StepInstruction,
        Command::Finish,
        Command::SetActiveThread,
        Command::Disassemble,
        Command::ResolveExpression,
    ] {
        assert!(SessionState::Exited.admit(command).is_err(), "{command:?} should be rejected while Exited");
    }
}

#[test]
fn stop_is_a_noop_everywhere_except_running() {
    assert_eq!(SessionState::Idle.admit(Command::Stop), Ok(Admission::NoOp));
    assert_eq!(SessionState::Stopped.admit(Command::Stop), Ok(Admission::NoOp));
    assert_eq!(SessionState::Exited.admit(Command::Stop), Ok(Admission::NoOp));
    assert_eq!(SessionState::Running.admit(Command::Stop), Ok(Admission::Proceed));
}

#[test]
fn cancel_async_evaluations_is_a_noop_only_when_exited() {
    assert_eq!(SessionState::Exited.admit(Command::CancelAsyncEvaluations), Ok(Admission::NoOp));
    assert_eq!(SessionState::Idle.admit(Command::CancelAsyncEvaluations), Ok(Admission::Proceed));
    assert_eq!(SessionState::Running.admit(Command::CancelAsyncEvaluations), Ok(Admission::Proceed));
    assert_eq!(SessionState::Stopped.admit(Command::CancelAsyncEvaluations), Ok(Admission::Proceed));
}

#[test]
fn starts_execution_matches_the_execution_commands() {
    assert!(Command::Run.starts_execution());
    assert!(Command::Continue.starts_execution());
    assert!(Command::Finish.starts_execution());
    assert!(!Command::Stop.starts_execution());
    assert!(!Command::SetActiveThread.starts_execution());
}

#[test]
fn invalid_state_error_names_the_rejected_command_and_state() {
    let err = SessionState::Idle.admit(Command::Continue).unwrap_err();
    match err {
        SessionError::InvalidState { command, state } => {
            assert_eq!(command, "continue");
            assert_eq!(state, SessionState::Idle);
        }
        other => panic!("unexpected error variant: {other:?}"),
    }
}
