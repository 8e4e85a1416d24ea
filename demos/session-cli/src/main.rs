// SPDX-License-Identifier: MIT

//! Interactive demo harness for `dbg-session`, driven by the in-memory
//! [`FakeEngine`] and [`InMemoryBreakpointStore`] — no real debugging
//! backend is involved. Useful for exercising the session façade by hand.

use std::sync::Arc;

use clap::Parser;
use dbg_core::{BreakEventKind, SessionOptions};
use dbg_session::fake::FakeEngine;
use dbg_session::{InMemoryBreakpointStore, Session, SessionConfig, StartInfo};

#[derive(Parser, Debug)]
#[command(name = "session-cli", no_binary_name = true)]
enum ReplCommand {
    /// Launch the fake target.
    Run,
    /// Attach to a fake process id.
    Attach { pid: u32 },
    Continue,
    Stop,
    Exit,
    NextLine,
    StepLine,
    Finish,
    /// Set a breakpoint at `file:line`.
    Break { location: String },
    Processes,
    Threads { pid: u32 },
    /// Print the current session state.
    State,
    Quit,
}

fn parse_location(location: &str) -> Option<(String, u32)> {
    let (file, line) = location.rsplit_once(':')?;
    Some((file.to_string(), line.parse().ok()?))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let engine = Arc::new(FakeEngine::new());
    let store = Arc::new(InMemoryBreakpointStore::new());
    let session = Session::new(
        engine,
        SessionOptions::default(),
        SessionConfig::default()
            .exception_handler(|err| eprintln!("[exception] {err}"))
            .output_writer(|is_stderr, text| {
                let stream = if is_stderr { "stderr" } else { "stdout" };
                println!("[target:{stream}] {text}");
            }),
        Some(store.clone()),
    );

    session.on_target_started(|| println!("[event] target started"));
    session.on_any_target_event(|event| println!("[event] {:?}", event.kind()));

    println!("session-cli ready. Type `run`, `break a.rs:10`, `continue`, `quit`, ...");

    let mut input = String::new();
    loop {
        input.clear();
        if std::io::stdin().read_line(&mut input).unwrap_or(0) == 0 {
            break;
        }
        let words = input.split_whitespace();
        let line = match ReplCommand::try_parse_from(words) {
            Ok(line) => line,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match line {
            ReplCommand::Run => report(session.run(StartInfo { command: "fake-target".into(), ..Default::default() }).await),
            ReplCommand::Attach { pid } => report(session.attach(pid).await),
            ReplCommand::Continue => report(session.continue_().await),
            ReplCommand::Stop => report(session.stop().await),
            ReplCommand::Exit => report(session.exit().await),
            ReplCommand::NextLine => report(session.next_line().await),
            ReplCommand::StepLine => report(session.step_line().await),
            ReplCommand::Finish => report(session.finish().await),
            ReplCommand::Break { location } => match parse_location(&location) {
                Some((file, line_number)) => {
                    store.add(dbg_core::BreakEvent::new(BreakEventKind::Breakpoint {
                        file,
                        line: line_number,
                        column: None,
                        condition: None,
                        hit_count_filter: None,
                        trace_expression: None,
                    }));
                    println!("breakpoint recorded at {location}");
                }
                None => println!("expected file:line, got '{location}'"),
            },
            ReplCommand::Processes => match session.get_processes().await {
                Ok(processes) => println!("{processes:?}"),
                Err(e) => println!("error: {e}"),
            },
            ReplCommand::Threads { pid } => match session.get_threads(pid).await {
                Ok(threads) => println!("{threads:?}"),
                Err(e) => println!("error: {e}"),
            },
            ReplCommand::State => println!("{}", session.state()),
            ReplCommand::Quit => break,
        }
    }

    session.dispose();
}

fn report(result: Result<(), dbg_session::SessionError>) {
    if let Err(e) = result {
        println!("error: {e}");
    }
}
