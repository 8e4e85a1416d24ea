// SPDX-License-Identifier: MIT

//! The session façade: ties the dispatcher, registry, event bus, state
//! machine, resolver cache and store together behind a single handle.
//!
//! Mirrors the teacher's daemon-session split between a cheap `Arc`-backed
//! handle (`Session`) and the shared inner state it wraps (`SessionInner`) —
//! callbacks from the engine and the store hold only a `Weak` back-reference,
//! so neither collaborator keeps the session alive past the caller's last
//! `Session` handle.

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;

use dbg_core::{
    AssemblyLine, Backtrace, BreakEvent, BusyState, EngineHandle, ProcessInfo, SessionOptions,
    TargetEvent, TargetEventKind, ThreadInfo,
};

use crate::dispatcher::Dispatcher;
use crate::engine::{Engine, StartInfo};
use crate::error::SessionError;
use crate::event_bus::EventBus;
use crate::registry::BreakEventRegistry;
use crate::resolver_cache::{ExpressionResolverCache, ResolverHook};
use crate::state_machine::{Admission, Command, SessionState};
use crate::store::{BreakpointStore, ListenerId, StoreListener};

/// `(is_stderr, text)` sink for target or debugger-originated output.
pub type OutputHandler = dyn Fn(bool, &str) + Send + Sync;
/// Called with `(error)` whenever an engine command fails; returns whether
/// the failure was handled (purely informational — the forced state
/// transition happens regardless).
pub type ExceptionHandler = dyn Fn(&SessionError) + Send + Sync;
/// Called with `(break_event, resolved_trace_text)` when a tracepoint fires.
pub type BreakpointTraceHandler = dyn Fn(&BreakEvent, &str) + Send + Sync;
/// Called with `(action_id, break_event)`, returns whether the action was handled.
pub type CustomBreakEventHitHandler = dyn Fn(&str, &BreakEvent) -> bool + Send + Sync;

/// User-supplied hooks and knobs that don't belong in [`SessionOptions`]
/// because they're behavior, not configuration data.
#[derive(Default, Clone)]
pub struct SessionConfig {
    pub exception_handler: Option<Arc<ExceptionHandler>>,
    pub breakpoint_trace_handler: Option<Arc<BreakpointTraceHandler>>,
    pub custom_break_event_hit_handler: Option<Arc<CustomBreakEventHitHandler>>,
    pub expression_resolver: Option<Arc<ResolverHook>>,
    pub output_writer: Option<Arc<OutputHandler>>,
    pub log_writer: Option<Arc<OutputHandler>>,
}

impl SessionConfig {
    pub fn exception_handler(mut self, f: impl Fn(&SessionError) + Send + Sync + 'static) -> Self {
        self.exception_handler = Some(Arc::new(f));
        self
    }

    pub fn breakpoint_trace_handler(mut self, f: impl Fn(&BreakEvent, &str) + Send + Sync + 'static) -> Self {
        self.breakpoint_trace_handler = Some(Arc::new(f));
        self
    }

    pub fn custom_break_event_hit_handler(
        mut self,
        f: impl Fn(&str, &BreakEvent) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.custom_break_event_hit_handler = Some(Arc::new(f));
        self
    }

    pub fn expression_resolver(
        mut self,
        f: impl Fn(&str, &str) -> Result<Option<String>, String> + Send + Sync + 'static,
    ) -> Self {
        self.expression_resolver = Some(Arc::new(f));
        self
    }

    pub fn output_writer(mut self, f: impl Fn(bool, &str) + Send + Sync + 'static) -> Self {
        self.output_writer = Some(Arc::new(f));
        self
    }

    pub fn log_writer(mut self, f: impl Fn(bool, &str) + Send + Sync + 'static) -> Self {
        self.log_writer = Some(Arc::new(f));
        self
    }
}

/// A value fetched from the engine, carrying a weak back-reference to the
/// session that fetched it (§3: process/thread/backtrace objects are
/// "attached" to the session right after the engine call returns, so later
/// queries can route back through the façade). Derefs transparently to the
/// wrapped value; equality and hashing ignore the back-reference.
pub struct Attached<T> {
    value: T,
    session: Weak<SessionInner>,
}

impl<T> Attached<T> {
    fn new(value: T, inner: &Arc<SessionInner>) -> Self {
        Self { value, session: Arc::downgrade(inner) }
    }

    /// Upgrade the back-reference to a live [`Session`] handle, if the
    /// session hasn't been dropped since this value was fetched.
    pub fn session(&self) -> Option<Session> {
        self.session.upgrade().map(|inner| Session { inner })
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> std::ops::Deref for Attached<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: Clone> Clone for Attached<T> {
    fn clone(&self) -> Self {
        Self { value: self.value.clone(), session: self.session.clone() }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Attached<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Attached").field(&self.value).finish()
    }
}

impl<T: PartialEq> PartialEq for Attached<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

/// Whether an engine command failure forces a synthetic transition.
#[derive(Clone, Copy, PartialEq, Eq)]
enum FailureRecovery {
    ForceExited,
    ForceStopped,
    None,
}

struct Flags {
    state: SessionState,
    started: bool,
    disposed: bool,
    process_cache: Option<Vec<ProcessInfo>>,
}

impl Default for Flags {
    fn default() -> Self {
        Self { state: SessionState::Idle, started: false, disposed: false, process_cache: None }
    }
}

struct StoreBinding {
    store: Arc<dyn BreakpointStore>,
    listener_id: ListenerId,
}

struct OutputState {
    output_writer: Option<Arc<OutputHandler>>,
    log_writer: Option<Arc<OutputHandler>>,
}

/// The shared state behind every [`Session`] handle. Not constructed
/// directly — use [`Session::new`].
pub struct SessionInner {
    engine: Arc<dyn Engine>,
    flags: Mutex<Flags>,
    options: Mutex<SessionOptions>,
    registry: BreakEventRegistry,
    event_bus: EventBus,
    resolver_cache: ExpressionResolverCache,
    store: Mutex<StoreBinding>,
    dispatcher: Dispatcher,
    config: SessionConfig,
    output: Mutex<OutputState>,
}

/// A live debugger session: the 30%-share façade over the dispatcher,
/// registry, event bus, state machine, resolver cache and store.
///
/// Cloning a `Session` clones the handle, not the session — every clone
/// observes the same underlying state.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

/// The engine's channel back into the session. Held by the concrete
/// [`Engine`] implementation; holds only a [`Weak`] reference so a session
/// the caller has dropped doesn't linger because the engine still has a
/// callback handle.
#[derive(Clone)]
pub struct SessionCallbacks {
    inner: Weak<SessionInner>,
}

struct SessionStoreListener {
    inner: Weak<SessionInner>,
}

impl StoreListener for SessionStoreListener {
    fn on_break_event_added(&self, be: &BreakEvent) {
        let Some(inner) = self.inner.upgrade() else { return };
        if inner.registry.is_adjusting() {
            return;
        }
        let started = inner.flags.lock().started;
        let be = be.clone();
        tokio::spawn(async move {
            let _ = inner.registry.add(&be, started, inner.engine.as_ref()).await;
        });
    }

    fn on_break_event_removed(&self, be: &BreakEvent) {
        let Some(inner) = self.inner.upgrade() else { return };
        if inner.registry.is_adjusting() {
            return;
        }
        let be = be.clone();
        tokio::spawn(async move {
            inner.registry.remove(&be, inner.engine.as_ref()).await;
        });
    }

    fn on_break_event_modified(&self, be: &BreakEvent) {
        let Some(inner) = self.inner.upgrade() else { return };
        if inner.registry.is_adjusting() {
            return;
        }
        let started = inner.flags.lock().started;
        let be = be.clone();
        tokio::spawn(async move {
            let _ = inner.registry.update(&be, started, inner.engine.as_ref()).await;
        });
    }

    fn on_break_event_enable_changed(&self, be: &BreakEvent) {
        let Some(inner) = self.inner.upgrade() else { return };
        if inner.registry.is_adjusting() {
            return;
        }
        let enabled = be.enabled();
        let be = be.clone();
        tokio::spawn(async move {
            inner.registry.update_enabled(&be, enabled, inner.engine.as_ref()).await;
        });
    }

    fn checking_read_only(&self, respond: &mut dyn FnMut(bool)) {
        let Some(inner) = self.inner.upgrade() else {
            respond(true);
            return;
        };
        respond(SessionInner::is_read_only(&inner));
    }
}

impl SessionInner {
    /// 10ms bound: a store's UI timer must never block on a busy session.
    fn is_read_only(inner: &Arc<Self>) -> bool {
        match inner.flags.try_lock_for(Duration::from_millis(10)) {
            Some(_guard) => !inner.engine.allow_break_event_changes(),
            None => true,
        }
    }

    fn apply_target_event(inner: &Arc<Self>, event: TargetEvent) {
        {
            let mut flags = inner.flags.lock();
            if event.is_exit_event() {
                flags.state = SessionState::Exited;
                flags.started = false;
            } else if event.is_stop_event() {
                flags.state = SessionState::Stopped;
            }
            flags.process_cache = None;
        }
        inner.event_bus.dispatch(&event);
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        let binding = self.store.lock();
        binding.store.unsubscribe(binding.listener_id);
    }
}

impl Session {
    /// Construct a new session around `engine`. If `store` is `None`, an
    /// in-memory store is created and owned by the session.
    pub fn new(
        engine: Arc<dyn Engine>,
        options: SessionOptions,
        config: SessionConfig,
        store: Option<Arc<dyn BreakpointStore>>,
    ) -> Self {
        let dispatcher = Dispatcher::new(dbg_core::DispatcherConfig { use_operation_thread: true });
        let resolver_cache = ExpressionResolverCache::new(config.expression_resolver.clone());
        let store = store.unwrap_or_else(|| Arc::new(crate::store::InMemoryBreakpointStore::new()));

        let inner = Arc::new_cyclic(|weak: &Weak<SessionInner>| {
            let listener = Arc::new(SessionStoreListener { inner: weak.clone() });
            let listener_id = store.subscribe(listener);
            SessionInner {
                engine,
                flags: Mutex::new(Flags::default()),
                options: Mutex::new(options),
                registry: BreakEventRegistry::new(),
                event_bus: EventBus::new(),
                resolver_cache,
                store: Mutex::new(StoreBinding { store: store.clone(), listener_id }),
                dispatcher,
                config,
                output: Mutex::new(OutputState { output_writer: None, log_writer: None }),
            }
        });

        for be in store.break_events() {
            inner.registry.record_initial(&be);
        }

        Self { inner }
    }

    /// Build the channel the concrete [`Engine`] uses to call back into this
    /// session.
    pub fn callbacks(&self) -> SessionCallbacks {
        SessionCallbacks { inner: Arc::downgrade(&self.inner) }
    }

    pub fn state(&self) -> SessionState {
        self.inner.flags.lock().state
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.flags.lock().disposed
    }

    pub fn options(&self) -> SessionOptions {
        self.inner.options.lock().clone()
    }

    pub fn set_evaluation_options(&self, evaluation: dbg_core::EvaluationOptions) {
        self.inner.options.lock().evaluation = evaluation;
    }

    pub fn set_output_writer(&self, writer: impl Fn(bool, &str) + Send + Sync + 'static) {
        self.inner.output.lock().output_writer = Some(Arc::new(writer));
    }

    pub fn set_log_writer(&self, writer: impl Fn(bool, &str) + Send + Sync + 'static) {
        self.inner.output.lock().log_writer = Some(Arc::new(writer));
    }

    pub fn on_target_event(&self, kind: TargetEventKind, handler: impl Fn(&TargetEvent) + Send + Sync + 'static) {
        self.inner.event_bus.on_kind(kind, handler);
    }

    pub fn on_any_target_event(&self, handler: impl Fn(&TargetEvent) + Send + Sync + 'static) {
        self.inner.event_bus.on_any(handler);
    }

    pub fn on_target_started(&self, handler: impl Fn() + Send + Sync + 'static) {
        self.inner.event_bus.on_target_started(handler);
    }

    pub fn on_busy_state_changed(&self, handler: impl Fn(&BusyState) + Send + Sync + 'static) {
        self.inner.event_bus.on_busy_state_changed(handler);
    }

    pub fn on_break_event_status_changed(
        &self,
        handler: impl Fn(&BreakEvent, &dbg_core::BreakEventInfo) + Send + Sync + 'static,
    ) {
        self.inner.registry.on_status_changed(handler);
    }

    pub fn break_event_info(&self, be: &BreakEvent) -> Option<dbg_core::BreakEventInfo> {
        self.inner.registry.info_of(be)
    }

    /// Replace the break-event store (§4.4): the old store's bound break
    /// events are cleared (each firing a status change), the listener
    /// subscription moves to the new store, and if the session has already
    /// started every break event in the new store is (re)inserted.
    pub async fn set_store(&self, new_store: Arc<dyn BreakpointStore>) {
        let started = self.inner.flags.lock().started;

        self.inner.registry.begin_adjusting();
        self.inner.registry.clear(self.inner.engine.as_ref()).await;

        {
            let old = self.inner.store.lock();
            old.store.unsubscribe(old.listener_id);
        }

        let listener = Arc::new(SessionStoreListener { inner: Arc::downgrade(&self.inner) });
        let listener_id = new_store.subscribe(listener);
        *self.inner.store.lock() = StoreBinding { store: new_store.clone(), listener_id };
        self.inner.registry.end_adjusting();

        for be in new_store.break_events() {
            let _ = self.inner.registry.add(&be, started, self.inner.engine.as_ref()).await;
        }
    }

    /// 10ms-bounded check of whether break-event edits are currently
    /// allowed; returns `true` (read-only) if the session is too busy to
    /// answer promptly.
    pub fn is_read_only(&self) -> bool {
        SessionInner::is_read_only(&self.inner)
    }

    /// Apply an engine-reported relocation of `be`'s line (§4.3
    /// `adjust_location`), e.g. after a hot edit remaps the underlying code.
    /// Pushes the new line to the store while suppressing the echo back
    /// through this session's own store listener.
    pub fn adjust_location(&self, be: &BreakEvent, new_line: u32) {
        let store = self.inner.store.lock();
        self.inner.registry.adjust_location(be, new_line, store.store.as_ref());
    }

    fn admit(&self, command: Command) -> Result<Admission, SessionError> {
        let flags = self.inner.flags.lock();
        if flags.disposed {
            return Ok(Admission::NoOp);
        }
        flags.state.admit(command)
    }

    async fn run_command<F, Fut>(
        &self,
        command: Command,
        recovery: FailureRecovery,
        engine_op: F,
    ) -> Result<(), SessionError>
    where
        F: FnOnce(Arc<dyn Engine>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), crate::engine::EngineError>> + Send + 'static,
    {
        if self.admit(command)? == Admission::NoOp {
            return Ok(());
        }

        if command.starts_execution() {
            {
                let mut flags = self.inner.flags.lock();
                flags.state = SessionState::Running;
                flags.started = true;
            }
            self.inner.event_bus.fire_target_started();
        }

        let inner = self.inner.clone();
        let operation = command.name();
        self.inner
            .dispatcher
            .dispatch(move || async move {
                let engine = inner.engine.clone();
                if let Err(source) = engine_op(engine).await {
                    let err = SessionError::EngineFailure { operation, source };
                    tracing::error!(operation, error = %err, "engine command failed");
                    if let Some(handler) = &inner.config.exception_handler {
                        handler(&err);
                    }
                    let synthesized = match recovery {
                        FailureRecovery::ForceExited => Some(TargetEvent::new(TargetEventKind::TargetExited)),
                        FailureRecovery::ForceStopped => Some(TargetEvent::new(TargetEventKind::TargetStopped)),
                        FailureRecovery::None => None,
                    };
                    if let Some(event) = synthesized {
                        SessionInner::apply_target_event(&inner, event);
                    }
                }
            })
            .await;
        Ok(())
    }

    pub async fn run(&self, start_info: StartInfo) -> Result<(), SessionError> {
        self.run_command(Command::Run, FailureRecovery::ForceExited, move |e| async move {
            e.on_run(start_info).await
        })
        .await
    }

    pub async fn attach(&self, process_id: u32) -> Result<(), SessionError> {
        self.run_command(Command::Attach, FailureRecovery::ForceExited, move |e| async move {
            e.on_attach(process_id).await
        })
        .await
    }

    pub async fn detach(&self) -> Result<(), SessionError> {
        self.run_command(Command::Detach, FailureRecovery::None, |e| async move { e.on_detach().await }).await
    }

    pub async fn exit(&self) -> Result<(), SessionError> {
        self.run_command(Command::Exit, FailureRecovery::None, |e| async move { e.on_exit().await }).await
    }

    pub async fn stop(&self) -> Result<(), SessionError> {
        self.run_command(Command::Stop, FailureRecovery::None, |e| async move { e.on_stop().await }).await
    }

    pub async fn continue_(&self) -> Result<(), SessionError> {
        self.run_command(Command::Continue, FailureRecovery::ForceStopped, |e| async move {
            e.on_continue().await
        })
        .await
    }

    pub async fn next_line(&self) -> Result<(), SessionError> {
        self.run_command(Command::NextLine, FailureRecovery::ForceStopped, |e| async move {
            e.on_next_line().await
        })
        .await
    }

    pub async fn step_line(&self) -> Result<(), SessionError> {
        self.run_command(Command::StepLine, FailureRecovery::ForceStopped, |e| async move {
            e.on_step_line().await
        })
        .await
    }

    pub async fn next_instruction(&self) -> Result<(), SessionError> {
        self.run_command(Command::NextInstruction, FailureRecovery::ForceStopped, |e| async move {
            e.on_next_instruction().await
        })
        .await
    }

    pub async fn step_instruction(&self) -> Result<(), SessionError> {
        self.run_command(Command::StepInstruction, FailureRecovery::ForceStopped, |e| async move {
            e.on_step_instruction().await
        })
        .await
    }

    pub async fn finish(&self) -> Result<(), SessionError> {
        self.run_command(Command::Finish, FailureRecovery::ForceExited, |e| async move { e.on_finish().await })
            .await
    }

    pub async fn set_active_thread(&self, pid: u32, tid: u64) -> Result<(), SessionError> {
        self.run_command(Command::SetActiveThread, FailureRecovery::None, move |e| async move {
            e.on_set_active_thread(pid, tid).await
        })
        .await
    }

    /// Cancel any in-flight asynchronous evaluations. Fire-and-forget: the
    /// engine's `on_cancel_async_evaluations` never reports failure.
    pub async fn cancel_async_evaluations(&self) {
        match self.admit(Command::CancelAsyncEvaluations) {
            Ok(Admission::Proceed) => {}
            _ => return,
        }
        let inner = self.inner.clone();
        self.inner.dispatcher.dispatch(move || async move { inner.engine.on_cancel_async_evaluations().await }).await;
    }

    pub fn can_cancel_async_evaluations(&self) -> bool {
        self.inner.engine.can_cancel_async_evaluations()
    }

    /// Memoized until the next [`TargetEvent`] of any kind arrives. The
    /// returned list is [`Attached`] to this session right after the engine
    /// call returns, per §3.
    pub async fn get_processes(&self) -> Result<Attached<Vec<ProcessInfo>>, SessionError> {
        if let Some(cached) = self.inner.flags.lock().process_cache.clone() {
            return Ok(Attached::new(cached, &self.inner));
        }
        let processes = self
            .inner
            .engine
            .on_get_processes()
            .await
            .map_err(|source| SessionError::EngineFailure { operation: "get_processes", source })?;
        self.inner.flags.lock().process_cache = Some(processes.clone());
        Ok(Attached::new(processes, &self.inner))
    }

    pub async fn get_threads(&self, pid: u32) -> Result<Attached<Vec<ThreadInfo>>, SessionError> {
        let threads = self
            .inner
            .engine
            .on_get_threads(pid)
            .await
            .map_err(|source| SessionError::EngineFailure { operation: "get_threads", source })?;
        Ok(Attached::new(threads, &self.inner))
    }

    pub async fn get_backtrace(&self, pid: u32, tid: u64) -> Result<Attached<Backtrace>, SessionError> {
        let backtrace = self
            .inner
            .engine
            .on_get_thread_backtrace(pid, tid)
            .await
            .map_err(|source| SessionError::EngineFailure { operation: "get_backtrace", source })?;
        Ok(Attached::new(backtrace, &self.inner))
    }

    pub async fn disassemble_file(&self, path: &str) -> Result<Option<Vec<AssemblyLine>>, SessionError> {
        if self.admit(Command::Disassemble)? == Admission::NoOp {
            return Ok(None);
        }
        self.inner
            .engine
            .on_disassemble_file(path)
            .await
            .map_err(|source| SessionError::EngineFailure { operation: "disassemble_file", source })
    }

    /// Resolve `expression` at `location` through the cache, falling back to
    /// the engine if no local resolver hook is configured or it declines.
    pub async fn resolve_expression(&self, expression: &str, location: &str) -> Result<String, SessionError> {
        if self.admit(Command::ResolveExpression)? == Admission::NoOp {
            return Ok(expression.to_string());
        }
        let locally_resolved = self.inner.resolver_cache.resolve(expression, location);
        if locally_resolved != expression {
            return Ok(locally_resolved);
        }
        self.inner
            .engine
            .on_resolve_expression(expression, location)
            .await
            .map_err(|source| SessionError::EngineFailure { operation: "resolve_expression", source })
    }

    /// Release resources immediately: further commands become no-ops and
    /// the store subscription is detached. Safe to call more than once.
    pub fn dispose(&self) {
        let mut flags = self.inner.flags.lock();
        if flags.disposed {
            return;
        }
        flags.disposed = true;
        drop(flags);
        let binding = self.inner.store.lock();
        binding.store.unsubscribe(binding.listener_id);
    }
}

fn guarded(label: &'static str, f: impl FnOnce() + panic::UnwindSafe) {
    if panic::catch_unwind(f).is_err() {
        tracing::error!(callback = label, "engine callback panicked; event dropped");
    }
}

impl SessionCallbacks {
    pub fn notify_target_event(&self, event: TargetEvent) {
        let Some(inner) = self.inner.upgrade() else { return };
        guarded("notify_target_event", AssertUnwindSafe(|| SessionInner::apply_target_event(&inner, event)));
    }

    /// The engine's initial-ready signal, reporting the first thread
    /// observed for the target just started (§6 `notify_started`).
    pub fn notify_started(&self, thread: Option<ThreadInfo>) {
        let Some(inner) = self.inner.upgrade() else { return };
        guarded("notify_started", AssertUnwindSafe(|| {
            let mut event = TargetEvent::new(TargetEventKind::TargetReady);
            if let Some(thread) = thread {
                event = event.with_thread(thread);
            }
            SessionInner::apply_target_event(&inner, event);
        }));
    }

    /// The engine relocated a bound breakpoint's line (e.g. a hot edit
    /// remapped the underlying code). A no-op if `handle` is not registered.
    pub fn notify_break_event_relocated(&self, handle: &EngineHandle, new_line: u32) {
        let Some(inner) = self.inner.upgrade() else { return };
        guarded("notify_break_event_relocated", AssertUnwindSafe(|| {
            if let Some(be) = inner.registry.find_by_handle(handle) {
                let store = inner.store.lock();
                inner.registry.adjust_location(&be, new_line, store.store.as_ref());
            }
        }));
    }

    pub fn notify_target_output(&self, is_stderr: bool, text: &str) {
        let Some(inner) = self.inner.upgrade() else { return };
        guarded("notify_target_output", AssertUnwindSafe(|| {
            if let Some(writer) = &inner.output.lock().output_writer {
                writer(is_stderr, text);
            }
        }));
    }

    pub fn notify_debugger_output(&self, is_stderr: bool, text: &str) {
        let Some(inner) = self.inner.upgrade() else { return };
        guarded("notify_debugger_output", AssertUnwindSafe(|| {
            if let Some(writer) = &inner.output.lock().log_writer {
                writer(is_stderr, text);
            }
        }));
    }

    pub fn set_busy_state(&self, is_busy: bool, description: Option<String>) {
        let Some(inner) = self.inner.upgrade() else { return };
        guarded("set_busy_state", AssertUnwindSafe(|| {
            inner.event_bus.fire_busy_state_changed(&BusyState { is_busy, description: description.clone() });
        }));
    }

    pub fn notify_break_event_status(&self, handle: &EngineHandle, is_valid: bool, message: Option<String>) {
        let Some(inner) = self.inner.upgrade() else { return };
        guarded("notify_break_event_status", AssertUnwindSafe(|| {
            if let Some(be) = inner.registry.find_by_handle(handle) {
                inner.registry.set_status(&be, is_valid, message.clone());
                inner.store.lock().store.notify_status_changed(&be);
            }
        }));
    }

    /// An engine-resolved tracepoint fired at `handle` with `text`.
    pub fn notify_trace_point_hit(&self, handle: &EngineHandle, text: &str) {
        let Some(inner) = self.inner.upgrade() else { return };
        guarded("notify_trace_point_hit", AssertUnwindSafe(|| {
            if let Some(be) = inner.registry.find_by_handle(handle) {
                be.set_last_trace_value(text);
                if let Some(handler) = &inner.config.breakpoint_trace_handler {
                    handler(&be, text);
                }
            }
        }));
    }

    /// A custom breakpoint action fired at `handle`; returns whether a
    /// handler consumed it.
    pub fn notify_custom_break_event_action(&self, action_id: &str, handle: &EngineHandle) -> bool {
        let Some(inner) = self.inner.upgrade() else { return false };
        let Some(be) = inner.registry.find_by_handle(handle) else { return false };
        match &inner.config.custom_break_event_hit_handler {
            Some(handler) => handler(action_id, &be),
            None => false,
        }
    }

    /// A break event's source file became available; retries any unbound
    /// insertions matching `path`. Spawns onto the async runtime since the
    /// retry needs an engine call and this callback itself is synchronous.
    pub fn notify_source_file_loaded(&self, path: &str) {
        let Some(inner) = self.inner.upgrade() else { return };
        let path = path.to_string();
        tokio::spawn(async move {
            let policy = inner.options.lock().path_case_policy;
            inner.registry.source_file_loaded(&path, policy, inner.engine.as_ref()).await;
        });
    }

    pub fn notify_source_file_unloaded(&self, path: &str) {
        let Some(inner) = self.inner.upgrade() else { return };
        guarded("notify_source_file_unloaded", AssertUnwindSafe(|| {
            let policy = inner.options.lock().path_case_policy;
            inner.registry.source_file_unloaded(path, policy);
        }));
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
