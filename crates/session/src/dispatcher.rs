// SPDX-License-Identifier: MIT

//! Serializes mutating session operations, optionally through a worker task.
//!
//! With `use_operation_thread = true` (the default), dispatched actions are
//! enqueued and the caller returns without waiting for completion; a single
//! worker task drains the queue in submission order. With `false`, the
//! caller executes the action inline and only returns once it completes.
//! Either way, actions never re-enter the dispatcher while it holds the
//! session lock — the session lock is acquired and released entirely
//! *inside* the action, never around `dispatch` itself.

use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;

use dbg_core::DispatcherConfig;

type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type Action = Box<dyn FnOnce() -> BoxFuture + Send>;

pub struct Dispatcher {
    config: DispatcherConfig,
    tx: Option<mpsc::UnboundedSender<Action>>,
    worker: Option<tokio::task::JoinHandle<()>>,
}

impl Dispatcher {
    pub fn new(config: DispatcherConfig) -> Self {
        if config.use_operation_thread {
            let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
            let worker = tokio::spawn(async move {
                while let Some(action) = rx.recv().await {
                    action().await;
                }
            });
            Self { config, tx: Some(tx), worker: Some(worker) }
        } else {
            Self { config, tx: None, worker: None }
        }
    }

    pub fn use_operation_thread(&self) -> bool {
        self.config.use_operation_thread
    }

    /// Submit `action`. In worker mode this enqueues and returns
    /// immediately (the returned future resolves without waiting for
    /// `action` to run); in inline mode it runs `action` to completion
    /// before returning.
    pub async fn dispatch<F, Fut>(&self, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        match &self.tx {
            Some(tx) => {
                let boxed: Action = Box::new(move || Box::pin(action()));
                // The worker owns the session after this; a closed channel
                // only happens post-dispose, where dropping the action is
                // the correct no-op.
                let _ = tx.send(boxed);
            }
            None => action().await,
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        // Dropping `tx` closes the channel, so the worker's `rx.recv()`
        // loop exits on its own; no need to abort or join it here.
        self.tx.take();
        self.worker.take();
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
