// SPDX-License-Identifier: MIT

//! Memoizes resolved identifiers per `(expression, location)` and looks up
//! the right expression evaluator for a stack frame by source extension.
//!
//! Expression evaluation internals are out of scope for this crate — only
//! the resolver hook surface and the per-extension evaluator lookup are
//! specified; `Evaluator` is therefore an opaque, caller-supplied type.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// A user-supplied hook resolving an identifier at a source location.
/// `Ok(None)` means the resolver declined (the original expression is used
/// verbatim); `Err` is a resolver failure, logged and never cached.
pub type ResolverHook = dyn Fn(&str, &str) -> Result<Option<String>, String> + Send + Sync;

/// Memoizes `(expression, location)` -> resolved expression (or "declined").
#[derive(Default)]
pub struct ExpressionResolverCache {
    cache: Mutex<HashMap<(String, String), Option<String>>>,
    resolver: Option<Arc<ResolverHook>>,
}

impl ExpressionResolverCache {
    pub fn new(resolver: Option<Arc<ResolverHook>>) -> Self {
        Self { cache: Mutex::new(HashMap::new()), resolver }
    }

    /// Resolve `expression` at `location`, consulting the cache first.
    /// Idempotent: repeated calls with the same key never re-invoke the
    /// resolver hook.
    pub fn resolve(&self, expression: &str, location: &str) -> String {
        let key = (expression.to_string(), location.to_string());
        if let Some(cached) = self.cache.lock().get(&key) {
            return cached.clone().unwrap_or_else(|| expression.to_string());
        }

        let Some(resolver) = &self.resolver else {
            return expression.to_string();
        };

        match resolver(expression, location) {
            Ok(resolved) => {
                self.cache.lock().insert(key, resolved.clone());
                resolved.unwrap_or_else(|| expression.to_string())
            }
            Err(message) => {
                tracing::warn!(expression, location, error = %message, "expression resolver failed");
                expression.to_string()
            }
        }
    }

    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Maps a source file extension to an evaluator, falling back to a default
/// for files with an empty or absent extension.
pub struct EvaluatorLookup<E> {
    default: E,
    by_extension: HashMap<String, E>,
}

impl<E: Clone> EvaluatorLookup<E> {
    pub fn new(default: E) -> Self {
        Self { default, by_extension: HashMap::new() }
    }

    pub fn register(&mut self, extension: impl Into<String>, evaluator: E) {
        self.by_extension.insert(extension.into(), evaluator);
    }

    /// Look up the evaluator for a stack frame's source filename.
    pub fn for_file(&self, filename: &str) -> E {
        let extension = std::path::Path::new(filename).extension().and_then(|e| e.to_str());
        match extension {
            Some(ext) if !ext.is_empty() => {
                self.by_extension.get(ext).cloned().unwrap_or_else(|| self.default.clone())
            }
            _ => self.default.clone(),
        }
    }
}

#[cfg(test)]
#[path = "resolver_cache_tests.rs"]
mod tests;
