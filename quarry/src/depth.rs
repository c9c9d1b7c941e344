//! Depth tracking shared by cooperating recursive arbitraries.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// Shared recursion depth counter.
///
/// Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct DepthContext {
    depth: Rc<Cell<usize>>,
}

impl DepthContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current depth
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    /// Go one level deeper until the returned guard is dropped
    pub fn enter(&self) -> DepthGuard {
        self.depth.set(self.depth.get() + 1);
        DepthGuard {
            depth: Rc::clone(&self.depth),
        }
    }

    /// Whether both handles share the same counter
    pub fn same_as(&self, other: &DepthContext) -> bool {
        Rc::ptr_eq(&self.depth, &other.depth)
    }
}

/// Releases one level of depth on drop, including while unwinding
#[must_use = "depth is released as soon as the guard is dropped"]
pub struct DepthGuard {
    depth: Rc<Cell<usize>>,
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

/// How an arbitrary finds the depth counter it shares with others
#[derive(Debug, Clone)]
pub enum DepthIdentifier {
    /// Share this exact counter
    Context(DepthContext),
    /// Share the counter registered under this key on the current thread
    Key(String),
}

impl From<DepthContext> for DepthIdentifier {
    fn from(context: DepthContext) -> Self {
        DepthIdentifier::Context(context)
    }
}

impl From<&str> for DepthIdentifier {
    fn from(key: &str) -> Self {
        DepthIdentifier::Key(key.to_string())
    }
}

impl From<String> for DepthIdentifier {
    fn from(key: String) -> Self {
        DepthIdentifier::Key(key)
    }
}

/// A fresh identifier owning a brand new counter
pub fn create_depth_identifier() -> DepthIdentifier {
    DepthIdentifier::Context(DepthContext::new())
}

// Keyed counters are never evicted; keys are expected to be few and static.
thread_local! {
    static DEPTH_CONTEXTS: RefCell<HashMap<String, DepthContext>> = RefCell::new(HashMap::new());
}

/// Resolve an identifier into its counter.
///
/// `None` yields a private counter, a key yields the counter registered for it
/// (created on first use).
pub fn get_depth_context_for(identifier: Option<&DepthIdentifier>) -> DepthContext {
    match identifier {
        None => DepthContext::new(),
        Some(DepthIdentifier::Context(context)) => context.clone(),
        Some(DepthIdentifier::Key(key)) => DEPTH_CONTEXTS.with(|contexts| {
            let mut contexts = contexts.borrow_mut();
            if let Some(context) = contexts.get(key) {
                return context.clone();
            }
            tracing::trace!(key = %key, "registering depth context");
            let context = DepthContext::new();
            contexts.insert(key.clone(), context.clone());
            context
        }),
    }
}
