//! Process-wide generation parameters read by the size resolver.
//!
//! Parameters live in a thread-local handle rather than a true global so that
//! tests running on separate threads never observe each other's settings. The
//! resolver only ever reads them; callers own their lifecycle.

use std::cell::RefCell;

use crate::size::Size;

/// Ambient defaults for size resolution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalParameters {
    /// Baseline size used when an arbitrary does not specify one
    pub base_size: Option<Size>,
    /// Resolve to the explicit maximum when one is given and no size is set
    pub default_size_to_max_when_max_specified: Option<bool>,
}

impl GlobalParameters {
    /// Create empty parameters (every field falls back to its default)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the baseline size
    pub fn with_base_size(mut self, size: Size) -> Self {
        self.base_size = Some(size);
        self
    }

    /// Opt in or out of defaulting to `max` when a maximum is specified
    pub fn with_default_size_to_max_when_max_specified(mut self, enabled: bool) -> Self {
        self.default_size_to_max_when_max_specified = Some(enabled);
        self
    }
}

/// Holder for the current thread's parameters
#[derive(Debug, Default)]
struct ConfigManager {
    parameters: Option<GlobalParameters>,
}

// Thread-local configuration manager (doc comment not allowed on thread_local!)
thread_local! {
    static CONFIG_MANAGER: RefCell<ConfigManager> = RefCell::new(ConfigManager::default());
}

/// Replace the parameters for the current thread
pub fn configure_global(parameters: GlobalParameters) {
    tracing::debug!(?parameters, "configure_global");
    CONFIG_MANAGER.with(|manager| manager.borrow_mut().parameters = Some(parameters));
}

/// Read the parameters for the current thread, if any were configured
pub fn read_configure_global() -> Option<GlobalParameters> {
    CONFIG_MANAGER.with(|manager| manager.borrow().parameters.clone())
}

/// Forget any configured parameters for the current thread
pub fn reset_configure_global() {
    tracing::debug!("reset_configure_global");
    CONFIG_MANAGER.with(|manager| manager.borrow_mut().parameters = None);
}

/// Run `f` with `parameters` installed, restoring the previous ones afterwards
/// (including when `f` panics).
pub fn with_global_parameters<R>(parameters: GlobalParameters, f: impl FnOnce() -> R) -> R {
    struct Restore(Option<GlobalParameters>);

    impl Drop for Restore {
        fn drop(&mut self) {
            let previous = self.0.take();
            CONFIG_MANAGER.with(|manager| manager.borrow_mut().parameters = previous);
        }
    }

    let _restore = Restore(read_configure_global());
    configure_global(parameters);
    f()
}
