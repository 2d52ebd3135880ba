//! Configuration store holding the observer.
//!
//! A [`ConfigStore`] is a cheap, cloneable handle; every clone sees the same
//! configuration. Dispatchers read it once per call. A process-wide store is
//! available through [`global_store`] for code that does not thread a store
//! through explicitly.

use crate::observer::Observer;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};

/// Global configuration store
static GLOBAL_STORE: OnceLock<ConfigStore> = OnceLock::new();

/// Get the process-wide configuration store.
pub fn global_store() -> &'static ConfigStore {
    GLOBAL_STORE.get_or_init(ConfigStore::new)
}

/// Configure the process-wide store.
///
/// ```rust
/// use benchmarked::{LogObserver, configure, reset_configuration};
/// use std::sync::Arc;
///
/// configure(|config| config.observer = Some(Arc::new(LogObserver::new())));
/// reset_configuration();
/// ```
pub fn configure<F>(mutator: F)
where
    F: FnOnce(&mut Configuration),
{
    global_store().configure(mutator);
}

/// Clear the process-wide observer.
pub fn reset_configuration() {
    global_store().reset();
}

/// Observer currently configured on the process-wide store.
pub fn current_observer() -> Option<Arc<dyn Observer>> {
    global_store().current_observer()
}

/// Instrumentation settings.
#[derive(Clone, Default)]
pub struct Configuration {
    /// Receiver of call notifications; `None` disables instrumentation
    pub observer: Option<Arc<dyn Observer>>,
}

impl Configuration {
    /// Empty configuration (instrumentation disabled).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the observer.
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Whether an observer is configured.
    pub fn is_enabled(&self) -> bool {
        self.observer.is_some()
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("observer", &self.observer.as_ref().map(|_| "<observer>"))
            .finish()
    }
}

/// Shared handle to a [`Configuration`].
///
/// No ordering is promised between concurrent `configure` calls; the last
/// writer wins.
#[derive(Clone, Default)]
pub struct ConfigStore {
    inner: Arc<RwLock<Configuration>>,
}

impl ConfigStore {
    /// Create a store with no observer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `configuration`.
    pub fn with_configuration(configuration: Configuration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(configuration)),
        }
    }

    /// Let `mutator` edit the configuration.
    ///
    /// The mutator works on a copy that is swapped in afterwards, so it may
    /// read this store without deadlocking.
    pub fn configure<F>(&self, mutator: F)
    where
        F: FnOnce(&mut Configuration),
    {
        let mut next = self.snapshot();
        mutator(&mut next);

        tracing::debug!(
            target: "benchmarked::config",
            enabled = next.is_enabled(),
            "configuration updated"
        );

        if let Ok(mut current) = self.inner.write() {
            *current = next;
        }
    }

    /// Clear the observer. Idempotent.
    pub fn reset(&self) {
        if let Ok(mut current) = self.inner.write() {
            current.observer = None;
        }
        tracing::debug!(target: "benchmarked::config", "configuration reset");
    }

    /// The configured observer, if any.
    #[inline]
    pub fn current_observer(&self) -> Option<Arc<dyn Observer>> {
        self.inner
            .read()
            .ok()
            .and_then(|current| current.observer.clone())
    }

    /// Copy of the current configuration.
    pub fn snapshot(&self) -> Configuration {
        self.inner
            .read()
            .map(|current| current.clone())
            .unwrap_or_default()
    }
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConfigStore").field(&self.snapshot()).finish()
    }
}
