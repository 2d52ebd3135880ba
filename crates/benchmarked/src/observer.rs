//! Observer interface and stock observers.
//!
//! The core hands every successful instrumented call to exactly one
//! [`Observer`]. Formatting and storage are the observer's business:
//!
//! - [`LogObserver`] emits one `tracing` event per call
//! - [`Recorder`] keeps owned copies of every notification
//! - [`observer_fn`] adapts a closure

use crate::measurement::Measurement;
use crate::name::MethodName;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Mutex;
use std::time::Duration;
use tracing::Level;

/// Receives one notification per successfully completed instrumented call.
pub trait Observer: Send + Sync {
    /// Called after the wrapped body returned `Ok`.
    ///
    /// `args` holds the positional arguments in call order; a forwarded
    /// block is not part of it. Nothing returned from here is consulted.
    fn benchmark_taken(
        &self,
        measurement: &Measurement,
        receiver: &dyn Debug,
        method: &MethodName,
        args: &[&dyn Debug],
        result: &dyn Debug,
    );
}

/// Observer backed by a closure. Build one with [`observer_fn`].
pub struct FnObserver<F>(F);

/// Wrap a closure as an observer.
///
/// ```rust
/// use benchmarked::{observer_fn, ConfigStore};
/// use std::sync::Arc;
///
/// let store = ConfigStore::new();
/// store.configure(|config| {
///     config.observer = Some(Arc::new(observer_fn(|m, _recv, method, _args, _result| {
///         println!("{method} took {:?}", m.real);
///     })));
/// });
/// ```
pub fn observer_fn<F>(f: F) -> FnObserver<F>
where
    F: Fn(&Measurement, &dyn Debug, &MethodName, &[&dyn Debug], &dyn Debug) + Send + Sync,
{
    FnObserver(f)
}

impl<F> Observer for FnObserver<F>
where
    F: Fn(&Measurement, &dyn Debug, &MethodName, &[&dyn Debug], &dyn Debug) + Send + Sync,
{
    fn benchmark_taken(
        &self,
        measurement: &Measurement,
        receiver: &dyn Debug,
        method: &MethodName,
        args: &[&dyn Debug],
        result: &dyn Debug,
    ) {
        (self.0)(measurement, receiver, method, args, result)
    }
}

// =============================================================================
// Log Observer
// =============================================================================

/// Emits a `tracing` event for every instrumented call.
///
/// Calls slower than the optional threshold are logged at `WARN` regardless
/// of the configured level.
#[derive(Debug, Clone)]
pub struct LogObserver {
    level: Level,
    slow_threshold: Option<Duration>,
}

impl LogObserver {
    /// Log at `DEBUG` with no slow-call threshold.
    pub fn new() -> Self {
        Self {
            level: Level::DEBUG,
            slow_threshold: None,
        }
    }

    /// Set the level used for ordinary calls.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Log calls whose wall time exceeds `threshold` at `WARN`.
    pub fn with_slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow_threshold = Some(threshold);
        self
    }

    /// Level an event for `measurement` is emitted at.
    pub fn level_for(&self, measurement: &Measurement) -> Level {
        match self.slow_threshold {
            Some(threshold) if measurement.real > threshold => Level::WARN,
            _ => self.level,
        }
    }
}

impl Default for LogObserver {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! emit_call_event {
    ($level:expr, $measurement:expr, $receiver:expr, $method:expr, $args:expr, $result:expr) => {
        tracing::event!(
            target: "benchmarked",
            $level,
            method = %$method,
            real_ms = $measurement.real_ms(),
            cpu_us = $measurement.total().as_micros() as u64,
            receiver = ?$receiver,
            args = ?$args,
            result = ?$result,
            "call benchmarked"
        )
    };
}

impl Observer for LogObserver {
    fn benchmark_taken(
        &self,
        measurement: &Measurement,
        receiver: &dyn Debug,
        method: &MethodName,
        args: &[&dyn Debug],
        result: &dyn Debug,
    ) {
        // tracing needs a constant level per callsite
        match self.level_for(measurement) {
            Level::ERROR => emit_call_event!(Level::ERROR, measurement, receiver, method, args, result),
            Level::WARN => emit_call_event!(Level::WARN, measurement, receiver, method, args, result),
            Level::INFO => emit_call_event!(Level::INFO, measurement, receiver, method, args, result),
            Level::DEBUG => emit_call_event!(Level::DEBUG, measurement, receiver, method, args, result),
            _ => emit_call_event!(Level::TRACE, measurement, receiver, method, args, result),
        }
    }
}

// =============================================================================
// Recorder
// =============================================================================

/// An owned copy of one notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Measurement handed to the observer
    pub measurement: Measurement,
    /// `Debug` rendering of the receiver
    pub receiver: String,
    /// Address of the receiver, for identity checks
    #[serde(skip)]
    pub receiver_addr: usize,
    /// Facing method name
    pub method: MethodName,
    /// `Debug` rendering of each positional argument
    pub args: Vec<String>,
    /// `Debug` rendering of the returned value
    pub result: String,
}

impl Notification {
    /// Whether this notification was produced for `receiver` (by identity).
    pub fn is_from<T>(&self, receiver: &T) -> bool {
        self.receiver_addr == receiver as *const T as *const () as usize
    }
}

/// Observer that stores every notification in arrival order.
#[derive(Debug, Default)]
pub struct Recorder {
    notifications: Mutex<Vec<Notification>>,
}

impl Recorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .map(|recorded| recorded.clone())
            .unwrap_or_default()
    }

    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .map(|mut recorded| std::mem::take(&mut *recorded))
            .unwrap_or_default()
    }

    /// Number of recorded notifications.
    pub fn len(&self) -> usize {
        self.notifications.lock().map(|recorded| recorded.len()).unwrap_or(0)
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        if let Ok(mut recorded) = self.notifications.lock() {
            recorded.clear();
        }
    }
}

impl Observer for Recorder {
    fn benchmark_taken(
        &self,
        measurement: &Measurement,
        receiver: &dyn Debug,
        method: &MethodName,
        args: &[&dyn Debug],
        result: &dyn Debug,
    ) {
        let notification = Notification {
            measurement: *measurement,
            receiver: format!("{receiver:?}"),
            receiver_addr: receiver as *const dyn Debug as *const () as usize,
            method: method.clone(),
            args: args.iter().map(|arg| format!("{arg:?}")).collect(),
            result: format!("{result:?}"),
        };

        if let Ok(mut recorded) = self.notifications.lock() {
            recorded.push(notification);
        }
    }
}
