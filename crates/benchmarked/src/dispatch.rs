//! Instrumentation dispatcher: times one invocation and notifies the observer.

use crate::args::Arguments;
use crate::config::{global_store, ConfigStore};
use crate::measurement::Stopwatch;
use crate::name::MethodName;
use std::fmt::Debug;

/// Wraps single invocations, reading the observer from its store on every call.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    store: ConfigStore,
}

impl Dispatcher {
    /// Dispatcher reading from `store`.
    pub fn new(store: ConfigStore) -> Self {
        Self { store }
    }

    /// Dispatcher reading from the process-wide store.
    pub fn global() -> Self {
        Self::new(global_store().clone())
    }

    /// The store this dispatcher reads.
    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Run `invoke` with `args` and report the call.
    ///
    /// Without an observer this is exactly `invoke(args)`: no clock is read,
    /// no copy of the arguments is kept. With one, the call is timed and,
    /// if it returns `Ok`, the observer receives the measurement, receiver,
    /// method, arguments and result. Errors and panics reach the caller
    /// untouched and are never reported.
    #[inline]
    pub fn dispatch<R, A, T, E, F>(
        &self,
        receiver: &R,
        method: &MethodName,
        args: A,
        invoke: F,
    ) -> Result<T, E>
    where
        R: Debug,
        A: Arguments + Clone,
        T: Debug,
        F: FnOnce(A) -> Result<T, E>,
    {
        let Some(observer) = self.store.current_observer() else {
            return invoke(args);
        };

        let observed_args = args.clone();
        let stopwatch = Stopwatch::start();
        let result = invoke(args)?;
        let measurement = stopwatch.stop();

        tracing::trace!(
            target: "benchmarked::dispatch",
            method = %method,
            real_us = measurement.real.as_micros() as u64,
            "notifying observer"
        );

        observer.benchmark_taken(
            &measurement,
            receiver,
            method,
            &observed_args.positional(),
            &result,
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::error::Error;
    use crate::observer::Recorder;
    use std::sync::Arc;

    #[derive(Debug)]
    struct Ledger;

    fn recording_dispatcher() -> (Dispatcher, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::new());
        let store =
            ConfigStore::with_configuration(Configuration::new().with_observer(recorder.clone()));
        (Dispatcher::new(store), recorder)
    }

    #[test]
    fn test_no_observer_passes_through() {
        let dispatcher = Dispatcher::new(ConfigStore::new());
        let method = MethodName::new("total").unwrap();

        let result: Result<u32, Error> =
            dispatcher.dispatch(&Ledger, &method, (2u32, 3u32), |(a, b)| Ok(a + b));
        assert_eq!(result, Ok(5));
    }

    #[test]
    fn test_observer_notified_once() {
        let (dispatcher, recorder) = recording_dispatcher();
        let method = MethodName::new("total").unwrap();
        let ledger = Ledger;

        let result: Result<u32, Error> =
            dispatcher.dispatch(&ledger, &method, (2u32, 3u32), |(a, b)| Ok(a + b));
        assert_eq!(result, Ok(5));

        let recorded = recorder.notifications();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].method, "total");
        assert_eq!(recorded[0].args, vec!["2", "3"]);
        assert_eq!(recorded[0].result, "5");
        assert_eq!(recorded[0].receiver, "Ledger");
    }

    #[test]
    fn test_error_not_reported() {
        let (dispatcher, recorder) = recording_dispatcher();
        let method = MethodName::new("each").unwrap();

        let result: Result<(), Error> =
            dispatcher.dispatch(&Ledger, &method, (), |()| Err(Error::MissingBlock));
        assert_eq!(result, Err(Error::MissingBlock));
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_receiver_passed_by_identity() {
        let (dispatcher, recorder) = recording_dispatcher();
        let method = MethodName::new("len").unwrap();
        let receiver = String::from("abc");

        let result: Result<usize, Error> =
            dispatcher.dispatch(&receiver, &method, (), |()| Ok(receiver.len()));
        assert_eq!(result, Ok(3));

        let recorded = recorder.notifications();
        assert_eq!(recorded[0].receiver, "\"abc\"");
        assert!(recorded[0].is_from(&receiver));
    }

    #[test]
    fn test_observer_read_per_call() {
        let (dispatcher, recorder) = recording_dispatcher();
        let method = MethodName::new("noop").unwrap();

        let _: Result<(), Error> = dispatcher.dispatch(&Ledger, &method, (), |()| Ok(()));
        dispatcher.store().reset();
        let _: Result<(), Error> = dispatcher.dispatch(&Ledger, &method, (), |()| Ok(()));

        assert_eq!(recorder.len(), 1);
    }
}
