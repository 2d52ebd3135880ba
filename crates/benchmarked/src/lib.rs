//! Transparent call-level instrumentation
//!
//! This crate wraps methods so each call is timed and reported to a
//! pluggable observer, without changing what callers see:
//! - Arguments, return values and errors pass through untouched
//! - Optional blocks are forwarded to the original body
//! - Visibility (public, protected, private) carries over to every slot
//!
//! Nothing is reported while no observer is configured. Failed calls are
//! never reported.
//!
//! # Example
//!
//! ```rust
//! use benchmarked::{ConfigStore, Error, Installer, Method, NoBlock, Recorder};
//! use std::sync::Arc;
//!
//! #[derive(Debug)]
//! struct Cart {
//!     items: Vec<u32>,
//! }
//!
//! let total = Method::public("total", |cart: &Cart, (): (), _: Option<NoBlock>| {
//!     Ok::<u32, Error>(cart.items.iter().sum())
//! })?;
//!
//! let store = ConfigStore::new();
//! let total = Installer::new(store.clone()).install(total)?;
//!
//! let recorder = Arc::new(Recorder::new());
//! store.configure(|config| config.observer = Some(recorder.clone()));
//!
//! let cart = Cart { items: vec![3, 4] };
//! assert_eq!(total.call(&cart, (), None)?, 7);
//! assert_eq!(recorder.notifications()[0].result, "7");
//! # Ok::<(), Error>(())
//! ```
//!
//! # Modules
//!
//! - [`config`] - Configuration store and the process-wide instance
//! - [`dispatch`] - Timing and observer notification for one call
//! - [`install`] - Wrapping methods into facing/original/transient slots
//! - [`observer`] - Observer trait, log observer and recorder

mod args;
pub mod config;
pub mod dispatch;
mod error;
pub mod install;
mod measurement;
mod method;
mod name;
pub mod observer;

pub use args::Arguments;
pub use config::{
    configure, current_observer, global_store, reset_configuration, ConfigStore, Configuration,
};
pub use dispatch::Dispatcher;
pub use error::{Error, Result};
pub use install::{Installer, Instrumented};
pub use measurement::{Measurement, Stopwatch};
pub use method::{Access, Method, NoBlock, Visibility};
pub use name::{MethodName, MARKERS};
pub use observer::{observer_fn, FnObserver, LogObserver, Notification, Observer, Recorder};
