//! Method wrapping installer.
//!
//! Installing on a method produces three slots sharing its visibility:
//!
//! | slot        | name                          | behaviour                      |
//! |-------------|-------------------------------|--------------------------------|
//! | `facing`    | `M`                           | timed and reported             |
//! | `original`  | `M_without_benchmark`         | the untouched original body    |
//! | `transient` | `M_with_benchmark`            | same body as `facing`          |
//!
//! A trailing `?`, `!` or `=` on `M` stays at the end of every derived name.
//! Notifications always carry `M`, whichever instrumented slot was called.

use crate::args::Arguments;
use crate::config::ConfigStore;
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::method::{Body, Method, Role, Visibility};
use crate::name::MethodName;
use std::fmt::Debug;
use std::sync::Arc;

/// Installs instrumentation on methods, reporting through one store.
#[derive(Debug, Clone, Default)]
pub struct Installer {
    dispatcher: Dispatcher,
}

impl Installer {
    /// Installer reporting through `store`.
    pub fn new(store: ConfigStore) -> Self {
        Self {
            dispatcher: Dispatcher::new(store),
        }
    }

    /// Installer reporting through the process-wide store.
    pub fn global() -> Self {
        Self {
            dispatcher: Dispatcher::global(),
        }
    }

    /// Wrap `method` so every call through the facing name is timed and
    /// reported.
    ///
    /// Installing twice is not supported: a facing or transient handle is
    /// rejected with [`Error::AlreadyInstrumented`].
    ///
    /// The argument pack must be `Clone`, since a copy is kept for the
    /// observer while the original moves into the body. Methods whose
    /// positional arguments are `&mut` references, boxed closures or other
    /// non-`Clone` handles cannot be instrumented. Pass such a value as the
    /// block instead, which carries no `Clone` bound:
    ///
    /// ```compile_fail
    /// use benchmarked::{Error, Installer, Method, NoBlock};
    ///
    /// #[derive(Debug)]
    /// struct Sink;
    ///
    /// let take = Method::public("take", |_: &Sink, (v,): (Box<dyn Fn() -> u32>,), _: Option<NoBlock>| {
    ///     Ok::<_, Error>(v())
    /// })?;
    /// Installer::global().install(take)?;
    /// # Ok::<(), Error>(())
    /// ```
    pub fn install<R, A, B, T, E>(
        &self,
        method: Method<R, A, B, T, E>,
    ) -> Result<Instrumented<R, A, B, T, E>>
    where
        R: Debug + 'static,
        A: Arguments + Clone + 'static,
        B: 'static,
        T: Debug + 'static,
        E: 'static,
    {
        if method.is_instrumented() {
            return Err(Error::AlreadyInstrumented(method.name().clone()));
        }

        let facing_name = method.name().clone();
        let visibility = method.visibility();

        let original = Arc::clone(method.body());
        let dispatcher = self.dispatcher.clone();
        let reported_name = facing_name.clone();
        let instrumented: Arc<Body<R, A, B, T, E>> =
            Arc::new(move |receiver: &R, args: A, block: Option<B>| {
                dispatcher.dispatch(receiver, &reported_name, args, |args| {
                    original(receiver, args, block)
                })
            });

        tracing::debug!(
            target: "benchmarked::install",
            method = %facing_name,
            visibility = %visibility,
            "method instrumented"
        );

        Ok(Instrumented {
            original: Method::from_parts(
                facing_name.original_name(),
                visibility,
                Role::Original,
                Arc::clone(method.body()),
            ),
            transient: Method::from_parts(
                facing_name.transient_name(),
                visibility,
                Role::Transient,
                Arc::clone(&instrumented),
            ),
            facing: Method::from_parts(facing_name, visibility, Role::Facing, instrumented),
        })
    }
}

impl<R, A, B, T, E> Method<R, A, B, T, E>
where
    R: Debug + 'static,
    A: Arguments + Clone + 'static,
    B: 'static,
    T: Debug + 'static,
    E: 'static,
{
    /// Instrument this method, reporting through the process-wide store.
    pub fn with_benchmark(self) -> Result<Instrumented<R, A, B, T, E>> {
        Installer::global().install(self)
    }
}

/// The slots produced by one installation.
pub struct Instrumented<R, A, B, T, E> {
    facing: Method<R, A, B, T, E>,
    original: Method<R, A, B, T, E>,
    transient: Method<R, A, B, T, E>,
}

impl<R, A, B, T, E> Instrumented<R, A, B, T, E> {
    /// The instrumented entry point, under the original name.
    pub fn facing(&self) -> &Method<R, A, B, T, E> {
        &self.facing
    }

    /// The pre-installation body under its derived name.
    pub fn original(&self) -> &Method<R, A, B, T, E> {
        &self.original
    }

    /// The instrumented body under its installation-time name.
    pub fn transient(&self) -> &Method<R, A, B, T, E> {
        &self.transient
    }

    /// Visibility shared by all three slots.
    pub fn visibility(&self) -> Visibility {
        self.facing.visibility()
    }

    /// Look a slot up by name.
    pub fn slot(&self, name: &str) -> Option<&Method<R, A, B, T, E>> {
        [&self.facing, &self.original, &self.transient]
            .into_iter()
            .find(|slot| slot.name() == name)
    }

    /// Names of the three slots: facing, original, transient.
    pub fn names(&self) -> [&MethodName; 3] {
        [
            self.facing.name(),
            self.original.name(),
            self.transient.name(),
        ]
    }

    /// Call the facing slot from outside the receiver type.
    #[inline]
    pub fn call(&self, receiver: &R, args: A, block: Option<B>) -> std::result::Result<T, E>
    where
        E: From<Error>,
    {
        self.facing.call(receiver, args, block)
    }

    /// Call the facing slot regardless of visibility.
    #[inline]
    pub fn send(&self, receiver: &R, args: A, block: Option<B>) -> std::result::Result<T, E> {
        self.facing.send(receiver, args, block)
    }

    /// Split into `(facing, original, transient)`.
    pub fn into_parts(
        self,
    ) -> (
        Method<R, A, B, T, E>,
        Method<R, A, B, T, E>,
        Method<R, A, B, T, E>,
    ) {
        (self.facing, self.original, self.transient)
    }
}

impl<R, A, B, T, E> Clone for Instrumented<R, A, B, T, E> {
    fn clone(&self) -> Self {
        Self {
            facing: self.facing.clone(),
            original: self.original.clone(),
            transient: self.transient.clone(),
        }
    }
}

impl<R, A, B, T, E> Debug for Instrumented<R, A, B, T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instrumented")
            .field("facing", &self.facing)
            .field("original", &self.original)
            .field("transient", &self.transient)
            .finish()
    }
}
