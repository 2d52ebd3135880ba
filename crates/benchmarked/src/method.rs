//! Method handles: a named body with a visibility level.
//!
//! A [`Method`] stands in for a method slot on a receiver type `R`. Its body
//! takes the receiver, the positional arguments `A` as one value, and an
//! optional block `B`, and returns `Result<T, E>`. Three access paths mirror
//! the ways a method can be reached:
//!
//! - [`Method::call`]: an external caller, public methods only
//! - [`Method::call_from`]: another receiver of the same type, public and protected
//! - [`Method::send`]: a privileged caller, any visibility

use crate::error::{Error, Result};
use crate::name::MethodName;
use serde::{Deserialize, Serialize};
use std::any::type_name;
use std::fmt;
use std::sync::Arc;

/// Block type for methods that never receive one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoBlock {}

/// Access level of a method slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Callable by anyone
    #[default]
    Public,
    /// Callable from receivers of the same type
    Protected,
    /// Callable only through the privileged path
    Private,
}

impl Visibility {
    /// Whether a caller reaching the method through `access` may invoke it.
    pub fn permits(self, access: Access) -> bool {
        match (self, access) {
            (_, Access::Privileged) => true,
            (Visibility::Public, _) => true,
            (Visibility::Protected, Access::SameType) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        };
        f.write_str(label)
    }
}

/// The path a call takes to reach a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Plain call from outside the receiver type
    External,
    /// Call from another receiver of the same type
    SameType,
    /// Call that bypasses visibility
    Privileged,
}

/// Which slot of an installation a handle occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    Plain,
    Facing,
    Original,
    Transient,
}

pub(crate) type Body<R, A, B, T, E> = dyn Fn(&R, A, Option<B>) -> std::result::Result<T, E> + Send + Sync;

/// A named, visibility-tagged method body.
pub struct Method<R, A, B, T, E> {
    name: MethodName,
    visibility: Visibility,
    role: Role,
    body: Arc<Body<R, A, B, T, E>>,
}

impl<R, A, B, T, E> Method<R, A, B, T, E> {
    /// Define a method.
    ///
    /// ```rust
    /// use benchmarked::{Error, Method, NoBlock, Visibility};
    ///
    /// #[derive(Debug)]
    /// struct Greeter;
    ///
    /// let greet = Method::define(
    ///     "greet",
    ///     Visibility::Public,
    ///     |_: &Greeter, (name,): (&str,), _: Option<NoBlock>| Ok::<_, Error>(format!("hi {name}")),
    /// )?;
    /// assert_eq!(greet.call(&Greeter, ("ann",), None)?, "hi ann");
    /// # Ok::<(), Error>(())
    /// ```
    pub fn define<F>(name: impl Into<String>, visibility: Visibility, body: F) -> Result<Self>
    where
        F: Fn(&R, A, Option<B>) -> std::result::Result<T, E> + Send + Sync + 'static,
    {
        Ok(Self {
            name: MethodName::new(name)?,
            visibility,
            role: Role::Plain,
            body: Arc::new(body),
        })
    }

    /// Define a public method.
    pub fn public<F>(name: impl Into<String>, body: F) -> Result<Self>
    where
        F: Fn(&R, A, Option<B>) -> std::result::Result<T, E> + Send + Sync + 'static,
    {
        Self::define(name, Visibility::Public, body)
    }

    /// Define a protected method.
    pub fn protected<F>(name: impl Into<String>, body: F) -> Result<Self>
    where
        F: Fn(&R, A, Option<B>) -> std::result::Result<T, E> + Send + Sync + 'static,
    {
        Self::define(name, Visibility::Protected, body)
    }

    /// Define a private method.
    pub fn private<F>(name: impl Into<String>, body: F) -> Result<Self>
    where
        F: Fn(&R, A, Option<B>) -> std::result::Result<T, E> + Send + Sync + 'static,
    {
        Self::define(name, Visibility::Private, body)
    }

    pub(crate) fn from_parts(
        name: MethodName,
        visibility: Visibility,
        role: Role,
        body: Arc<Body<R, A, B, T, E>>,
    ) -> Self {
        Self {
            name,
            visibility,
            role,
            body,
        }
    }

    pub(crate) fn body(&self) -> &Arc<Body<R, A, B, T, E>> {
        &self.body
    }

    /// Name of this slot.
    pub fn name(&self) -> &MethodName {
        &self.name
    }

    /// Access level of this slot.
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Same body under a different access level.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Whether calls through this handle are timed and reported.
    pub fn is_instrumented(&self) -> bool {
        matches!(self.role, Role::Facing | Role::Transient)
    }

    /// Check that a caller reaching this slot through `access` may invoke it.
    pub fn check_access(&self, access: Access) -> Result<()> {
        if self.visibility.permits(access) {
            return Ok(());
        }

        let method = self.name.clone();
        let receiver = type_name::<R>();
        Err(match self.visibility {
            Visibility::Protected => Error::ProtectedMethod { method, receiver },
            _ => Error::PrivateMethod { method, receiver },
        })
    }

    /// Call from outside the receiver type. Fails unless the method is public.
    #[inline]
    pub fn call(&self, receiver: &R, args: A, block: Option<B>) -> std::result::Result<T, E>
    where
        E: From<Error>,
    {
        self.check_access(Access::External)?;
        (self.body)(receiver, args, block)
    }

    /// Call from `_caller`, another receiver of the same type. Fails for
    /// private methods.
    #[inline]
    pub fn call_from(
        &self,
        _caller: &R,
        receiver: &R,
        args: A,
        block: Option<B>,
    ) -> std::result::Result<T, E>
    where
        E: From<Error>,
    {
        self.check_access(Access::SameType)?;
        (self.body)(receiver, args, block)
    }

    /// Call regardless of visibility.
    #[inline]
    pub fn send(&self, receiver: &R, args: A, block: Option<B>) -> std::result::Result<T, E> {
        (self.body)(receiver, args, block)
    }
}

impl<R, A, B, T, E> Clone for Method<R, A, B, T, E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            visibility: self.visibility,
            role: self.role,
            body: Arc::clone(&self.body),
        }
    }
}

impl<R, A, B, T, E> fmt::Debug for Method<R, A, B, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("visibility", &self.visibility)
            .field("instrumented", &self.is_instrumented())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Counter {
        start: i64,
    }

    type Adder = Method<Counter, (i64,), NoBlock, i64, Error>;

    fn adder(visibility: Visibility) -> Adder {
        Method::define("add", visibility, |counter: &Counter, (n,): (i64,), _| {
            Ok(counter.start + n)
        })
        .unwrap()
    }

    #[test]
    fn test_public_reachable_everywhere() {
        let method = adder(Visibility::Public);
        let counter = Counter { start: 10 };

        assert_eq!(method.call(&counter, (5,), None), Ok(15));
        assert_eq!(method.call_from(&counter, &counter, (1,), None), Ok(11));
        assert_eq!(method.send(&counter, (0,), None), Ok(10));
    }

    #[test]
    fn test_private_rejects_external_call() {
        let method = adder(Visibility::Private);
        let counter = Counter { start: 1 };

        let err = method.call(&counter, (1,), None).unwrap_err();
        assert!(matches!(err, Error::PrivateMethod { .. }));
        assert!(err.to_string().starts_with("private method `add' called for"));
        assert!(err.to_string().ends_with("Counter"));

        assert!(method.call_from(&counter, &counter, (1,), None).is_err());
        assert_eq!(method.send(&counter, (1,), None), Ok(2));
    }

    #[test]
    fn test_protected_allows_same_type() {
        let method = adder(Visibility::Protected);
        let caller = Counter { start: 0 };
        let receiver = Counter { start: 100 };

        let err = method.call(&receiver, (1,), None).unwrap_err();
        assert!(err.to_string().starts_with("protected method `add' called for"));
        assert_eq!(method.call_from(&caller, &receiver, (1,), None), Ok(101));
    }

    #[test]
    fn test_with_visibility() {
        let method = adder(Visibility::Public).with_visibility(Visibility::Private);
        assert_eq!(method.visibility(), Visibility::Private);
        assert!(method.call(&Counter { start: 0 }, (0,), None).is_err());
    }

    #[test]
    fn test_plain_method_not_instrumented() {
        let method = adder(Visibility::Public);
        assert!(!method.is_instrumented());
        assert_eq!(method.name(), &MethodName::new("add").unwrap());
    }

    #[test]
    fn test_invalid_name_rejected() {
        let result: Result<Adder> =
            Method::define("bad name", Visibility::Public, |c: &Counter, (n,): (i64,), _| {
                Ok(c.start + n)
            });
        assert!(matches!(result, Err(Error::InvalidMethodName(_))));
    }

    #[test]
    fn test_visibility_permits_matrix() {
        use Access::*;
        assert!(Visibility::Public.permits(External));
        assert!(!Visibility::Protected.permits(External));
        assert!(Visibility::Protected.permits(SameType));
        assert!(!Visibility::Private.permits(SameType));
        assert!(Visibility::Private.permits(Privileged));
    }

    #[test]
    fn test_visibility_serde() {
        assert_eq!(
            serde_json::to_string(&Visibility::Protected).unwrap(),
            "\"protected\""
        );
        assert_eq!(Visibility::Private.to_string(), "private");
    }
}
