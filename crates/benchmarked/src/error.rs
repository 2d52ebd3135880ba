//! Error types for instrumented calls and installation.

use crate::name::MethodName;
use thiserror::Error;

/// Errors raised by the instrumentation layer or by method bodies that opt in to it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A private method was invoked through the external call path
    #[error("private method `{method}' called for {receiver}")]
    PrivateMethod {
        method: MethodName,
        receiver: &'static str,
    },

    /// A protected method was invoked from outside its receiver type
    #[error("protected method `{method}' called for {receiver}")]
    ProtectedMethod {
        method: MethodName,
        receiver: &'static str,
    },

    /// A method body that yields was called without a block
    #[error("no block given (yield)")]
    MissingBlock,

    /// The handle already is an instrumented entry point
    #[error("method `{0}' is already instrumented")]
    AlreadyInstrumented(MethodName),

    /// The identifier cannot name a method
    #[error("invalid method name: {0:?}")]
    InvalidMethodName(String),
}

/// Result type for instrumentation operations.
pub type Result<T> = std::result::Result<T, Error>;
