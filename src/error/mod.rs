//! Error types of the procfork crate.
//!
//! Two families of errors exist:
//!
//! 1. [`ForkError`]: Returned by every fallible operation on a [`Fork`].
//!    Each variant maps to one failure category (unsupported host, invalid
//!    argument, lifecycle violation, OS call failure, protocol violation,
//!    channel failure, child failure).
//! 2. [`Exception`]: A serializable record describing why the function
//!    running in a child process failed. Exceptions cross the process
//!    boundary inside an [`ExitStatus`] and are re-raised in the parent as
//!    [`ForkError::Failure`].
//!
//! # Exception Classes
//!
//! - [`Error`]: The function returned an error
//! - [`Panic`]: The function panicked
//! - [`Encode`]: The function's result could not be encoded
//!
//! [`Fork`]: crate::fork::Fork
//! [`ExitStatus`]: crate::core::ExitStatus
//! [`Error`]: ExceptionClass::Error
//! [`Panic`]: ExceptionClass::Panic
//! [`Encode`]: ExceptionClass::Encode

mod exception;
mod exception_class;
mod fork_error;

pub use self::exception::Exception;
pub use self::exception_class::ExceptionClass;
pub use self::fork_error::ForkError;
pub use self::fork_error::SysCall;

pub use crate::chan::ChannelError;

/// Result type returned by fallible procfork operations.
pub type Result<T, E = ForkError> = ::core::result::Result<T, E>;
