use dyn_clone::DynClone;
use futures_util::future::LocalBoxFuture;
use std::fmt::Display;

use crate::error::Exception;
use crate::fork::ForkContext;

/// Future produced by a [`ForkTask`] inside the child process.
pub(crate) type TaskFuture<T> = LocalBoxFuture<'static, Result<T, Exception>>;

/// The deferred call run inside a child process.
///
/// Tasks are captured when a [`Fork`] is constructed and are invoked at most
/// once per process. They are clonable so that an unstarted copy of a
/// context can run the same call.
///
/// [`Fork`]: crate::fork::Fork
pub(crate) trait ForkTask<T>: DynClone + Send {
  /// Consumes the task and returns the future computing its result.
  ///
  /// No user code runs before the returned future is first polled.
  fn call(self: Box<Self>, context: ForkContext) -> TaskFuture<T>;
}

dyn_clone::clone_trait_object!(<T> ForkTask<T>);

// -----------------------------------------------------------------------------
// Plain Task
// -----------------------------------------------------------------------------

/// A task that does not use the channel.
#[derive(Clone)]
#[repr(transparent)]
pub(crate) struct PlainTask<F> {
  function: F,
}

impl<F> PlainTask<F> {
  #[inline]
  pub(crate) const fn new(function: F) -> Self {
    Self { function }
  }
}

impl<F, Fut, T, E> ForkTask<T> for PlainTask<F>
where
  F: FnOnce() -> Fut + Clone + Send + 'static,
  Fut: Future<Output = Result<T, E>> + 'static,
  E: Display + 'static,
{
  fn call(self: Box<Self>, _context: ForkContext) -> TaskFuture<T> {
    Box::pin(async move { (self.function)().await.map_err(Exception::from_error) })
  }
}

// -----------------------------------------------------------------------------
// Channel Task
// -----------------------------------------------------------------------------

/// A task bound to the child side of the channel.
#[derive(Clone)]
#[repr(transparent)]
pub(crate) struct ChannelTask<F> {
  function: F,
}

impl<F> ChannelTask<F> {
  #[inline]
  pub(crate) const fn new(function: F) -> Self {
    Self { function }
  }
}

impl<F, Fut, T, E> ForkTask<T> for ChannelTask<F>
where
  F: FnOnce(ForkContext) -> Fut + Clone + Send + 'static,
  Fut: Future<Output = Result<T, E>> + 'static,
  E: Display + 'static,
{
  fn call(self: Box<Self>, context: ForkContext) -> TaskFuture<T> {
    Box::pin(async move {
      (self.function)(context)
        .await
        .map_err(Exception::from_error)
    })
  }
}
