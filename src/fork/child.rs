//! Child-side execution of a forked process.
//!
//! Everything in this module runs in the freshly forked child. The child
//! never returns into the caller of [`Fork::start`]; it runs the deferred
//! call on a dedicated thread with its own runtime, reports the outcome to
//! the parent, and leaves with [`ExitCode::exit_process`].
//!
//! [`Fork::start`]: crate::Fork::start

use futures_util::FutureExt;
use nix::unistd::Pid;
use serde::Serialize;
use std::os::unix::net::UnixStream;
use std::panic::AssertUnwindSafe;
use std::rc::Rc;
use std::thread;
use tokio::runtime::Builder;
use tokio::runtime::Runtime;
use tokio::sync::Mutex;
use tracing::Level;
use tracing::Span;
use tracing::debug;
use tracing::error;
use tracing::span;
use tracing::warn;

use crate::chan::Channel;
use crate::chan::ChannelError;
use crate::chan::Packet;
use crate::core::ExitStatus;
use crate::error::Exception;
use crate::fork::ForkConfig;
use crate::fork::ForkContext;
use crate::fork::ForkTask;
use crate::sys;
use crate::sys::ExitCode;

/// Runs `task` to completion and terminates the child process.
///
/// The runtime context inherited from the parent belongs to threads that no
/// longer exist, so the call is driven by a new runtime on a new thread.
pub(crate) fn run<T>(
  task: Box<dyn ForkTask<T>>,
  stream: UnixStream,
  parent: Pid,
  config: ForkConfig,
) -> !
where
  T: Serialize + 'static,
{
  let span: Span = span!(
    target: "procfork",
    Level::DEBUG,
    "fork::child",
    pid = %sys::getpid(),
    %parent,
  );

  debug!(target: "procfork", parent: &span, "initializing");

  let builder: thread::Builder = thread::Builder::new()
    .name(config.rt_thread_name.clone())
    .stack_size(config.rt_thread_stack_size);

  let thread_span: Span = span.clone();

  let ecode: ExitCode = match builder.spawn(move || execute(task, stream, parent, &config, &thread_span)) {
    Ok(handle) => match handle.join() {
      Ok(ecode) => ecode,
      Err(_) => {
        error!(target: "procfork", parent: &span, "child thread panicked");
        ExitCode::FAILURE
      }
    },
    Err(error) => {
      error!(
        target: "procfork",
        parent: &span,
        %error,
        "failed to spawn child thread",
      );

      ExitCode::FAILURE
    }
  };

  debug!(
    target: "procfork",
    parent: &span,
    status = ecode.to_i32(),
    "exiting",
  );

  ecode.exit_process()
}

fn execute<T>(
  task: Box<dyn ForkTask<T>>,
  stream: UnixStream,
  parent: Pid,
  config: &ForkConfig,
  span: &Span,
) -> ExitCode
where
  T: Serialize + 'static,
{
  let runtime: Runtime = match build_runtime(config) {
    Ok(runtime) => runtime,
    Err(error) => {
      error!(
        target: "procfork",
        parent: span,
        %error,
        "failed to build runtime",
      );

      return ExitCode::FAILURE;
    }
  };

  let result: Result<(), ChannelError> = runtime.block_on(async move {
    let channel: Channel = Channel::new(stream, config.ch_max_frame_length)?;
    let channel: Rc<Mutex<Channel>> = Rc::new(Mutex::new(channel));
    let context: ForkContext = ForkContext::new(Rc::clone(&channel), parent);

    debug!(target: "procfork", parent: span, "polling");

    let status: ExitStatus<T> = invoke(task, context).await;

    debug!(
      target: "procfork",
      parent: span,
      success = status.is_success(),
      "completed",
    );

    let mut channel = channel.lock().await;

    deliver(&mut channel, status, span).await
  });

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(error) => {
      error!(
        target: "procfork",
        parent: span,
        %error,
        "failed to deliver exit status",
      );

      ExitCode::FAILURE
    }
  }
}

/// Runs the deferred call, converting errors and panics into failures.
async fn invoke<T>(task: Box<dyn ForkTask<T>>, context: ForkContext) -> ExitStatus<T> {
  match AssertUnwindSafe(task.call(context)).catch_unwind().await {
    Ok(Ok(value)) => ExitStatus::Success(value),
    Ok(Err(exception)) => ExitStatus::Failure(exception),
    Err(payload) => ExitStatus::Failure(Exception::from_panic(payload)),
  }
}

/// Sends the final exit status to the parent.
///
/// A result that cannot be encoded is replaced by a failure describing the
/// encoding error. A parent that is no longer listening is not an error.
async fn deliver<T>(channel: &mut Channel, status: ExitStatus<T>, span: &Span) -> Result<(), ChannelError>
where
  T: Serialize,
{
  let error: ChannelError = match channel.send(&Packet::<(), T>::Exit(status)).await {
    Ok(()) => return Ok(()),
    Err(error) => error,
  };

  if !error.is_encode() {
    debug!(
      target: "procfork",
      parent: span,
      %error,
      "parent is gone",
    );

    return Ok(());
  }

  warn!(
    target: "procfork",
    parent: span,
    %error,
    "failed to encode result",
  );

  let status: ExitStatus<T> = ExitStatus::Failure(Exception::from_encode(&error));

  channel.send(&Packet::<(), T>::Exit(status)).await
}

/// Builds the single-threaded runtime driving the child.
fn build_runtime(config: &ForkConfig) -> std::io::Result<Runtime> {
  Builder::new_current_thread()
    .enable_io()
    .enable_time()
    .event_interval(config.rt_event_interval)
    .max_io_events_per_tick(config.rt_max_io_events_per_tick)
    .build()
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
