//! Forked processes and their lifecycle.
//!
//! A [`Fork`] captures a deferred async call. Starting it duplicates the
//! calling process; the duplicate runs the call on its own runtime and
//! reports the outcome back over a private channel, while the original
//! keeps the handle used to exchange messages, join, signal, or kill it.
//!
//! # Lifecycle
//!
//! ```text
//! Unstarted --start--> Running --join | kill | exit received--> Terminated
//! ```
//!
//! A context is started at most once. [`Fork::unstarted_copy`] creates a new
//! context running the same call.

mod child;
mod config;
mod context;
mod task;

pub use self::config::ForkConfig;
pub use self::context::ForkContext;

pub(crate) use self::task::ForkTask;

use nix::sys::signal::Signal;
use nix::unistd::ForkResult;
use nix::unistd::Pid;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::io::Error as IoError;
use tokio::runtime::Handle;
use tracing::Level;
use tracing::Span;
use tracing::debug;
use tracing::span;
use tracing::trace;
use tracing::warn;

use crate::chan;
use crate::chan::Channel;
use crate::chan::ChannelError;
use crate::chan::MessageKind;
use crate::chan::Packet;
use crate::chan::Transport;
use crate::consts;
use crate::error::ForkError;
use crate::error::Result;
use crate::error::SysCall;
use crate::fork::task::ChannelTask;
use crate::fork::task::PlainTask;
use crate::sys;

const E_NOT_RUNNING: &str = "process is not running";
const E_STARTED: &str = "process has already been started";
const E_NO_RUNTIME: &str = "process must be started from within a tokio runtime";
const E_FRAME_LENGTH: &str = "channel frame limit is below `MIN_MAX_FRAME_LENGTH`";

// -----------------------------------------------------------------------------
// Fork
// -----------------------------------------------------------------------------

/// A deferred async call executed in a forked child process.
///
/// `T` is the type of the call's success value. It crosses the process
/// boundary, so it must be serializable.
///
/// Dropping a running context in the process that started it kills the
/// child.
pub struct Fork<T> {
  task: Box<dyn ForkTask<T>>,
  config: ForkConfig,
  pid: Option<Pid>,
  owner: Option<Pid>,
  channel: Option<Channel>,
}

impl<T> Fork<T>
where
  T: Serialize + DeserializeOwned + 'static,
{
  /// Creates an unstarted context for `function`.
  ///
  /// The child calls `function` and awaits the returned future. An `Err`
  /// result is delivered to the parent as a failure whose name is the
  /// error's type name.
  ///
  /// Returns [`ForkError::Unsupported`] if the host cannot fork.
  pub fn new<F, Fut, E>(function: F) -> Result<Self>
  where
    F: FnOnce() -> Fut + Clone + Send + 'static,
    Fut: Future<Output = Result<T, E>> + 'static,
    E: Display + 'static,
  {
    Self::from_task(Box::new(PlainTask::new(function)))
  }

  /// Creates an unstarted context for `function`, bound to the channel.
  ///
  /// The child passes its [`ForkContext`] to `function`, which can use it to
  /// exchange messages with the parent while it runs.
  pub fn with_channel<F, Fut, E>(function: F) -> Result<Self>
  where
    F: FnOnce(ForkContext) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = Result<T, E>> + 'static,
    E: Display + 'static,
  {
    Self::from_task(Box::new(ChannelTask::new(function)))
  }

  /// Creates and starts a context for `function`.
  ///
  /// See [`Fork::new`] and [`Fork::start`].
  pub fn spawn<F, Fut, E>(function: F) -> Result<Self>
  where
    F: FnOnce() -> Fut + Clone + Send + 'static,
    Fut: Future<Output = Result<T, E>> + 'static,
    E: Display + 'static,
  {
    let mut this: Self = Self::new(function)?;
    this.start()?;
    Ok(this)
  }

  /// Creates and starts a context for `function`, bound to the channel.
  ///
  /// See [`Fork::with_channel`] and [`Fork::start`].
  pub fn spawn_with_channel<F, Fut, E>(function: F) -> Result<Self>
  where
    F: FnOnce(ForkContext) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = Result<T, E>> + 'static,
    E: Display + 'static,
  {
    let mut this: Self = Self::with_channel(function)?;
    this.start()?;
    Ok(this)
  }

  fn from_task(task: Box<dyn ForkTask<T>>) -> Result<Self> {
    if !sys::supported() {
      return Err(ForkError::Unsupported);
    }

    Ok(Self {
      task,
      config: ForkConfig::new(),
      pid: None,
      owner: None,
      channel: None,
    })
  }

  /// Starts the child process.
  ///
  /// Must be called from within a tokio runtime. On return the child is
  /// running and the channel is open. The calling process continues; the
  /// child never returns from this call.
  ///
  /// # Errors
  ///
  /// - [`ForkError::Status`] if the context was already started or no
  ///   runtime is active.
  /// - [`ForkError::InvalidArgument`] if the configured frame limit is below
  ///   [`MIN_MAX_FRAME_LENGTH`].
  /// - [`ForkError::Fork`] if the channel or the process cannot be created.
  ///
  /// [`MIN_MAX_FRAME_LENGTH`]: consts::MIN_MAX_FRAME_LENGTH
  pub fn start(&mut self) -> Result<()> {
    if self.owner.is_some() {
      return Err(ForkError::Status(E_STARTED));
    }

    if self.config.ch_max_frame_length < consts::MIN_MAX_FRAME_LENGTH {
      return Err(ForkError::InvalidArgument(E_FRAME_LENGTH));
    }

    if Handle::try_current().is_err() {
      return Err(ForkError::Status(E_NO_RUNTIME));
    }

    let span: Span = span!(target: "procfork", Level::DEBUG, "fork::start");

    let transport: Transport = Transport::new().map_err(|error| ForkError::sys(SysCall::SocketPair, errno(&error)))?;

    let parent: Pid = sys::getpid();

    // SAFETY: The child branch hands control to `child::run`, which builds
    //         its own runtime on a new thread and leaves via `_exit`.
    match unsafe { sys::fork() } {
      Ok(ForkResult::Child) => {
        let task: Box<dyn ForkTask<T>> = dyn_clone::clone_box(&*self.task);
        child::run(task, transport.into_child(), parent, self.config.clone())
      }
      Ok(ForkResult::Parent { child }) => {
        self.pid = Some(child);
        self.owner = Some(parent);

        debug!(target: "procfork", parent: &span, pid = %child, "started");

        match Channel::new(transport.into_parent(), self.config.ch_max_frame_length) {
          Ok(channel) => {
            self.channel = Some(channel);
            Ok(())
          }
          Err(error) => {
            self.kill();
            Err(ForkError::Channel(ChannelError::Io(error)))
          }
        }
      }
      Err(errno) => Err(ForkError::sys(SysCall::Fork, errno)),
    }
  }

  /// Waits for the child's result and terminates the child.
  ///
  /// The child is killed when this returns, whatever the outcome, and also
  /// if the returned future is dropped before completion.
  ///
  /// # Errors
  ///
  /// - [`ForkError::Status`] if the context is not running.
  /// - [`ForkError::Synchronization`] if the child sent an application
  ///   message instead of its exit status.
  /// - [`ForkError::Failure`] if the child's call failed.
  /// - [`ForkError::Channel`] if the channel broke before a result arrived.
  pub async fn join(&mut self) -> Result<T> {
    if self.channel.is_none() {
      return Err(ForkError::Status(E_NOT_RUNNING));
    }

    let guard: KillOnDrop<'_, T> = KillOnDrop { fork: self };

    let Some(channel) = guard.fork.channel.as_mut() else {
      return Err(ForkError::Status(E_NOT_RUNNING));
    };

    let packet: Packet<MessageKind, T> = channel.recv().await?;

    trace!(target: "procfork", pid = ?guard.fork.pid, "joined");

    match packet {
      Packet::Exit(status) => status.into_result().map_err(ForkError::Failure),
      Packet::Message(kind) => Err(ForkError::Synchronization(format!(
        "expected the exit status, received an application message of kind {kind}"
      ))),
    }
  }

  /// Waits for the next application message from the child.
  ///
  /// If the child sends its exit status instead, the child is killed and
  /// [`ForkError::Synchronization`] is returned.
  pub async fn receive<M>(&mut self) -> Result<M>
  where
    M: DeserializeOwned,
  {
    let Some(channel) = self.channel.as_mut() else {
      return Err(ForkError::Status(E_NOT_RUNNING));
    };

    match channel.recv::<Packet<M, T>>().await? {
      Packet::Message(data) => Ok(data),
      Packet::Exit(status) => {
        let description: String = status.describe();

        self.kill();

        Err(ForkError::Synchronization(format!(
          "expected a message, received the exit status: {description}"
        )))
      }
    }
  }

  /// Sends an application message to the child.
  ///
  /// Returns [`ForkError::InvalidArgument`] if `data` is an
  /// [`ExitStatus`].
  ///
  /// [`ExitStatus`]: crate::core::ExitStatus
  pub async fn send<M>(&mut self, data: &M) -> Result<()>
  where
    M: Serialize + ?Sized,
  {
    let Some(channel) = self.channel.as_mut() else {
      return Err(ForkError::Status(E_NOT_RUNNING));
    };

    if chan::is_exit_status(data) {
      return Err(ForkError::InvalidArgument("an exit status cannot be sent as a message"));
    }

    channel.send(&Packet::<&M, T>::Message(data)).await?;

    Ok(())
  }
}

impl<T> Fork<T> {
  /// Replaces the configuration used when the context is started.
  #[inline]
  pub fn with_config(mut self, config: ForkConfig) -> Self {
    self.config = config;
    self
  }

  /// Returns the configuration used when the context is started.
  #[inline]
  pub const fn config(&self) -> &ForkConfig {
    &self.config
  }

  /// Creates a new unstarted context running the same call.
  pub fn unstarted_copy(&self) -> Self {
    Self {
      task: dyn_clone::clone_box(&*self.task),
      config: self.config.clone(),
      pid: None,
      owner: None,
      channel: None,
    }
  }

  /// Returns the process id of the child, if it was started and not yet
  /// terminated.
  #[inline]
  pub const fn pid(&self) -> Option<Pid> {
    self.pid
  }

  /// Returns `true` if the child was started and has not exited.
  pub fn is_running(&self) -> bool {
    self.pid.is_some_and(sys::is_alive)
  }

  /// Returns the child's scheduling priority in `[0, 1]`.
  ///
  /// `0` is the lowest priority and `1` the highest.
  pub fn priority(&self) -> Result<f64> {
    let pid: Pid = self.pid.ok_or(ForkError::Status(E_NOT_RUNNING))?;

    let niceness: i32 = sys::get_niceness(pid).map_err(|errno| ForkError::sys(SysCall::GetPriority, errno))?;

    Ok(sys::niceness_to_priority(niceness))
  }

  /// Sets the child's scheduling priority.
  ///
  /// `priority` must be within `[0, 1]`. Raising the priority above the
  /// current one usually requires elevated privileges.
  pub fn set_priority(&self, priority: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&priority) {
      return Err(ForkError::InvalidArgument("priority must be within [0, 1]"));
    }

    let pid: Pid = self.pid.ok_or(ForkError::Status(E_NOT_RUNNING))?;
    let niceness: i32 = sys::priority_to_niceness(priority);

    sys::set_niceness(pid, niceness).map_err(|errno| ForkError::sys(SysCall::SetPriority, errno))?;

    debug!(target: "procfork", %pid, niceness, "priority changed");

    Ok(())
  }

  /// Delivers `signal` to the child without waiting for its reaction.
  pub fn signal(&self, signal: Signal) -> Result<()> {
    let pid: Pid = self.pid.ok_or(ForkError::Status(E_NOT_RUNNING))?;

    sys::signal(pid, signal).map_err(|errno| ForkError::sys(SysCall::Signal, errno))?;

    trace!(target: "procfork", %pid, ?signal, "signalled");

    Ok(())
  }

  /// Kills the child and closes the channel.
  ///
  /// Does nothing if the context is not running. Only the process that
  /// started the child delivers the kill signal.
  pub fn kill(&mut self) {
    if let Some(pid) = self.pid.take() {
      if self.owner == Some(sys::getpid()) {
        if sys::is_alive(pid) {
          match sys::signal(pid, Signal::SIGKILL) {
            Ok(()) => debug!(target: "procfork", %pid, "killed"),
            Err(errno) => warn!(target: "procfork", %pid, %errno, "failed to kill"),
          }
        }

        sys::reap(pid);
      }
    }

    if self.channel.take().is_some() {
      trace!(target: "procfork", "channel closed");
    }
  }
}

impl<T> Drop for Fork<T> {
  fn drop(&mut self) {
    if self.pid.is_some() && self.owner == Some(sys::getpid()) {
      self.kill();
    }
  }
}

impl<T> Debug for Fork<T> {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("Fork")
      .field("pid", &self.pid)
      .field("owner", &self.owner)
      .field("channel", &self.channel)
      .finish_non_exhaustive()
  }
}

// -----------------------------------------------------------------------------
// Misc. Utilities
// -----------------------------------------------------------------------------

/// Kills the referenced child when dropped.
struct KillOnDrop<'a, T> {
  fork: &'a mut Fork<T>,
}

impl<T> Drop for KillOnDrop<'_, T> {
  #[inline]
  fn drop(&mut self) {
    self.fork.kill();
  }
}

#[inline]
fn errno(error: &IoError) -> nix::errno::Errno {
  nix::errno::Errno::from_raw(error.raw_os_error().unwrap_or(0))
}
