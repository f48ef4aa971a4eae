use nix::errno::Errno;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;
use thiserror::Error;

use crate::chan::ChannelError;
use crate::error::Exception;

/// Error type returned from failed [`Fork`] operations.
///
/// [`Fork`]: crate::fork::Fork
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ForkError {
  /// Process duplication is not available on this host.
  ///
  /// This condition is permanent and reported at construction time.
  #[error("(Unsupported) process forking is not available on this host")]
  Unsupported,
  /// A caller-supplied value is out of contract.
  #[error("(BadArg) errors were found with the given argument(s): {0}")]
  InvalidArgument(&'static str),
  /// The operation is not allowed in the current lifecycle state.
  #[error("(Status) {0}")]
  Status(&'static str),
  /// An underlying OS call failed.
  #[error("(Fork) {op} failed: {errno}")]
  Fork {
    /// The OS operation that failed.
    op: SysCall,
    /// The error reported by the OS.
    #[source]
    errno: Errno,
  },
  /// The peer did not honor the channel protocol.
  #[error("(Sync) {0}")]
  Synchronization(String),
  /// The channel transport failed or the peer disconnected.
  #[error("(Channel) {0}")]
  Channel(#[from] ChannelError),
  /// The function running in the child process failed.
  #[error("{0}")]
  Failure(Exception),
}

impl ForkError {
  #[inline]
  pub(crate) const fn sys(op: SysCall, errno: Errno) -> Self {
    Self::Fork { op, errno }
  }

  /// Returns the child failure if this error re-raises one.
  #[inline]
  pub const fn exception(&self) -> Option<&Exception> {
    match self {
      Self::Failure(exception) => Some(exception),
      _ => None,
    }
  }

  /// Returns `true` if this is a lifecycle violation.
  #[inline]
  pub const fn is_status(&self) -> bool {
    matches!(self, Self::Status(_))
  }

  /// Returns `true` if this is an invalid argument error.
  #[inline]
  pub const fn is_invalid_argument(&self) -> bool {
    matches!(self, Self::InvalidArgument(_))
  }

  /// Returns `true` if this is a channel protocol violation.
  #[inline]
  pub const fn is_synchronization(&self) -> bool {
    matches!(self, Self::Synchronization(_))
  }
}

impl From<Exception> for ForkError {
  #[inline]
  fn from(other: Exception) -> Self {
    Self::Failure(other)
  }
}

// -----------------------------------------------------------------------------
// Sys Call
// -----------------------------------------------------------------------------

/// OS operation identity carried by [`ForkError::Fork`].
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[non_exhaustive]
pub enum SysCall {
  /// Creating the duplex transport (`socketpair(2)`).
  SocketPair,
  /// Duplicating the process (`fork(2)`).
  Fork,
  /// Reading the scheduling priority (`getpriority(2)`).
  GetPriority,
  /// Changing the scheduling priority (`setpriority(2)`).
  SetPriority,
  /// Delivering a signal (`kill(2)`).
  Signal,
}

impl Display for SysCall {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    match self {
      Self::SocketPair => f.write_str("socketpair"),
      Self::Fork => f.write_str("fork"),
      Self::GetPriority => f.write_str("getpriority"),
      Self::SetPriority => f.write_str("setpriority"),
      Self::Signal => f.write_str("kill"),
    }
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
