use crate::consts;

/// This type represents the status code a forked child returns to its
/// parent when it terminates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub(crate) struct ExitCode(i32);

impl ExitCode {
  /// The child runtime ran to completion.
  pub(crate) const SUCCESS: ExitCode = ExitCode(consts::E_CODE_SUCCESS);

  /// A failure escaped the child runtime.
  pub(crate) const FAILURE: ExitCode = ExitCode(consts::E_CODE_FAILURE);

  /// Terminates the current process immediately with this `ExitCode`.
  ///
  /// Uses `_exit(2)`: no `atexit` handlers and no stdio flushing run, so the
  /// child never replays state it inherited from the parent.
  #[inline]
  pub(crate) fn exit_process(self) -> ! {
    // SAFETY: `_exit` has no preconditions and never returns.
    unsafe { libc::_exit(self.0) }
  }

  #[inline]
  pub(crate) const fn to_i32(self) -> i32 {
    self.0
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
