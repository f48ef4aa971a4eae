use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::sys::signal::kill;
use nix::sys::wait::WaitPidFlag;
use nix::sys::wait::WaitStatus;
use nix::sys::wait::waitpid;
use nix::unistd;
use nix::unistd::ForkResult;
use nix::unistd::Pid;
use std::thread;
use std::time::Instant;
use tokio::runtime::Handle;

use crate::consts;

/// Duplicates the calling process.
///
/// # Safety
///
/// The child starts with a single thread; every other thread of the parent
/// is gone and any lock they held stays locked. The caller must not touch
/// state shared with those threads in the child (including the parent's
/// async runtime) and must leave the child with [`ExitCode::exit_process`].
///
/// [`ExitCode::exit_process`]: crate::sys::ExitCode::exit_process
#[inline]
pub(crate) unsafe fn fork() -> Result<ForkResult, Errno> {
  // SAFETY: Upheld by the caller.
  unsafe { unistd::fork() }
}

/// Returns the process id of the calling process.
#[inline]
pub(crate) fn getpid() -> Pid {
  unistd::getpid()
}

/// Returns `true` if `pid` exists and has not exited.
///
/// A child that exited but was not yet reaped still owns a process group;
/// where the platform allows peeking at a child's state without reaping it,
/// such a child is reported as not alive.
pub(crate) fn is_alive(pid: Pid) -> bool {
  unistd::getpgid(Some(pid)).is_ok() && !has_exited(pid)
}

/// Delivers `signal` to `pid` without waiting for its reaction.
#[inline]
pub(crate) fn signal(pid: Pid, signal: Signal) -> Result<(), Errno> {
  kill(pid, signal)
}

/// Collects the exit status of a terminated child without blocking the
/// caller.
///
/// Inside a tokio runtime the child is awaited on the blocking pool;
/// elsewhere a single non-blocking attempt is made.
pub(crate) fn reap(pid: Pid) {
  match Handle::try_current() {
    Ok(handle) => {
      let _detached: _ = handle.spawn_blocking(move || reap_blocking(pid));
    }
    Err(_) => {
      let _ignore: _ = waitpid(pid, Some(WaitPidFlag::WNOHANG));
    }
  }
}

fn reap_blocking(pid: Pid) {
  let deadline: Instant = Instant::now() + consts::REAP_TIMEOUT;

  loop {
    match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
      Ok(WaitStatus::StillAlive) if Instant::now() < deadline => {
        thread::sleep(consts::REAP_POLL_INTERVAL);
      }
      Err(Errno::EINTR) => {}
      Ok(_) | Err(_) => break,
    }
  }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn has_exited(pid: Pid) -> bool {
  // SAFETY: An all-zero `siginfo_t` is a valid output buffer.
  let mut info: libc::siginfo_t = unsafe { std::mem::zeroed() };

  let flags: libc::c_int = libc::WEXITED | libc::WNOHANG | libc::WNOWAIT;

  // SAFETY: `info` is a valid, writable `siginfo_t`. `WNOWAIT` leaves the
  //         child in a waitable state.
  let result: libc::c_int =
    unsafe { libc::waitid(libc::P_PID, pid.as_raw() as libc::id_t, &mut info, flags) };

  // SAFETY: `waitid` succeeded, so `info` was initialized by the kernel
  //         (`si_pid` stays zero if the child has not changed state).
  result == 0 && unsafe { info.si_pid() } != 0
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn has_exited(_pid: Pid) -> bool {
  false
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
