//! OS process capability used by [`Fork`].
//!
//! Every interaction with the host OS goes through this module:
//!
//! - [`supported`]: Whether the host can duplicate processes
//! - process duplication, liveness queries, signal delivery, and reaping
//! - niceness queries and updates, plus the niceness/priority mapping
//! - immediate process termination with an [`ExitCode`]
//!
//! All operations are synchronous and never suspend the caller.
//!
//! [`Fork`]: crate::fork::Fork

mod exit_code;
mod priority;
mod process;

pub(crate) use self::exit_code::ExitCode;
pub(crate) use self::priority::get_niceness;
pub(crate) use self::priority::niceness_to_priority;
pub(crate) use self::priority::priority_to_niceness;
pub(crate) use self::priority::set_niceness;
pub(crate) use self::process::fork;
pub(crate) use self::process::getpid;
pub(crate) use self::process::is_alive;
pub(crate) use self::process::reap;
pub(crate) use self::process::signal;

/// Returns `true` if the host OS allows duplicating the calling process.
///
/// Unix targets that forbid `fork(2)` for applications (such as iOS-family
/// targets) report `false`; this never changes while the program runs.
#[inline]
pub const fn supported() -> bool {
  cfg!(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly",
    target_os = "illumos",
    target_os = "solaris",
  ))
}
