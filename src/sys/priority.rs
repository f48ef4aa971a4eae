//! Scheduling priority of a child process.
//!
//! The OS exposes priority as a niceness value where lower means more CPU
//! time. Callers work with a priority fraction instead:
//!
//! ```text
//! priority = (19 - niceness) / 39      niceness = round(19 - priority * 39)
//! ```
//!
//! so niceness `19` is priority `0.0` and niceness `-20` is priority `1.0`.

use nix::errno::Errno;
use nix::unistd::Pid;

use crate::consts;

/// Maps a niceness value to a priority in `[0, 1]`.
#[inline]
pub(crate) fn niceness_to_priority(niceness: i32) -> f64 {
  (f64::from(consts::NICE_MAX - niceness) / consts::NICE_SPAN).clamp(0.0, 1.0)
}

/// Maps a priority in `[0, 1]` to the nearest niceness value.
#[inline]
pub(crate) fn priority_to_niceness(priority: f64) -> i32 {
  let niceness: f64 = (f64::from(consts::NICE_MAX) - priority * consts::NICE_SPAN).round();

  (niceness as i32).clamp(consts::NICE_MIN, consts::NICE_MAX)
}

/// Reads the niceness of `pid`.
pub(crate) fn get_niceness(pid: Pid) -> Result<i32, Errno> {
  // `getpriority` legitimately returns -1, errno is the only error signal.
  Errno::clear();

  // SAFETY: `getpriority` only reads kernel state for the given id.
  let niceness: i32 = unsafe { libc::getpriority(libc::PRIO_PROCESS, pid.as_raw() as libc::id_t) };

  if niceness == -1 {
    let errno: Errno = Errno::last();

    if errno != Errno::UnknownErrno {
      return Err(errno);
    }
  }

  Ok(niceness)
}

/// Changes the niceness of `pid`.
///
/// Lowering niceness (raising priority) usually requires privileges.
pub(crate) fn set_niceness(pid: Pid, niceness: i32) -> Result<(), Errno> {
  // SAFETY: `setpriority` only updates kernel state for the given id.
  let result: i32 =
    unsafe { libc::setpriority(libc::PRIO_PROCESS, pid.as_raw() as libc::id_t, niceness) };

  Errno::result(result).map(drop)
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use crate::sys::get_niceness;
  use crate::sys::getpid;
  use crate::sys::niceness_to_priority;
  use crate::sys::priority_to_niceness;

  #[test]
  fn test_priority_bounds() {
    assert_eq!(niceness_to_priority(19), 0.0);
    assert_eq!(niceness_to_priority(-20), 1.0);
    assert_eq!(priority_to_niceness(0.0), 19);
    assert_eq!(priority_to_niceness(1.0), -20);
  }

  #[test]
  fn test_priority_is_clamped() {
    assert_eq!(niceness_to_priority(-40), 1.0);
    assert_eq!(niceness_to_priority(40), 0.0);
  }

  #[test]
  fn test_priority_midpoint() {
    assert_eq!(niceness_to_priority(0), 19.0 / 39.0);
    assert_eq!(priority_to_niceness(19.0 / 39.0), 0);
    // 19 - 0.5 * 39 = -0.5, rounded away from zero
    assert_eq!(priority_to_niceness(0.5), -1);
  }

  #[test]
  fn test_priority_rounding() {
    // 19 - 0.25 * 39 = 9.25
    assert_eq!(priority_to_niceness(0.25), 9);
    // 19 - 0.75 * 39 = -10.25
    assert_eq!(priority_to_niceness(0.75), -10);
  }

  #[test]
  fn test_priority_roundtrip() {
    for step in 0..=100 {
      let priority: f64 = f64::from(step) / 100.0;
      let niceness: i32 = priority_to_niceness(priority);
      let restored: f64 = niceness_to_priority(niceness);

      assert_eq!(priority_to_niceness(restored), niceness);
      assert!((restored - priority).abs() <= 0.5 / 39.0 + f64::EPSILON);
    }
  }

  #[test]
  fn test_get_niceness_of_self() {
    let niceness: i32 = get_niceness(getpid()).unwrap();
    assert!((-20..=19).contains(&niceness));
  }
}
