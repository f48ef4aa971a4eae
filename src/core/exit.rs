use serde::Deserialize;
use serde::Serialize;
use std::any::type_name;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

use crate::error::Exception;

/// Serde name reserved for [`ExitStatus`].
///
/// Application messages are checked against this name before they are sent,
/// so the name must not be used by any other type.
pub(crate) const EXIT_STATUS_NAME: &str = "$procfork::ExitStatus";

/// Terminal result describing how the function in a child process finished.
///
/// A child sends exactly one exit status, as its final message. The parent
/// receives it through [`Fork::join`]; applications can never send one
/// themselves.
///
/// # Examples
///
/// ```
/// use procfork::core::ExitStatus;
///
/// let status: ExitStatus<u32> = ExitStatus::Success(42);
///
/// assert!(status.is_success());
/// assert_eq!(status.into_result().unwrap(), 42);
/// ```
///
/// [`Fork::join`]: crate::fork::Fork::join
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "$procfork::ExitStatus")]
pub enum ExitStatus<T> {
  /// The function returned normally with the given value.
  Success(T),
  /// The function, or the transmission of its result, failed.
  Failure(Exception),
}

impl<T> ExitStatus<T> {
  /// Returns `true` if the function returned normally.
  #[inline]
  pub const fn is_success(&self) -> bool {
    matches!(self, Self::Success(_))
  }

  /// Returns `true` if the function failed.
  #[inline]
  pub const fn is_failure(&self) -> bool {
    matches!(self, Self::Failure(_))
  }

  /// Converts the exit status into the result it describes.
  #[inline]
  pub fn into_result(self) -> Result<T, Exception> {
    match self {
      Self::Success(value) => Ok(value),
      Self::Failure(exception) => Err(exception),
    }
  }

  /// Returns a short description of the outcome, used in diagnostics.
  pub(crate) fn describe(&self) -> String {
    match self {
      Self::Success(_) => format!("success of type {}", type_name::<T>()),
      Self::Failure(exception) => format!("failure ({exception})"),
    }
  }
}

impl<T> From<Result<T, Exception>> for ExitStatus<T> {
  #[inline]
  fn from(other: Result<T, Exception>) -> Self {
    match other {
      Ok(value) => Self::Success(value),
      Err(exception) => Self::Failure(exception),
    }
  }
}

impl<T> Debug for ExitStatus<T>
where
  T: Debug,
{
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    match self {
      Self::Success(inner) => f.debug_tuple("Success").field(inner).finish(),
      Self::Failure(inner) => f.debug_tuple("Failure").field(inner).finish(),
    }
  }
}

impl<T> Display for ExitStatus<T>
where
  T: Debug,
{
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    match self {
      Self::Success(inner) => write!(f, "success({inner:?})"),
      Self::Failure(inner) => write!(f, "failure({inner})"),
    }
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use crate::core::ExitStatus;
  use crate::error::Exception;
  use crate::error::ExceptionClass;

  fn failure() -> Exception {
    Exception::new(ExceptionClass::Error, "app::Oops", "oops")
  }

  #[test]
  fn test_is_success() {
    assert!(ExitStatus::Success(1_u8).is_success());
    assert!(!ExitStatus::<u8>::Failure(failure()).is_success());
  }

  #[test]
  fn test_is_failure() {
    assert!(ExitStatus::<u8>::Failure(failure()).is_failure());
    assert!(!ExitStatus::Success(1_u8).is_failure());
  }

  #[test]
  fn test_into_result() {
    assert_eq!(ExitStatus::Success(5_i32).into_result(), Ok(5));
    assert_eq!(ExitStatus::<i32>::Failure(failure()).into_result(), Err(failure()));
  }

  #[test]
  fn test_from_result() {
    assert_eq!(ExitStatus::from(Ok::<_, Exception>(3_u8)), ExitStatus::Success(3));
    assert_eq!(ExitStatus::<u8>::from(Err(failure())), ExitStatus::Failure(failure()));
  }

  #[test]
  fn test_describe() {
    assert_eq!(ExitStatus::Success(1_u8).describe(), "success of type u8");
    assert_eq!(
      ExitStatus::<u8>::Failure(failure()).describe(),
      "failure (error:app::Oops - oops)",
    );
  }

  #[test]
  fn test_display() {
    assert_eq!(format!("{}", ExitStatus::Success("ok")), "success(\"ok\")");
    assert_eq!(
      format!("{}", ExitStatus::<()>::Failure(failure())),
      "failure(error:app::Oops - oops)",
    );
  }
}
