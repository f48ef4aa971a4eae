use serde::Deserialize;
use serde::Serialize;
use std::any::Any;
use std::any::type_name;
use std::backtrace::Backtrace;
use std::backtrace::BacktraceStatus;
use std::error::Error;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;

use crate::consts;
use crate::error::ExceptionClass;

/// Type name recorded for exceptions created from a panic payload.
const PANIC_NAME: &str = "panic";

/// Marker appended to text cut down to [`MAX_ENCODE_TEXT_LENGTH`].
///
/// [`MAX_ENCODE_TEXT_LENGTH`]: consts::MAX_ENCODE_TEXT_LENGTH
const ELLIPSIS: &str = "...";

/// A serializable description of a failure raised inside a child process.
///
/// Exceptions are created by the child-side wrapper and travel to the
/// parent inside an [`ExitStatus::Failure`]. They only contain strings, so
/// encoding an exception never fails.
///
/// # Display Format
///
/// Exceptions format as: `{class}:{name} - {error}`
///
/// Example: `error:app::DivideByZero - division by zero`
///
/// # Equality
///
/// Two exceptions are equal if their class, name, and message are equal;
/// the captured trace is ignored.
///
/// [`ExitStatus::Failure`]: crate::core::ExitStatus::Failure
#[derive(Clone, Serialize, Deserialize)]
pub struct Exception {
  class: ExceptionClass,
  name: String,
  error: String,
  trace: String,
}

impl Exception {
  /// Creates a new exception with the given class, type name, and message.
  ///
  /// Captures a backtrace at the call site; the rendered trace is empty
  /// unless backtraces are enabled via `RUST_BACKTRACE`.
  ///
  /// # Examples
  ///
  /// ```
  /// use procfork::error::{Exception, ExceptionClass};
  ///
  /// let exception = Exception::new(ExceptionClass::Error, "io", "broken pipe");
  ///
  /// assert_eq!(exception.to_string(), "error:io - broken pipe");
  /// ```
  pub fn new<N, T>(class: ExceptionClass, name: N, error: T) -> Self
  where
    N: Into<String>,
    T: Display,
  {
    Self {
      class,
      name: name.into(),
      error: error.to_string(),
      trace: render_trace(Backtrace::capture()),
    }
  }

  /// Creates an [`Error`] class exception from an error value.
  ///
  /// The type name of `E` is recorded so the parent can identify the
  /// original error with [`Exception::is`].
  ///
  /// [`Error`]: ExceptionClass::Error
  #[inline]
  pub fn from_error<E>(error: E) -> Self
  where
    E: Display + 'static,
  {
    Self::new(ExceptionClass::Error, type_name::<E>(), error)
  }

  /// Creates a [`Panic`] class exception from a caught panic payload.
  ///
  /// [`Panic`]: ExceptionClass::Panic
  pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
    let error: &str = if let Some(message) = payload.downcast_ref::<&'static str>() {
      message
    } else if let Some(message) = payload.downcast_ref::<String>() {
      message.as_str()
    } else {
      "Box<dyn Any>"
    };

    Self::new(ExceptionClass::Panic, PANIC_NAME, error)
  }

  /// Creates an [`Encode`] class exception from a serialization error.
  ///
  /// The result stands in for a value that could not be sent, so it must
  /// fit any channel: it carries no trace, and the name and message are
  /// cut to [`MAX_ENCODE_TEXT_LENGTH`] bytes each.
  ///
  /// [`Encode`]: ExceptionClass::Encode
  /// [`MAX_ENCODE_TEXT_LENGTH`]: consts::MAX_ENCODE_TEXT_LENGTH
  pub fn from_encode<E>(error: &E) -> Self
  where
    E: Display + 'static,
  {
    Self {
      class: ExceptionClass::Encode,
      name: truncate(type_name::<E>().to_owned()),
      error: truncate(error.to_string()),
      trace: String::new(),
    }
  }

  /// Returns the exception class.
  #[inline]
  pub const fn class(&self) -> ExceptionClass {
    self.class
  }

  /// Returns the type name of the original error.
  #[inline]
  pub const fn name(&self) -> &str {
    self.name.as_str()
  }

  /// Returns the human-readable error message.
  #[inline]
  pub const fn error(&self) -> &str {
    self.error.as_str()
  }

  /// Returns the backtrace captured in the child, rendered as text.
  ///
  /// Empty if backtraces were disabled in the child.
  #[inline]
  pub const fn trace(&self) -> &str {
    self.trace.as_str()
  }

  /// Returns `true` if this exception was created from an error of type `E`.
  ///
  /// # Examples
  ///
  /// ```
  /// use procfork::error::Exception;
  /// use std::fmt::Error as FmtError;
  ///
  /// let exception = Exception::from_error(FmtError);
  ///
  /// assert!(exception.is::<FmtError>());
  /// assert!(!exception.is::<std::io::Error>());
  /// ```
  #[inline]
  pub fn is<E>(&self) -> bool
  where
    E: ?Sized + 'static,
  {
    self.name == type_name::<E>()
  }
}

impl Debug for Exception {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    Display::fmt(self, f)
  }
}

impl Display for Exception {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    write!(f, "{}:{} - {}", self.class, self.name, self.error)
  }
}

impl Error for Exception {}

impl PartialEq for Exception {
  fn eq(&self, other: &Self) -> bool {
    self.class == other.class && self.name == other.name && self.error == other.error
  }
}

impl Eq for Exception {}

#[inline]
fn render_trace(trace: Backtrace) -> String {
  match trace.status() {
    BacktraceStatus::Captured => trace.to_string(),
    _ => String::new(),
  }
}

/// Cuts `text` to at most [`MAX_ENCODE_TEXT_LENGTH`] bytes on a char
/// boundary, marking the cut with [`ELLIPSIS`].
///
/// [`MAX_ENCODE_TEXT_LENGTH`]: consts::MAX_ENCODE_TEXT_LENGTH
fn truncate(mut text: String) -> String {
  if text.len() <= consts::MAX_ENCODE_TEXT_LENGTH {
    return text;
  }

  let mut end: usize = consts::MAX_ENCODE_TEXT_LENGTH - ELLIPSIS.len();

  while !text.is_char_boundary(end) {
    end -= 1;
  }

  text.truncate(end);
  text.push_str(ELLIPSIS);
  text
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
