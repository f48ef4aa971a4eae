use serde::Deserialize;
use serde::Serialize;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;

/// Classification of a failure raised inside a child process.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ExceptionClass {
  /// The child function returned an error value.
  Error,
  /// The child function panicked.
  Panic,
  /// The child function succeeded but its result could not be encoded for
  /// transmission to the parent.
  Encode,
}

impl Display for ExceptionClass {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    match self {
      Self::Error => f.write_str("error"),
      Self::Panic => f.write_str("panic"),
      Self::Encode => f.write_str("encode"),
    }
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
