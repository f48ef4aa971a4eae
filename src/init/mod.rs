//! Process-wide initialization.
//!
//! Installs the global [`tracing`] subscriber used to observe parents and
//! children. Forked children inherit the installed subscriber, so events
//! from both sides of a fork end up on the same output.

use std::error::Error as StdError;
use thiserror::Error;

// -----------------------------------------------------------------------------
// Tracing Config
// -----------------------------------------------------------------------------

/// Configuration of the global tracing subscriber.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TracingConfig {
  pub source_file: bool,
  pub source_line: bool,
  pub source_name: bool,
  pub thread_info: bool,
  pub verbose: bool,
  pub very_verbose: bool,
}

impl TracingConfig {
  #[inline]
  pub const fn new() -> Self {
    Self {
      source_file: false,
      source_line: false,
      source_name: false,
      thread_info: true,
      verbose: true,
      very_verbose: false,
    }
  }

  /// Returns the most verbose level recorded by the subscriber.
  #[inline]
  pub const fn filter(&self) -> tracing::Level {
    if self.very_verbose {
      tracing::Level::TRACE
    } else if self.verbose {
      tracing::Level::DEBUG
    } else {
      tracing::Level::INFO
    }
  }
}

impl Default for TracingConfig {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

// -----------------------------------------------------------------------------
// Init Error
// -----------------------------------------------------------------------------

/// Error returned when the global tracing subscriber cannot be installed.
#[derive(Debug, Error)]
#[error("failed to set tracing subscriber")]
pub struct InitError {
  #[source]
  source: Box<dyn StdError + Send + Sync + 'static>,
}

impl InitError {
  #[cfg_attr(not(feature = "subscriber"), allow(dead_code))]
  #[inline]
  fn new<E>(source: E) -> Self
  where
    E: StdError + Send + Sync + 'static,
  {
    Self {
      source: Box::new(source),
    }
  }
}

// -----------------------------------------------------------------------------
// Tracing Subscriber
// -----------------------------------------------------------------------------

/// Installs the global tracing subscriber.
///
/// Fails if a global subscriber was already installed. Without the `subscriber`
/// feature this does nothing.
#[cfg(feature = "subscriber")]
pub fn tracing(config: &TracingConfig) -> Result<(), InitError> {
  use tracing_subscriber::FmtSubscriber;
  use tracing_subscriber::fmt::format;
  use tracing_subscriber::util::SubscriberInitExt;

  FmtSubscriber::builder()
    .event_format(format().compact())
    .log_internal_errors(true)
    .with_ansi(true)
    .with_file(config.source_file)
    .with_level(true)
    .with_line_number(config.source_line)
    .with_max_level(config.filter())
    .with_target(config.source_name)
    .with_thread_ids(config.thread_info)
    .with_thread_names(config.thread_info)
    .finish()
    .try_init()
    .map_err(InitError::new)
}

/// Installs the global tracing subscriber.
///
/// Fails if a global subscriber was already installed. Without the `subscriber`
/// feature this does nothing.
#[cfg(not(feature = "subscriber"))]
pub fn tracing(_config: &TracingConfig) -> Result<(), InitError> {
  Ok(())
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
