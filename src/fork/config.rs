use crate::consts;

/// Configuration of a forked process.
///
/// The `rt_*` settings shape the single-threaded runtime that drives the
/// deferred call inside the child; the `ch_*` settings apply to both ends of
/// the channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForkConfig {
  // ---------------------------------------------------------------------------
  // Child Runtime Configuration
  // ---------------------------------------------------------------------------
  pub rt_event_interval: u32,
  pub rt_max_io_events_per_tick: usize,
  pub rt_thread_name: String,
  pub rt_thread_stack_size: usize,
  // ---------------------------------------------------------------------------
  // Channel Configuration
  // ---------------------------------------------------------------------------
  pub ch_max_frame_length: usize,
}

impl ForkConfig {
  #[inline]
  pub fn new() -> Self {
    Self {
      rt_event_interval: consts::DEFAULT_EVENT_INTERVAL,
      rt_max_io_events_per_tick: consts::DEFAULT_MAX_IO_EVENTS_PER_TICK,
      rt_thread_name: consts::DEFAULT_THREAD_NAME.to_owned(),
      rt_thread_stack_size: consts::DEFAULT_THREAD_STACK_SIZE,
      ch_max_frame_length: consts::DEFAULT_MAX_FRAME_LENGTH,
    }
  }
}

impl Default for ForkConfig {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
