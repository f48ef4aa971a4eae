use std::time::Duration;

// -----------------------------------------------------------------------------
// Exit Codes
// -----------------------------------------------------------------------------

/// Child exit code after a clean run of the child runtime.
pub const E_CODE_SUCCESS: i32 = 0;

/// Child exit code after a failure escaped the child runtime.
pub const E_CODE_FAILURE: i32 = 1;

// -----------------------------------------------------------------------------
// Process Priority
// -----------------------------------------------------------------------------

/// Niceness mapped to the highest priority (`1.0`) and above.
pub const NICE_MIN: i32 = -20;

/// Niceness mapped to the lowest priority (`0.0`).
pub const NICE_MAX: i32 = 19;

/// Number of niceness steps between the lowest and highest priority.
pub const NICE_SPAN: f64 = 39.0;

// -----------------------------------------------------------------------------
// Child Scheduler Behavior
// -----------------------------------------------------------------------------

/// Number of scheduler ticks before polling for external events.
pub const DEFAULT_EVENT_INTERVAL: u32 = 61;

/// Maximum number of I/O events processed per scheduler tick.
pub const DEFAULT_MAX_IO_EVENTS_PER_TICK: usize = 1024;

/// Name of the thread driving the child runtime.
pub const DEFAULT_THREAD_NAME: &str = "procfork-child";

/// Stack size (in bytes) of the thread driving the child runtime.
pub const DEFAULT_THREAD_STACK_SIZE: usize = 2 * 1024 * 1024;

// -----------------------------------------------------------------------------
// Channel Behavior
// -----------------------------------------------------------------------------

/// Maximum size (in bytes) of a single encoded message.
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 8 * 1024 * 1024;

/// Smallest accepted value of [`ForkConfig::ch_max_frame_length`].
///
/// Every encoding-failure exit status fits in a frame of this size.
///
/// [`ForkConfig::ch_max_frame_length`]: crate::ForkConfig::ch_max_frame_length
pub const MIN_MAX_FRAME_LENGTH: usize = 1024;

/// Maximum size (in bytes) of the name and of the message of an exception
/// reporting an encoding failure.
pub const MAX_ENCODE_TEXT_LENGTH: usize = 256;

// -----------------------------------------------------------------------------
// Teardown
// -----------------------------------------------------------------------------

/// Interval used by the blocking reaper while waiting on a killed child.
///
/// Note: This is only a safety net for children stuck in uninterruptible
///       sleep; a `SIGKILL`ed child is normally collected immediately.
pub const REAP_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Upper bound on how long the blocking reaper keeps polling.
pub const REAP_TIMEOUT: Duration = Duration::from_secs(10);
