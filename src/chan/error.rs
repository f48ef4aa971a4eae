use std::io::Error as IoError;
use thiserror::Error;

/// Error type returned from failed channel operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChannelError {
  /// The transport failed while reading or writing a frame.
  #[error("transport failure: {0}")]
  Io(#[from] IoError),
  /// A value could not be encoded.
  #[error("failed to encode message: {0}")]
  Encode(#[from] rmp_serde::encode::Error),
  /// A received frame could not be decoded into the expected type.
  #[error("failed to decode message: {0}")]
  Decode(#[from] rmp_serde::decode::Error),
  /// An encoded value exceeds the configured frame limit.
  #[error("encoded message of {size} bytes exceeds the {limit} byte frame limit")]
  TooLarge {
    /// Size of the encoded message.
    size: usize,
    /// Configured maximum frame length.
    limit: usize,
  },
  /// The peer closed its end of the channel.
  #[error("channel closed by peer")]
  Closed,
}

impl ChannelError {
  /// Returns `true` if the value could not be serialized for transmission.
  ///
  /// Nothing has been written to the transport when this returns `true`.
  #[inline]
  pub const fn is_encode(&self) -> bool {
    matches!(self, Self::Encode(_) | Self::TooLarge { .. })
  }

  /// Returns `true` if the peer is gone.
  #[inline]
  pub const fn is_closed(&self) -> bool {
    matches!(self, Self::Closed)
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use std::io::Error as IoError;
  use std::io::ErrorKind;

  use crate::chan::ChannelError;

  #[test]
  fn test_is_encode() {
    assert!(ChannelError::TooLarge { size: 2, limit: 1 }.is_encode());
    assert!(!ChannelError::Closed.is_encode());
    assert!(!ChannelError::from(IoError::from(ErrorKind::BrokenPipe)).is_encode());
  }

  #[test]
  fn test_is_closed() {
    assert!(ChannelError::Closed.is_closed());
    assert!(!ChannelError::TooLarge { size: 2, limit: 1 }.is_closed());
  }

  #[test]
  fn test_display_too_large() {
    let error: ChannelError = ChannelError::TooLarge { size: 10, limit: 4 };
    assert_eq!(
      error.to_string(),
      "encoded message of 10 bytes exceeds the 4 byte frame limit",
    );
  }
}
