use bytes::Bytes;
use bytes::BytesMut;
use futures_util::SinkExt;
use futures_util::StreamExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::io::Result as IoResult;
use std::os::unix::net::UnixStream as StdUnixStream;
use tokio::net::UnixStream;
use tokio_util::codec::Framed;
use tokio_util::codec::LengthDelimitedCodec;

use crate::chan::ChannelError;

/// One end of an ordered, reliable, bidirectional message channel.
///
/// Values are encoded with MessagePack and written as length-delimited
/// frames. Dropping the channel closes its end of the transport.
pub(crate) struct Channel {
  framed: Framed<UnixStream, LengthDelimitedCodec>,
  limit: usize,
}

impl Channel {
  /// Creates a channel over `stream`.
  ///
  /// Must be called from within a tokio runtime; the stream is registered
  /// with the runtime's I/O driver.
  pub(crate) fn new(stream: StdUnixStream, limit: usize) -> IoResult<Self> {
    stream.set_nonblocking(true)?;

    let stream: UnixStream = UnixStream::from_std(stream)?;

    let codec: LengthDelimitedCodec = LengthDelimitedCodec::builder()
      .max_frame_length(limit)
      .new_codec();

    Ok(Self {
      framed: Framed::new(stream, codec),
      limit,
    })
  }

  /// Encodes `value` and writes it as a single frame.
  ///
  /// Encoding happens before any byte is written, so a value that fails to
  /// encode leaves the channel untouched.
  pub(crate) async fn send<V>(&mut self, value: &V) -> Result<(), ChannelError>
  where
    V: Serialize + ?Sized,
  {
    let data: Vec<u8> = rmp_serde::to_vec(value)?;

    if data.len() > self.limit {
      return Err(ChannelError::TooLarge {
        size: data.len(),
        limit: self.limit,
      });
    }

    self.framed.send(Bytes::from(data)).await?;

    Ok(())
  }

  /// Waits for the next frame and decodes it as `V`.
  pub(crate) async fn recv<V>(&mut self) -> Result<V, ChannelError>
  where
    V: DeserializeOwned,
  {
    let frame: BytesMut = match self.framed.next().await {
      Some(Ok(frame)) => frame,
      Some(Err(error)) => return Err(error.into()),
      None => return Err(ChannelError::Closed),
    };

    Ok(rmp_serde::from_slice(&frame)?)
  }
}

impl Debug for Channel {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.write_str("Channel(..)")
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
