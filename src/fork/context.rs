use nix::unistd::Pid;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde::de::IgnoredAny;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::rc::Rc;
use tokio::sync::Mutex;

use crate::chan;
use crate::chan::Channel;
use crate::chan::Packet;
use crate::error::ForkError;
use crate::error::Result;

/// The child's side of the channel.
///
/// A context is handed to calls created with [`Fork::with_channel`] and is
/// only usable inside the child process. Clones share the same endpoint;
/// concurrent operations are serialized so frames never interleave.
///
/// [`Fork::with_channel`]: crate::Fork::with_channel
#[derive(Clone)]
pub struct ForkContext {
  channel: Rc<Mutex<Channel>>,
  parent: Pid,
}

impl ForkContext {
  #[inline]
  pub(crate) const fn new(channel: Rc<Mutex<Channel>>, parent: Pid) -> Self {
    Self { channel, parent }
  }

  /// Returns the process id of the parent that started this child.
  #[inline]
  pub const fn parent(&self) -> Pid {
    self.parent
  }

  /// Sends an application message to the parent.
  ///
  /// Returns [`ForkError::InvalidArgument`] if `data` is an
  /// [`ExitStatus`]; the child's exit status is reserved for its return
  /// value.
  ///
  /// [`ExitStatus`]: crate::core::ExitStatus
  pub async fn send<M>(&self, data: &M) -> Result<()>
  where
    M: Serialize + ?Sized,
  {
    if chan::is_exit_status(data) {
      return Err(ForkError::InvalidArgument("an exit status cannot be sent as a message"));
    }

    let mut channel = self.channel.lock().await;

    channel.send(&Packet::<&M, ()>::Message(data)).await?;

    Ok(())
  }

  /// Waits for the next application message from the parent.
  pub async fn receive<M>(&self) -> Result<M>
  where
    M: DeserializeOwned,
  {
    let mut channel = self.channel.lock().await;

    match channel.recv::<Packet<M, IgnoredAny>>().await? {
      Packet::Message(data) => Ok(data),
      Packet::Exit(_) => Err(ForkError::Synchronization(
        "received an exit status from the parent".to_owned(),
      )),
    }
  }
}

impl Debug for ForkContext {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("ForkContext")
      .field("parent", &self.parent)
      .finish_non_exhaustive()
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use nix::unistd::Pid;
  use std::os::unix::net::UnixStream;
  use std::rc::Rc;
  use tokio::sync::Mutex;

  use crate::chan::Channel;
  use crate::chan::Packet;
  use crate::consts;
  use crate::core::ExitStatus;
  use crate::fork::ForkContext;

  fn pair() -> (ForkContext, Channel) {
    let (this, peer) = UnixStream::pair().unwrap();
    let this: Channel = Channel::new(this, consts::DEFAULT_MAX_FRAME_LENGTH).unwrap();
    let peer: Channel = Channel::new(peer, consts::DEFAULT_MAX_FRAME_LENGTH).unwrap();
    let context: ForkContext = ForkContext::new(Rc::new(Mutex::new(this)), Pid::from_raw(1));

    (context, peer)
  }

  #[tokio::test]
  async fn test_send_message() {
    let (context, mut peer) = pair();

    context.send("hello").await.unwrap();

    let packet: Packet<String, ()> = peer.recv().await.unwrap();
    assert!(matches!(packet, Packet::Message(ref data) if data == "hello"));
  }

  #[tokio::test]
  async fn test_send_rejects_exit_status() {
    let (context, _peer) = pair();
    let status: ExitStatus<i32> = ExitStatus::Success(1);

    assert!(context.send(&status).await.unwrap_err().is_invalid_argument());
  }

  #[tokio::test]
  async fn test_receive_message() {
    let (context, mut peer) = pair();

    peer.send(&Packet::<_, ()>::Message(vec![1_u8, 2, 3])).await.unwrap();

    assert_eq!(context.receive::<Vec<u8>>().await.unwrap(), vec![1, 2, 3]);
  }

  #[tokio::test]
  async fn test_receive_exit_status() {
    let (context, mut peer) = pair();

    peer
      .send(&Packet::<(), i32>::Exit(ExitStatus::Success(1)))
      .await
      .unwrap();

    assert!(context.receive::<i32>().await.unwrap_err().is_synchronization());
  }

  #[test]
  fn test_parent() {
    let runtime = tokio::runtime::Builder::new_current_thread()
      .enable_io()
      .build()
      .unwrap();

    runtime.block_on(async {
      let (context, _peer) = pair();
      assert_eq!(context.parent(), Pid::from_raw(1));
    });
  }
}
