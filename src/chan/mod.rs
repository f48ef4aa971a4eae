//! Message channel between a parent process and its forked child.
//!
//! A channel is one end of a connected Unix stream socket. Every message
//! is encoded with MessagePack and written as a single length-delimited
//! frame, so messages arrive complete and in send order.
//!
//! Messages are wrapped in a [`Packet`], which distinguishes application
//! messages from the terminal [`ExitStatus`] by variant rather than by a
//! wire marker of its own.
//!
//! [`ExitStatus`]: crate::core::ExitStatus

mod channel;
mod error;
mod kind;
mod packet;
mod probe;
mod transport;

pub(crate) use self::channel::Channel;
pub(crate) use self::kind::MessageKind;
pub(crate) use self::packet::Packet;
pub(crate) use self::probe::is_exit_status;
pub(crate) use self::transport::Transport;

pub use self::error::ChannelError;
