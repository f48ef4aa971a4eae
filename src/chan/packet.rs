use serde::Deserialize;
use serde::Serialize;

use crate::core::ExitStatus;

/// Envelope for every frame written to a channel.
///
/// `M` is the application message type and `T` the success type of the
/// child function. Both peers encode with this definition, so the variant
/// chosen by the sender is preserved regardless of how the receiver
/// instantiates `M`.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) enum Packet<M, T> {
  /// An application message.
  Message(M),
  /// The terminal exit status of the child.
  Exit(ExitStatus<T>),
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
