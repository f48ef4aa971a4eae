use std::io::Result;
use std::os::unix::net::UnixStream;

/// A connected pair of stream sockets created before the process split.
///
/// After `fork(2)` both processes hold both ends. Each side keeps its own
/// end with [`Transport::into_parent`] or [`Transport::into_child`], which
/// closes the other end in that process.
#[derive(Debug)]
pub(crate) struct Transport {
  parent: UnixStream,
  child: UnixStream,
}

impl Transport {
  /// Creates a new connected socket pair.
  #[inline]
  pub(crate) fn new() -> Result<Self> {
    let (parent, child): (UnixStream, UnixStream) = UnixStream::pair()?;

    Ok(Self { parent, child })
  }

  /// Keeps the parent-side endpoint, closing the child-side endpoint.
  #[inline]
  pub(crate) fn into_parent(self) -> UnixStream {
    drop(self.child);
    self.parent
  }

  /// Keeps the child-side endpoint, closing the parent-side endpoint.
  #[inline]
  pub(crate) fn into_child(self) -> UnixStream {
    drop(self.parent);
    self.child
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
