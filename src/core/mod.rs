//! Protocol types exchanged between a parent process and its forked child.
//!
//! - [`ExitStatus`]: The terminal result a child sends exactly once

mod exit;

pub use self::exit::ExitStatus;

pub(crate) use self::exit::EXIT_STATUS_NAME;
