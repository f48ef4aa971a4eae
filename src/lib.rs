//! Procfork - Run async calls in forked child processes.
//!
//! Procfork captures a deferred async call, forks the calling process to run
//! it, and returns the result to the parent over a private channel. While
//! the child runs, both sides can exchange serialized messages; the parent
//! can also signal, reprioritize, or kill the child.
//!
//! # Quick Start
//!
//! ```no_run
//! use procfork::Fork;
//! use procfork::ForkContext;
//! use procfork::error::ForkError;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), ForkError> {
//!   let mut fork: Fork<u64> = Fork::spawn(|| async { Ok::<_, ForkError>(6 * 7) })?;
//!
//!   assert_eq!(fork.join().await?, 42);
//!
//!   let mut echo: Fork<()> = Fork::spawn_with_channel(|context: ForkContext| async move {
//!     let message: String = context.receive().await?;
//!     context.send(&message).await
//!   })?;
//!
//!   echo.send("hello").await?;
//!
//!   assert_eq!(echo.receive::<String>().await?, "hello");
//!
//!   echo.join().await
//! }
//! ```
//!
//! # Core Modules
//!
//! - [`fork`]: Forked process contexts
//! - [`core`]: Exit status exchanged at the end of a run
//! - [`error`]: Error and exception types
//! - [`init`]: Tracing initialization
//! - [`consts`]: Configuration defaults
//!
//! # Platform Support
//!
//! Forking requires a Unix host; see [`supported`]. Forking a process that
//! runs several threads only duplicates the calling thread, so the child
//! never reuses the parent's runtime.

#[cfg(not(unix))]
compile_error!("procfork requires a unix target");

mod chan;
mod sys;

pub mod consts;
pub mod core;
pub mod error;
pub mod fork;
pub mod init;

pub use self::fork::Fork;
pub use self::fork::ForkConfig;
pub use self::fork::ForkContext;
pub use self::sys::supported;

pub use nix::sys::signal::Signal;
pub use nix::unistd::Pid;
