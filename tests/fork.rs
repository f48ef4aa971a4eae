use nix::errno::Errno;
use procfork::Fork;
use procfork::ForkConfig;
use procfork::ForkContext;
use procfork::Pid;
use procfork::Signal;
use procfork::consts;
use procfork::core::ExitStatus;
use procfork::error::ChannelError;
use procfork::error::Exception;
use procfork::error::ExceptionClass;
use procfork::error::ForkError;
use serde::Deserialize;
use serde::Serialize;
use serde::Serializer;
use serde::ser::Error as _;
use std::convert::Infallible;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::time::Duration;
use std::time::Instant;

// -----------------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------------

#[derive(Debug)]
struct DivideByZero;

impl Display for DivideByZero {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.write_str("attempt to divide by zero")
  }
}

#[derive(Debug, Deserialize)]
struct Unencodable;

impl Serialize for Unencodable {
  fn serialize<S>(&self, _serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    Err(S::Error::custom("refusing to encode"))
  }
}

fn sleeper() -> Fork<()> {
  Fork::spawn(|| async {
    tokio::time::sleep(Duration::from_secs(60)).await;
    Ok::<_, Infallible>(())
  })
  .unwrap()
}

async fn wait_gone(pid: Pid) {
  let deadline: Instant = Instant::now() + Duration::from_secs(5);

  while nix::sys::signal::kill(pid, None) != Err(Errno::ESRCH) {
    assert!(Instant::now() < deadline, "child {pid} was not reaped");
    tokio::time::sleep(Duration::from_millis(10)).await;
  }
}

// -----------------------------------------------------------------------------
// Join
// -----------------------------------------------------------------------------

#[tokio::test]
async fn test_join_success() {
  let mut fork: Fork<i32> = Fork::spawn(|| async { Ok::<_, Infallible>(42) }).unwrap();

  assert!(fork.pid().is_some());
  assert_eq!(fork.join().await.unwrap(), 42);
  assert!(!fork.is_running());
  assert!(fork.pid().is_none());
}

#[tokio::test]
async fn test_join_error() {
  let mut fork: Fork<i32> = Fork::spawn(|| async { Err::<i32, _>(DivideByZero) }).unwrap();

  let error: ForkError = fork.join().await.unwrap_err();
  let exception: &Exception = error.exception().unwrap();

  assert_eq!(exception.class(), ExceptionClass::Error);
  assert!(exception.is::<DivideByZero>());
  assert_eq!(exception.error(), "attempt to divide by zero");
  assert!(!fork.is_running());
}

#[tokio::test]
async fn test_join_panic() {
  let mut fork: Fork<i32> = Fork::spawn(|| async {
    if std::hint::black_box(true) {
      panic!("child exploded");
    }

    Ok::<_, Infallible>(1)
  })
  .unwrap();

  let error: ForkError = fork.join().await.unwrap_err();
  let exception: &Exception = error.exception().unwrap();

  assert_eq!(exception.class(), ExceptionClass::Panic);
  assert!(exception.error().contains("child exploded"));
}

#[tokio::test]
async fn test_join_unencodable_result() {
  let mut fork: Fork<Unencodable> = Fork::spawn(|| async { Ok::<_, Infallible>(Unencodable) }).unwrap();

  let error: ForkError = fork.join().await.unwrap_err();
  let exception: &Exception = error.exception().unwrap();

  assert_eq!(exception.class(), ExceptionClass::Encode);
  assert!(exception.error().contains("refusing to encode"));
}

#[tokio::test]
async fn test_join_twice() {
  let mut fork: Fork<u8> = Fork::spawn(|| async { Ok::<_, Infallible>(1) }).unwrap();

  assert_eq!(fork.join().await.unwrap(), 1);
  assert!(fork.join().await.unwrap_err().is_status());
}

#[tokio::test]
async fn test_join_unexpected_message() {
  let mut fork: Fork<()> = Fork::spawn_with_channel(|context: ForkContext| async move {
    context.send("early").await?;
    tokio::time::sleep(Duration::from_secs(60)).await;
    Ok::<_, ForkError>(())
  })
  .unwrap();

  let error: ForkError = fork.join().await.unwrap_err();

  assert!(error.is_synchronization());
  assert!(error.to_string().ends_with("of kind str"));
  assert!(!fork.is_running());
}

#[tokio::test]
async fn test_join_cancelled_kills_child() {
  let mut fork: Fork<()> = sleeper();
  let pid: Pid = fork.pid().unwrap();

  let timeout = tokio::time::timeout(Duration::from_millis(50), fork.join()).await;

  assert!(timeout.is_err());
  assert!(!fork.is_running());

  wait_gone(pid).await;
}

// -----------------------------------------------------------------------------
// Messages
// -----------------------------------------------------------------------------

#[tokio::test]
async fn test_child_messages() {
  let mut fork: Fork<u32> = Fork::spawn_with_channel(|context: ForkContext| async move {
    context.send("first").await?;
    context.send("second").await?;
    Ok::<_, ForkError>(3)
  })
  .unwrap();

  assert_eq!(fork.receive::<String>().await.unwrap(), "first");
  assert_eq!(fork.receive::<String>().await.unwrap(), "second");
  assert_eq!(fork.join().await.unwrap(), 3);
}

#[tokio::test]
async fn test_echo() {
  let mut fork: Fork<()> = Fork::spawn_with_channel(|context: ForkContext| async move {
    loop {
      let data: Vec<u32> = context.receive().await?;

      if data.is_empty() {
        return Ok::<_, ForkError>(());
      }

      context.send(&data).await?;
    }
  })
  .unwrap();

  for size in 1..5_u32 {
    let data: Vec<u32> = (0..size).collect();

    fork.send(&data).await.unwrap();
    assert_eq!(fork.receive::<Vec<u32>>().await.unwrap(), data);
  }

  fork.send(&Vec::<u32>::new()).await.unwrap();
  fork.join().await.unwrap();
}

#[tokio::test]
async fn test_child_knows_parent() {
  let mut fork: Fork<i32> = Fork::spawn_with_channel(|context: ForkContext| async move {
    Ok::<_, Infallible>(context.parent().as_raw())
  })
  .unwrap();

  assert_eq!(fork.join().await.unwrap(), std::process::id() as i32);
}

#[tokio::test]
async fn test_send_exit_status() {
  let mut fork: Fork<i32> = Fork::spawn_with_channel(|context: ForkContext| async move {
    context.receive::<i32>().await
  })
  .unwrap();

  let success: ExitStatus<i32> = ExitStatus::Success(1);
  let failure: ExitStatus<i32> = ExitStatus::Failure(Exception::from_error(DivideByZero));

  assert!(fork.send(&success).await.unwrap_err().is_invalid_argument());
  assert!(fork.send(&failure).await.unwrap_err().is_invalid_argument());

  fork.send(&5_i32).await.unwrap();

  assert_eq!(fork.join().await.unwrap(), 5);
}

#[tokio::test]
async fn test_child_sends_exit_status() {
  let mut fork: Fork<bool> = Fork::spawn_with_channel(|context: ForkContext| async move {
    let status: ExitStatus<i32> = ExitStatus::Success(1);
    let error: ForkError = context.send(&status).await.unwrap_err();
    Ok::<_, Infallible>(error.is_invalid_argument())
  })
  .unwrap();

  assert!(fork.join().await.unwrap());
}

#[tokio::test]
async fn test_receive_after_exit() {
  let mut fork: Fork<i32> = Fork::spawn(|| async { Ok::<_, Infallible>(1) }).unwrap();

  let error: ForkError = fork.receive::<String>().await.unwrap_err();

  assert!(error.is_synchronization());
  assert!(!fork.is_running());
  assert!(fork.join().await.unwrap_err().is_status());
}

#[tokio::test]
async fn test_send_too_large() {
  let config: ForkConfig = ForkConfig {
    ch_max_frame_length: consts::MIN_MAX_FRAME_LENGTH,
    ..ForkConfig::new()
  };

  let mut fork: Fork<()> = Fork::with_channel(|context: ForkContext| async move {
    context.receive::<()>().await
  })
  .unwrap()
  .with_config(config);

  fork.start().unwrap();

  let error: ForkError = fork
    .send(&vec![0_u8; consts::MIN_MAX_FRAME_LENGTH * 2])
    .await
    .unwrap_err();

  assert!(matches!(error, ForkError::Channel(ChannelError::TooLarge { .. })));

  fork.send(&()).await.unwrap();
  fork.join().await.unwrap();
}

#[tokio::test]
async fn test_frame_limit_below_min() {
  let config: ForkConfig = ForkConfig {
    ch_max_frame_length: consts::MIN_MAX_FRAME_LENGTH - 1,
    ..ForkConfig::new()
  };

  let mut fork: Fork<()> = Fork::new(|| async { Ok::<_, Infallible>(()) })
    .unwrap()
    .with_config(config);

  assert!(fork.start().unwrap_err().is_invalid_argument());
  assert!(fork.pid().is_none());
}

#[tokio::test]
async fn test_unencodable_result_at_min_frame() {
  let config: ForkConfig = ForkConfig {
    ch_max_frame_length: consts::MIN_MAX_FRAME_LENGTH,
    ..ForkConfig::new()
  };

  let mut fork: Fork<Unencodable> = Fork::new(|| async { Ok::<_, Infallible>(Unencodable) })
    .unwrap()
    .with_config(config);

  fork.start().unwrap();

  let error: ForkError = fork.join().await.unwrap_err();

  assert_eq!(error.exception().unwrap().class(), ExceptionClass::Encode);
}

// -----------------------------------------------------------------------------
// Kill & Signal
// -----------------------------------------------------------------------------

#[tokio::test]
async fn test_kill() {
  let mut fork: Fork<()> = sleeper();
  let pid: Pid = fork.pid().unwrap();

  assert!(fork.is_running());

  fork.kill();
  assert!(!fork.is_running());

  fork.kill();
  assert!(fork.join().await.unwrap_err().is_status());

  wait_gone(pid).await;
}

#[tokio::test]
async fn test_drop_kills_child() {
  let fork: Fork<()> = sleeper();
  let pid: Pid = fork.pid().unwrap();

  drop(fork);

  wait_gone(pid).await;
}

#[tokio::test]
async fn test_signal() {
  let mut fork: Fork<()> = sleeper();

  fork.signal(Signal::SIGKILL).unwrap();

  let error: ForkError = fork.join().await.unwrap_err();
  assert!(matches!(error, ForkError::Channel(_)));
}

// -----------------------------------------------------------------------------
// Priority
// -----------------------------------------------------------------------------

#[tokio::test]
async fn test_priority() {
  let mut fork: Fork<()> = sleeper();
  let priority: f64 = fork.priority().unwrap();

  assert!((0.0..=1.0).contains(&priority));

  fork.set_priority(0.0).unwrap();
  assert_eq!(fork.priority().unwrap(), 0.0);

  fork.kill();
}

#[tokio::test]
async fn test_priority_out_of_range() {
  let mut fork: Fork<()> = sleeper();

  assert!(fork.set_priority(-0.1).unwrap_err().is_invalid_argument());
  assert!(fork.set_priority(1.1).unwrap_err().is_invalid_argument());
  assert!(fork.set_priority(f64::NAN).unwrap_err().is_invalid_argument());

  fork.kill();
}

// -----------------------------------------------------------------------------
// Lifecycle
// -----------------------------------------------------------------------------

#[tokio::test]
async fn test_unstarted() {
  let mut fork: Fork<i32> = Fork::new(|| async { Ok::<_, Infallible>(1) }).unwrap();

  assert!(!fork.is_running());
  assert!(fork.pid().is_none());
  assert!(fork.receive::<i32>().await.unwrap_err().is_status());
  assert!(fork.send(&1_i32).await.unwrap_err().is_status());
  assert!(fork.join().await.unwrap_err().is_status());
  assert!(fork.signal(Signal::SIGKILL).unwrap_err().is_status());
  assert!(fork.priority().unwrap_err().is_status());
  assert!(fork.set_priority(0.5).unwrap_err().is_status());

  fork.kill();
}

#[tokio::test]
async fn test_start_twice() {
  let mut fork: Fork<i32> = Fork::new(|| async { Ok::<_, Infallible>(1) }).unwrap();

  fork.start().unwrap();
  assert!(fork.start().unwrap_err().is_status());
  assert_eq!(fork.join().await.unwrap(), 1);
  assert!(fork.start().unwrap_err().is_status());
}

#[test]
fn test_start_without_runtime() {
  let mut fork: Fork<i32> = Fork::new(|| async { Ok::<_, Infallible>(1) }).unwrap();

  assert!(fork.start().unwrap_err().is_status());
  assert!(fork.pid().is_none());
}

#[tokio::test]
async fn test_unstarted_copy() {
  let data: Vec<u8> = vec![1, 2, 3];

  let mut fork: Fork<usize> = Fork::new(move || async move { Ok::<_, Infallible>(data.len()) }).unwrap();
  let mut copy: Fork<usize> = fork.unstarted_copy();

  fork.start().unwrap();
  assert_eq!(fork.join().await.unwrap(), 3);

  assert!(copy.pid().is_none());
  copy.start().unwrap();
  assert_eq!(copy.join().await.unwrap(), 3);
}
