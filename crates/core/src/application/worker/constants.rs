// Poll loop constants (No magic values)
use std::time::Duration;

/// Long-poll wait for a message to arrive (10s)
pub const DEFAULT_WAIT_TIME: Duration = Duration::from_secs(10);

/// Upper bound SQS accepts for a receive wait (20s)
pub const MAX_WAIT_TIME: Duration = Duration::from_secs(20);

/// Sleep duration when the queue is empty (5s)
pub const IDLE_SLEEP_DURATION: Duration = Duration::from_secs(5);

/// Sleep duration after a queue error before polling again (1s)
pub const ERROR_RECOVERY_SLEEP_DURATION: Duration = Duration::from_secs(1);

/// Receive count at which a failing message is dead-lettered
pub const DEFAULT_MAX_RECEIVE_COUNT: u32 = 10;
