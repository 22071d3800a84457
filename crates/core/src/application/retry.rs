// Retry logic
//
// Retries are not performed here. A failed message is simply not deleted and
// the queue redelivers it after its visibility timeout, incrementing the
// receive count. This policy only decides when to stop waiting for that.
use crate::application::worker::constants::DEFAULT_MAX_RECEIVE_COUNT;
use crate::domain::QueueMessage;
use tracing::{info, warn};

/// Retry decision result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Take no queue action; the queue will redeliver the message
    LeaveForRedelivery,
    /// Stop retrying: move the body to the dead-letter queue
    DeadLetter,
}

/// Receive-count threshold policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_receive_count: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RECEIVE_COUNT)
    }
}

impl RetryPolicy {
    /// Create a new retry policy
    ///
    /// # Arguments
    /// * `max_receive_count` - receive count at which a failing message is
    ///   dead-lettered (default: 10)
    pub fn new(max_receive_count: u32) -> Self {
        Self { max_receive_count }
    }

    pub fn max_receive_count(&self) -> u32 {
        self.max_receive_count
    }

    /// Decide the fate of a message whose processing failed
    ///
    /// Only consulted on failure; a message that eventually succeeds is
    /// acknowledged regardless of how many deliveries it took.
    pub fn should_retry(&self, message: &QueueMessage) -> RetryDecision {
        if message.receive_count >= self.max_receive_count {
            warn!(
                message_id = %message.message_id,
                receive_count = message.receive_count,
                max_receive_count = self.max_receive_count,
                "Max receive count reached"
            );
            return RetryDecision::DeadLetter;
        }

        info!(
            message_id = %message.message_id,
            receive_count = message.receive_count,
            max_receive_count = self.max_receive_count,
            "Leaving message for redelivery"
        );
        RetryDecision::LeaveForRedelivery
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_with_count(receive_count: u32) -> QueueMessage {
        QueueMessage::new("m-1", "{}", "r-1", receive_count)
    }

    #[test]
    fn test_default_threshold_is_ten() {
        assert_eq!(RetryPolicy::default().max_receive_count(), 10);
    }

    #[test]
    fn test_below_threshold_leaves_message() {
        let policy = RetryPolicy::default();
        for count in 1..10 {
            assert_eq!(
                policy.should_retry(&message_with_count(count)),
                RetryDecision::LeaveForRedelivery,
                "count {}",
                count
            );
        }
    }

    #[test]
    fn test_at_or_above_threshold_dead_letters() {
        let policy = RetryPolicy::default();
        for count in [10, 11, 50] {
            assert_eq!(
                policy.should_retry(&message_with_count(count)),
                RetryDecision::DeadLetter,
                "count {}",
                count
            );
        }
    }

    #[test]
    fn test_custom_threshold() {
        let policy = RetryPolicy::new(3);
        assert_eq!(
            policy.should_retry(&message_with_count(2)),
            RetryDecision::LeaveForRedelivery
        );
        assert_eq!(
            policy.should_retry(&message_with_count(3)),
            RetryDecision::DeadLetter
        );
    }
}
