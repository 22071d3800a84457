// Application Layer - Use Cases and Business Logic

pub mod lifecycle;
pub mod processor;
pub mod retry;
pub mod worker;

// Re-exports
pub use lifecycle::{Disposition, LifecycleController};
pub use processor::WorkUnitProcessor;
pub use retry::{RetryDecision, RetryPolicy};
pub use worker::{shutdown_channel, PollLoop, PollSettings, ShutdownSender, ShutdownToken};
