use thiserror::Error;

use crate::models::EventId;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("Serialization error")]
    Serialization(#[from] serde_json::Error),

    #[error("Event not found: {0}")]
    NotFound(EventId),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Scheduling declined")]
    Scheduling(#[from] SchedulingDeclined),
}

/// Raised by a [`TimerService`](crate::scheduler::TimerService) that refuses a wake-up.
/// Logged by the caller, never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulingDeclined {
    #[error("no async runtime is available to host the wake-up for event {0}")]
    NoRuntime(EventId),

    #[error("the fire channel for event {0} has been closed")]
    ReceiverClosed(EventId),
}
