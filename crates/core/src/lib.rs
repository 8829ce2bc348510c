//! Core types for tracking the top-K elements of an unbounded stream.

use std::time::Duration;

pub mod cancel;
pub mod config;
pub mod heap;
pub mod ordering;
pub mod snapshot;
pub mod topk;

pub use cancel::CancelToken;
pub use config::TopKConfig;
pub use ordering::{ByKey, Natural, Reversed, TotalOrder};
pub use snapshot::Snapshot;
pub use topk::{BoundedTopK, TopKStats};

#[derive(thiserror::Error, Debug)]
pub enum TopKError {
    #[error("snapshot wait was cancelled")]
    Cancelled,
    #[error("snapshot not ready after {0:?}")]
    TimedOut(Duration),
    #[error("capacity must be a positive integer, got {0}")]
    InvalidCapacity(usize),
    #[error("recheck interval must be non-zero")]
    InvalidRecheckInterval,
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TopKError>;
