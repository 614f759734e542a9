//! Crate-level error type.
//!
//! Per-fetch and per-cycle failures have their own types
//! ([`FetchError`](crate::api_client::FetchError),
//! [`ErrorDetail`](crate::aggregator::ErrorDetail)) because the poll state
//! stores them. This enum covers configuration and scheduler misuse.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Poll scheduler is not running")]
    NotRunning,
}

pub type Result<T> = std::result::Result<T, Error>;
