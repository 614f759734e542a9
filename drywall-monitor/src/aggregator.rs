//! One refresh cycle: fetch both backend resources and merge them.
//!
//! The cycle succeeds or fails as a unit. If either fetch fails the other
//! result is dropped and the cycle reports an [`ErrorDetail`] naming the
//! failed resource; a partial snapshot is never produced.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::api_client::{Client, FetchError, Resource};
use crate::snapshot::StatusSnapshot;
use crate::tracing::prelude::*;

/// Why a refresh cycle failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{resource}: {message}")]
pub struct ErrorDetail {
    /// The resource whose fetch failed.
    pub resource: Resource,
    pub message: String,
}

impl From<FetchError> for ErrorDetail {
    fn from(err: FetchError) -> Self {
        let resource = err.resource();
        let message = match err {
            FetchError::Network { message, .. } => message,
            FetchError::Parse { message, .. } => format!("invalid response: {message}"),
        };
        Self { resource, message }
    }
}

/// Something that can produce a fresh [`StatusSnapshot`].
///
/// The poll scheduler drives one of these. [`Aggregator`] is the real
/// implementation; tests substitute scripted sources.
#[async_trait]
pub trait StatusSource: Send + Sync + 'static {
    async fn refresh(&self) -> Result<StatusSnapshot, ErrorDetail>;
}

#[async_trait]
impl<T: StatusSource> StatusSource for Arc<T> {
    async fn refresh(&self) -> Result<StatusSnapshot, ErrorDetail> {
        (**self).refresh().await
    }
}

/// Fetches the system status and sensor summary and merges them.
#[derive(Debug, Clone)]
pub struct Aggregator {
    client: Client,
}

impl Aggregator {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl StatusSource for Aggregator {
    /// Both fetches run concurrently. When both fail, the status
    /// resource is the one reported.
    async fn refresh(&self) -> Result<StatusSnapshot, ErrorDetail> {
        let (status, sensors) = tokio::join!(
            self.client.get_status(),
            self.client.get_sensor_summary()
        );

        let status = status.inspect_err(|e| warn!(error = %e, "Status fetch failed"))?;
        let sensors = sensors.inspect_err(|e| warn!(error = %e, "Sensor summary fetch failed"))?;

        Ok(StatusSnapshot::from_payloads(status, sensors))
    }
}
