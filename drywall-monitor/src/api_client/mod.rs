//! HTTP client for the DryWall integration backend.
//!
//! Each call is a single GET of one JSON resource. Transport failures and
//! non-success statuses become [`FetchError::Network`]; bodies that are
//! not the expected JSON become [`FetchError::Parse`]. There is no retry
//! here.

pub mod types;

use serde::de::DeserializeOwned;
use serde_json::Value;
use strum::Display;
use thiserror::Error;

use crate::config::{DEFAULT_BASE_URL, MonitorConfig};
use crate::error::{Error, Result};
use crate::tracing::prelude::*;
use types::{HealthPayload, SensorSummaryPayload, StatusPayload};

/// A JSON resource served by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Resource {
    /// `GET /api/drywall/status`
    Status,
    /// `GET /api/drywall/sensor-summary`
    SensorSummary,
    /// `GET /health`
    Health,
}

impl Resource {
    /// Path of the resource relative to the API base URL.
    pub fn path(self) -> &'static str {
        match self {
            Resource::Status => "/api/drywall/status",
            Resource::SensorSummary => "/api/drywall/sensor-summary",
            Resource::Health => "/health",
        }
    }
}

/// Failure of one fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Transport failure or non-success HTTP status.
    #[error("{resource}: {message}")]
    Network { resource: Resource, message: String },

    /// The body was not JSON, or not the JSON shape expected.
    #[error("{resource}: invalid response: {message}")]
    Parse { resource: Resource, message: String },
}

impl FetchError {
    pub fn resource(&self) -> Resource {
        match self {
            FetchError::Network { resource, .. } | FetchError::Parse { resource, .. } => *resource,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            FetchError::Network { message, .. } | FetchError::Parse { message, .. } => message,
        }
    }

    fn network(resource: Resource, message: impl ToString) -> Self {
        FetchError::Network {
            resource,
            message: message.to_string(),
        }
    }

    fn parse(resource: Resource, message: impl ToString) -> Self {
        FetchError::Parse {
            resource,
            message: message.to_string(),
        }
    }
}

/// Backend API client.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Client for the default base URL (`http://localhost:8000`).
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Build a client from configuration, applying the request timeout if
    /// one is set.
    pub fn from_config(config: &MonitorConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| Error::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, resource: Resource) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), resource.path())
    }

    /// Fetch one resource and parse the body as JSON.
    pub async fn fetch(&self, resource: Resource) -> std::result::Result<Value, FetchError> {
        let url = self.url(resource);
        trace!(%url, "GET");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::network(resource, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::network(
                resource,
                format!("server returned {status}"),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::network(resource, e))?;

        serde_json::from_slice(&body).map_err(|e| FetchError::parse(resource, e))
    }

    /// Fetch one resource and decode it into `T`.
    pub async fn fetch_as<T: DeserializeOwned>(
        &self,
        resource: Resource,
    ) -> std::result::Result<T, FetchError> {
        let value = self.fetch(resource).await?;
        serde_json::from_value(value).map_err(|e| FetchError::parse(resource, e))
    }

    pub async fn get_status(&self) -> std::result::Result<StatusPayload, FetchError> {
        self.fetch_as(Resource::Status).await
    }

    pub async fn get_sensor_summary(
        &self,
    ) -> std::result::Result<SensorSummaryPayload, FetchError> {
        self.fetch_as(Resource::SensorSummary).await
    }

    /// Liveness of the backend itself. Not part of a refresh cycle.
    pub async fn health(&self) -> std::result::Result<HealthPayload, FetchError> {
        self.fetch_as(Resource::Health).await
    }
}

#[cfg(test)]
mod tests {
    use axum::{Json, Router, http::StatusCode, routing::get};
    use test_case::test_case;

    use super::*;
    use crate::test_data::{self, serve, unreachable_base_url};

    #[test_case(Resource::Status, "status", "/api/drywall/status")]
    #[test_case(Resource::SensorSummary, "sensor-summary", "/api/drywall/sensor-summary")]
    #[test_case(Resource::Health, "health", "/health")]
    fn resource_names_and_paths(resource: Resource, name: &str, path: &str) {
        assert_eq!(resource.to_string(), name);
        assert_eq!(resource.path(), path);
    }

    #[test]
    fn url_ignores_trailing_slash_on_base() {
        let client = Client::with_base_url("http://example.test:8000/");
        assert_eq!(
            client.url(Resource::Status),
            "http://example.test:8000/api/drywall/status"
        );
    }

    #[tokio::test]
    async fn fetch_returns_json_body() {
        let router = Router::new().route(
            "/api/drywall/status",
            get(|| async { Json(test_data::status_json()) }),
        );
        let client = Client::with_base_url(serve(router).await);

        let value = client.fetch(Resource::Status).await.unwrap();
        assert_eq!(value["files_received"]["total_count"], 3);
    }

    #[tokio::test]
    async fn non_success_status_is_network_error() {
        let router = Router::new().route(
            "/api/drywall/status",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "Error getting status") }),
        );
        let client = Client::with_base_url(serve(router).await);

        let err = client.fetch(Resource::Status).await.unwrap_err();
        assert!(matches!(err, FetchError::Network { .. }));
        assert_eq!(err.resource(), Resource::Status);
        assert!(err.message().contains("500"), "{err}");
    }

    #[tokio::test]
    async fn missing_route_is_network_error() {
        let client = Client::with_base_url(serve(Router::new()).await);

        let err = client.fetch(Resource::SensorSummary).await.unwrap_err();
        assert!(matches!(err, FetchError::Network { .. }));
        assert!(err.message().contains("404"), "{err}");
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let router = Router::new().route(
            "/api/drywall/sensor-summary",
            get(|| async { "<html>not json</html>" }),
        );
        let client = Client::with_base_url(serve(router).await);

        let err = client.fetch(Resource::SensorSummary).await.unwrap_err();
        assert!(matches!(err, FetchError::Parse { .. }));
        assert_eq!(err.resource(), Resource::SensorSummary);
    }

    #[tokio::test]
    async fn wrong_shape_is_parse_error() {
        let router = Router::new().route(
            "/api/drywall/status",
            get(|| async { Json(serde_json::json!({ "files_received": "none" })) }),
        );
        let client = Client::with_base_url(serve(router).await);

        let err = client.get_status().await.unwrap_err();
        assert!(matches!(err, FetchError::Parse { .. }));
    }

    #[tokio::test]
    async fn unreachable_backend_is_network_error() {
        let client = Client::with_base_url(unreachable_base_url().await);

        let err = client.fetch(Resource::Health).await.unwrap_err();
        assert!(matches!(err, FetchError::Network { .. }));
        assert_eq!(err.resource(), Resource::Health);
    }

    #[tokio::test]
    async fn health_reads_status_field() {
        let router = Router::new().route(
            "/health",
            get(|| async { Json(test_data::health_json()) }),
        );
        let client = Client::with_base_url(serve(router).await);

        let health = client.health().await.unwrap();
        assert_eq!(health.status.as_deref(), Some("healthy"));
        assert_eq!(health.services.get("sftp").map(String::as_str), Some("running"));
    }

    #[tokio::test]
    async fn from_config_uses_configured_base_url() {
        let config = MonitorConfig {
            base_url: "http://10.0.0.5:8000".into(),
            request_timeout: Some(std::time::Duration::from_secs(2)),
            ..MonitorConfig::default()
        };
        let client = Client::from_config(&config).unwrap();
        assert_eq!(client.base_url(), "http://10.0.0.5:8000");
    }
}
