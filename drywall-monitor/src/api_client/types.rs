//! API data transfer objects.
//!
//! These mirror the JSON the backend serves. Every scalar is optional:
//! the backend omits fields freely and the client passes absence through
//! rather than inventing values. Defaults are applied by
//! [`crate::projection`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::Display;

/// `GET /api/drywall/status`
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct StatusPayload {
    pub timestamp: Option<String>,
    /// Backend self-assessment, `"healthy"` when it could list uploads.
    pub status: Option<String>,
    pub drywall_integration: Option<IntegrationInfo>,
    pub files_received: Option<FilesReceivedPayload>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct IntegrationInfo {
    pub sftp_server: Option<String>,
    pub upload_directory: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct FilesReceivedPayload {
    pub total_count: Option<u64>,
    pub total_size_bytes: Option<u64>,
    #[serde(default)]
    pub files: Vec<FilePayload>,
}

/// A file uploaded by a DryWall client over SFTP.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct FilePayload {
    pub name: Option<String>,
    /// File extension without the dot, or `"unknown"`.
    #[serde(rename = "type")]
    pub file_type: Option<String>,
    /// Size in bytes.
    pub size: Option<u64>,
    pub modified: Option<String>,
}

/// `GET /api/drywall/sensor-summary`
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SensorSummaryPayload {
    pub summary: Option<SummaryTotals>,
    #[serde(default)]
    pub locations: BTreeMap<String, LocationPayload>,
    #[serde(default)]
    pub recent_readings: Vec<ReadingPayload>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SummaryTotals {
    pub total_sensors: Option<u64>,
    pub total_readings: Option<u64>,
    /// Percent relative humidity, averaged by the backend.
    pub average_humidity: Option<f64>,
    pub critical_alerts: Option<u64>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct LocationPayload {
    pub readings_count: Option<u64>,
    pub avg_humidity: Option<f64>,
    pub alert_count: Option<u64>,
    pub last_reading: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ReadingPayload {
    pub timestamp: Option<String>,
    pub sensor_id: Option<String>,
    pub location: Option<String>,
    pub humidity_percent: Option<f64>,
    pub alert_level: Option<AlertLevel>,
}

/// Severity the backend assigned to a reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum AlertLevel {
    Low,
    Medium,
    High,
}

/// `GET /health`
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct HealthPayload {
    pub status: Option<String>,
    pub timestamp: Option<String>,
    #[serde(default)]
    pub services: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_data;

    #[test]
    fn status_payload_decodes_backend_fields() {
        let status: StatusPayload = serde_json::from_value(test_data::status_json()).unwrap();

        let files = status.files_received.unwrap();
        assert_eq!(files.total_count, Some(3));
        assert_eq!(files.files[0].file_type.as_deref(), Some("csv"));
        assert_eq!(files.files[0].size, Some(2048));
        assert_eq!(
            status.drywall_integration.unwrap().sftp_server.as_deref(),
            Some("running")
        );
    }

    #[test]
    fn absent_fields_decode_as_none() {
        let status: StatusPayload = serde_json::from_value(json!({})).unwrap();
        assert!(status.timestamp.is_none());
        assert!(status.files_received.is_none());

        let sensors: SensorSummaryPayload = serde_json::from_value(json!({})).unwrap();
        assert!(sensors.summary.is_none());
        assert!(sensors.locations.is_empty());
        assert!(sensors.recent_readings.is_empty());
    }

    #[test]
    fn alert_level_is_upper_case_on_the_wire() {
        let reading: ReadingPayload =
            serde_json::from_value(json!({ "alert_level": "MEDIUM" })).unwrap();
        assert_eq!(reading.alert_level, Some(AlertLevel::Medium));
        assert_eq!(AlertLevel::High.to_string(), "HIGH");
    }

    #[test]
    fn unknown_alert_level_is_rejected() {
        let result: Result<ReadingPayload, _> =
            serde_json::from_value(json!({ "alert_level": "SEVERE" }));
        assert!(result.is_err());
    }

    #[test]
    fn integer_humidity_decodes_as_float() {
        let totals: SummaryTotals =
            serde_json::from_value(json!({ "average_humidity": 55 })).unwrap();
        assert_eq!(totals.average_humidity, Some(55.0));
    }
}
