//! The merged result of one successful refresh cycle.
//!
//! A [`StatusSnapshot`] is built from the two backend payloads by renaming
//! and regrouping fields only. Nothing is recomputed: averages and alert
//! levels are whatever the backend sent. Fields the backend omitted stay
//! `None` here so that the default policy lives in one place, the
//! projection.

use std::collections::BTreeMap;

pub use crate::api_client::types::AlertLevel;
use crate::api_client::types::{
    FilePayload, FilesReceivedPayload, LocationPayload, ReadingPayload, SensorSummaryPayload,
    StatusPayload,
};

#[derive(Clone, Debug, PartialEq)]
pub struct StatusSnapshot {
    pub system_status: SystemStatus,
    pub sensor_summary: SensorSummary,
}

impl StatusSnapshot {
    pub fn from_payloads(status: StatusPayload, sensors: SensorSummaryPayload) -> Self {
        Self {
            system_status: status.into(),
            sensor_summary: sensors.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SystemStatus {
    pub sftp_server_address: Option<String>,
    pub upload_directory: Option<String>,
    /// Backend self-assessment (`"healthy"`).
    pub health: Option<String>,
    pub files_received: FilesReceived,
    /// When the backend produced the status.
    pub observed_at: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilesReceived {
    pub total_count: Option<u64>,
    pub total_size_bytes: Option<u64>,
    /// In the order the backend listed them.
    pub files: Vec<ReceivedFile>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReceivedFile {
    pub name: Option<String>,
    pub file_type: Option<String>,
    pub size_bytes: Option<u64>,
    pub modified_at: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SensorSummary {
    pub total_sensors: Option<u64>,
    pub total_readings: Option<u64>,
    pub average_humidity_percent: Option<f64>,
    pub critical_alert_count: Option<u64>,
    pub locations: BTreeMap<String, LocationSummary>,
    /// Newest last, as served.
    pub recent_readings: Vec<SensorReading>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocationSummary {
    pub readings_count: Option<u64>,
    pub avg_humidity_percent: Option<f64>,
    pub alert_count: Option<u64>,
    pub last_reading_at: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SensorReading {
    pub timestamp: Option<String>,
    pub sensor_id: Option<String>,
    pub location: Option<String>,
    pub humidity_percent: Option<f64>,
    pub alert_level: Option<AlertLevel>,
}

impl From<StatusPayload> for SystemStatus {
    fn from(payload: StatusPayload) -> Self {
        let integration = payload.drywall_integration.unwrap_or_default();
        Self {
            sftp_server_address: integration.sftp_server,
            upload_directory: integration.upload_directory,
            health: payload.status,
            files_received: payload.files_received.unwrap_or_default().into(),
            observed_at: payload.timestamp,
        }
    }
}

impl From<FilesReceivedPayload> for FilesReceived {
    fn from(payload: FilesReceivedPayload) -> Self {
        Self {
            total_count: payload.total_count,
            total_size_bytes: payload.total_size_bytes,
            files: payload.files.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<FilePayload> for ReceivedFile {
    fn from(payload: FilePayload) -> Self {
        Self {
            name: payload.name,
            file_type: payload.file_type,
            size_bytes: payload.size,
            modified_at: payload.modified,
        }
    }
}

impl From<SensorSummaryPayload> for SensorSummary {
    fn from(payload: SensorSummaryPayload) -> Self {
        let totals = payload.summary.unwrap_or_default();
        Self {
            total_sensors: totals.total_sensors,
            total_readings: totals.total_readings,
            average_humidity_percent: totals.average_humidity,
            critical_alert_count: totals.critical_alerts,
            locations: payload
                .locations
                .into_iter()
                .map(|(name, location)| (name, location.into()))
                .collect(),
            recent_readings: payload.recent_readings.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<LocationPayload> for LocationSummary {
    fn from(payload: LocationPayload) -> Self {
        Self {
            readings_count: payload.readings_count,
            avg_humidity_percent: payload.avg_humidity,
            alert_count: payload.alert_count,
            last_reading_at: payload.last_reading,
        }
    }
}

impl From<ReadingPayload> for SensorReading {
    fn from(payload: ReadingPayload) -> Self {
        Self {
            timestamp: payload.timestamp,
            sensor_id: payload.sensor_id,
            location: payload.location,
            humidity_percent: payload.humidity_percent,
            alert_level: payload.alert_level,
        }
    }
}
