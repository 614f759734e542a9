//! Display-ready view of the poll state.
//!
//! This is where absent backend fields get their defaults, once, so that
//! front ends only format strings and numbers:
//!
//! | Field kind | Default |
//! |------------|---------|
//! | count, size, humidity | `0` |
//! | text | `"Unknown"` |
//! | timestamp | `"N/A"` |
//!
//! Humidity values also get a display [`HumiditySeverity`] from fixed cut
//! points. That classification only drives presentation; the backend's
//! own [`AlertLevel`] is shown alongside it, untouched.

use strum::Display;
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::aggregator::ErrorDetail;
use crate::api_client::Resource;
use crate::monitor::PollState;
use crate::snapshot::{AlertLevel, LocationSummary, ReceivedFile, SensorReading, StatusSnapshot};

pub const UNKNOWN: &str = "Unknown";
pub const NOT_AVAILABLE: &str = "N/A";

/// Above this, humidity displays as [`HumiditySeverity::High`].
pub const HIGH_HUMIDITY_PERCENT: f64 = 70.0;

/// Above this, humidity displays as [`HumiditySeverity::Medium`].
pub const MEDIUM_HUMIDITY_PERCENT: f64 = 50.0;

const BYTES_PER_KB: f64 = 1024.0;
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, PartialEq)]
pub enum MonitorView {
    Loading,
    Error(ErrorView),
    Dashboard(DashboardView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorView {
    pub title: &'static str,
    pub resource: Resource,
    pub message: String,
    pub retry_label: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub sftp_server: String,
    pub upload_directory: String,
    pub backend_health: String,
    pub files_count: u64,
    /// Total upload size, e.g. `"5.50 MB"`.
    pub total_size: String,
    pub last_update: String,
    pub files: Vec<FileRow>,
    pub sensors: SensorPanel,
}

impl DashboardView {
    /// Text shown in place of the file table when nothing was received.
    pub const NO_FILES_MESSAGE: &'static str = "No files received from the DryWall client yet";
    pub const NO_FILES_HINT: &'static str = "Files appear here automatically once uploaded over SFTP";
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileRow {
    pub name: String,
    pub kind: FileKind,
    /// Upper-cased file type, e.g. `"CSV"`.
    pub type_label: String,
    /// e.g. `"2.0 KB"`
    pub size: String,
    pub modified: String,
}

/// Badge style for a file type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FileKind {
    Csv,
    Json,
    Other,
}

impl FileKind {
    pub fn from_type(file_type: &str) -> Self {
        if file_type.eq_ignore_ascii_case("csv") {
            FileKind::Csv
        } else if file_type.eq_ignore_ascii_case("json") {
            FileKind::Json
        } else {
            FileKind::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SensorPanel {
    pub total_sensors: u64,
    pub total_readings: u64,
    pub average_humidity: HumidityCell,
    pub critical_alerts: u64,
    /// Sorted by location name.
    pub locations: Vec<LocationRow>,
    pub recent_readings: Vec<ReadingRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationRow {
    pub name: String,
    pub readings_count: u64,
    pub avg_humidity: HumidityCell,
    pub alert_count: u64,
    pub last_reading: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadingRow {
    pub timestamp: String,
    pub sensor_id: String,
    pub location: String,
    pub humidity: HumidityCell,
    /// Server-assigned level, or `"Unknown"`.
    pub alert_level: String,
}

/// A humidity value with its display severity.
#[derive(Debug, Clone, PartialEq)]
pub struct HumidityCell {
    pub percent: f64,
    /// e.g. `"58.4%"`
    pub text: String,
    pub severity: HumiditySeverity,
}

impl HumidityCell {
    fn new(percent: Option<f64>) -> Self {
        let percent = percent.unwrap_or(0.0);
        Self {
            percent,
            text: format!("{percent:.1}%"),
            severity: HumiditySeverity::classify(percent),
        }
    }
}

/// Presentation-only humidity classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
#[strum(serialize_all = "lowercase")]
pub enum HumiditySeverity {
    Low,
    Medium,
    High,
}

impl HumiditySeverity {
    pub fn classify(percent: f64) -> Self {
        if percent > HIGH_HUMIDITY_PERCENT {
            HumiditySeverity::High
        } else if percent > MEDIUM_HUMIDITY_PERCENT {
            HumiditySeverity::Medium
        } else {
            HumiditySeverity::Low
        }
    }
}

/// Map a poll state to what the monitor view shows.
///
/// `Idle` renders as loading: a started scheduler always begins a cycle
/// right away.
pub fn project(state: &PollState) -> MonitorView {
    match state {
        PollState::Idle | PollState::Loading => MonitorView::Loading,
        PollState::Failed(detail) => MonitorView::Error(error_view(detail)),
        PollState::Ready(snapshot) => MonitorView::Dashboard(dashboard(snapshot)),
    }
}

fn error_view(detail: &ErrorDetail) -> ErrorView {
    ErrorView {
        title: "Connection error",
        resource: detail.resource,
        message: detail.to_string(),
        retry_label: "Retry",
    }
}

pub fn dashboard(snapshot: &StatusSnapshot) -> DashboardView {
    let system = &snapshot.system_status;
    let files = &system.files_received;
    let sensors = &snapshot.sensor_summary;

    DashboardView {
        sftp_server: text_or_unknown(system.sftp_server_address.as_deref()),
        upload_directory: text_or_unknown(system.upload_directory.as_deref()),
        backend_health: text_or_unknown(system.health.as_deref()),
        files_count: files.total_count.unwrap_or(0),
        total_size: format_megabytes(files.total_size_bytes.unwrap_or(0)),
        last_update: format_timestamp(system.observed_at.as_deref()),
        files: files.files.iter().map(file_row).collect(),
        sensors: SensorPanel {
            total_sensors: sensors.total_sensors.unwrap_or(0),
            total_readings: sensors.total_readings.unwrap_or(0),
            average_humidity: HumidityCell::new(sensors.average_humidity_percent),
            critical_alerts: sensors.critical_alert_count.unwrap_or(0),
            locations: sensors
                .locations
                .iter()
                .map(|(name, location)| location_row(name, location))
                .collect(),
            recent_readings: sensors.recent_readings.iter().map(reading_row).collect(),
        },
    }
}

fn file_row(file: &ReceivedFile) -> FileRow {
    let file_type = file.file_type.as_deref().unwrap_or(UNKNOWN);
    FileRow {
        name: text_or_unknown(file.name.as_deref()),
        kind: FileKind::from_type(file_type),
        type_label: file_type.to_uppercase(),
        size: format_kilobytes(file.size_bytes.unwrap_or(0)),
        modified: format_timestamp(file.modified_at.as_deref()),
    }
}

fn location_row(name: &str, location: &LocationSummary) -> LocationRow {
    LocationRow {
        name: name.to_string(),
        readings_count: location.readings_count.unwrap_or(0),
        avg_humidity: HumidityCell::new(location.avg_humidity_percent),
        alert_count: location.alert_count.unwrap_or(0),
        last_reading: format_timestamp(location.last_reading_at.as_deref()),
    }
}

fn reading_row(reading: &SensorReading) -> ReadingRow {
    ReadingRow {
        timestamp: format_timestamp(reading.timestamp.as_deref()),
        sensor_id: text_or_unknown(reading.sensor_id.as_deref()),
        location: text_or_unknown(reading.location.as_deref()),
        humidity: HumidityCell::new(reading.humidity_percent),
        alert_level: reading
            .alert_level
            .as_ref()
            .map_or_else(|| UNKNOWN.to_string(), AlertLevel::to_string),
    }
}

fn text_or_unknown(text: Option<&str>) -> String {
    text.unwrap_or(UNKNOWN).to_string()
}

pub fn format_kilobytes(bytes: u64) -> String {
    format!("{:.1} KB", bytes as f64 / BYTES_PER_KB)
}

pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / BYTES_PER_MB)
}

/// Render a backend timestamp as `dd/mm/yyyy, HH:MM:SS`.
///
/// Accepts RFC 3339 and offset-less ISO 8601 (what the backend emits).
/// Times with an offset are shown in that offset. Anything unparseable is
/// returned as-is.
pub fn format_timestamp(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return NOT_AVAILABLE.to_string();
    };

    let display = format_description!("[day]/[month]/[year], [hour]:[minute]:[second]");

    let formatted = if let Ok(datetime) = OffsetDateTime::parse(raw, &Rfc3339) {
        datetime.format(display)
    } else if let Ok(datetime) = PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT) {
        datetime.format(display)
    } else {
        return raw.to_string();
    };

    formatted.unwrap_or_else(|_| raw.to_string())
}
