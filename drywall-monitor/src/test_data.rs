//! Backend fixtures and an in-process HTTP server for tests.

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use crate::api_client::types::{SensorSummaryPayload, StatusPayload};
use crate::snapshot::StatusSnapshot;

pub const TOTAL_FILES: u64 = 3;
pub const TOTAL_SENSORS: u64 = 5;

pub fn status_json() -> Value {
    json!({
        "timestamp": "2025-01-15T10:30:00",
        "status": "healthy",
        "drywall_integration": {
            "sftp_server": "running",
            "upload_directory": "/srv/sftp/uploads"
        },
        "files_received": {
            "total_count": TOTAL_FILES,
            "total_size_bytes": 5_767_168,
            "files": [
                {
                    "name": "humidity_20250115.csv",
                    "type": "csv",
                    "size": 2048,
                    "modified": "2025-01-15T10:12:45"
                },
                {
                    "name": "summary_20250115.json",
                    "type": "json",
                    "size": 5_763_072,
                    "modified": "2025-01-15T10:13:02"
                },
                {
                    "name": "notes",
                    "type": "unknown",
                    "size": 2048,
                    "modified": "2025-01-14T18:00:00"
                }
            ]
        }
    })
}

pub fn sensor_summary_json() -> Value {
    json!({
        "summary": {
            "total_sensors": TOTAL_SENSORS,
            "total_readings": 120,
            "average_humidity": 58.4,
            "critical_alerts": 2
        },
        "locations": {
            "Basement": {
                "readings_count": 48,
                "avg_humidity": 72.5,
                "alert_count": 2,
                "last_reading": "2025-01-15T10:29:00"
            },
            "Kitchen": {
                "readings_count": 72,
                "avg_humidity": 51.0,
                "alert_count": 0,
                "last_reading": "2025-01-15T10:28:30"
            }
        },
        "recent_readings": [
            {
                "timestamp": "2025-01-15T10:29:00",
                "sensor_id": "DW_SENSOR_001",
                "location": "Basement",
                "humidity_percent": 78.2,
                "alert_level": "HIGH"
            },
            {
                "timestamp": "2025-01-15T10:28:30",
                "sensor_id": "DW_SENSOR_004",
                "location": "Kitchen",
                "humidity_percent": 45.0,
                "alert_level": "MEDIUM"
            }
        ]
    })
}

pub fn health_json() -> Value {
    json!({
        "status": "healthy",
        "timestamp": "2025-01-15T10:30:00",
        "services": {
            "api": "running",
            "sftp": "running",
            "react_frontend": "http://localhost:3000"
        }
    })
}

pub fn sample_snapshot() -> StatusSnapshot {
    let status: StatusPayload = serde_json::from_value(status_json()).unwrap();
    let sensors: SensorSummaryPayload = serde_json::from_value(sensor_summary_json()).unwrap();
    StatusSnapshot::from_payloads(status, sensors)
}

/// Router serving both refresh resources with the fixtures above.
pub fn backend() -> Router {
    Router::new()
        .route("/api/drywall/status", get(|| async { Json(status_json()) }))
        .route(
            "/api/drywall/sensor-summary",
            get(|| async { Json(sensor_summary_json()) }),
        )
}

/// Serve `router` on an ephemeral localhost port and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Base URL of a port nothing listens on.
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
