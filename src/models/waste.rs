use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An interval during which a device was powered on while nobody was around.
/// Open while `ended_at` is `None`; closed in a batch when presence returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteEvent {
    pub device: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

/// One finalized, costed waste event. Immutable once produced; the numeric
/// fields are rounded for display stability at this boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteSummaryRecord {
    pub device: String,
    /// Room identifier from the device catalog, when configured.
    pub location: Option<String>,
    pub duration_hours: f64,
    pub kwh: f64,
    pub cost: f64,
}

/// The batch of records that closed together when presence returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteSummary {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub devices: Vec<WasteSummaryRecord>,
}

impl WasteSummary {
    pub fn new(timestamp: DateTime<Utc>, devices: Vec<WasteSummaryRecord>) -> Self {
        Self {
            event_id: format!("evt_{}", timestamp.timestamp()),
            timestamp,
            devices,
        }
    }
}
