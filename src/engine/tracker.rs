use chrono::{DateTime, Utc};

use crate::config::EngineConfig;
use crate::models::{Notification, NotificationLevel, WasteEvent, WasteSummary};

use super::cost::cost_record;

/// Per-device waste state machine.
///
/// A device is either idle or has exactly one open `WasteEvent`; presence
/// gates transitions across all devices at once. A device turning off while
/// nobody is around does NOT close its event; only presence returning does.
/// That matches the observed behavior of the deployed system and is flagged
/// as a known design gap in DESIGN.md.
#[derive(Debug, Default)]
pub struct WasteTracker {
    /// Open events in the order they were opened (first-opened first-closed).
    active: Vec<WasteEvent>,
}

impl WasteTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_events(&self) -> &[WasteEvent] {
        &self.active
    }

    pub fn has_active(&self, device: &str) -> bool {
        self.active.iter().any(|event| event.device == device)
    }

    /// Opens a waste event for `device` unless one is already open. Returns
    /// the warning notification to publish immediately when a new event
    /// opened.
    pub fn open(&mut self, device: &str, now: DateTime<Utc>) -> Option<Notification> {
        if self.has_active(device) {
            return None;
        }

        self.active.push(WasteEvent {
            device: device.to_string(),
            started_at: now,
            ended_at: None,
        });

        Some(Notification::new(
            format!("{device} left ON — tracking waste duration."),
            Some(device.to_string()),
            NotificationLevel::Warning,
            now,
        ))
    }

    /// Closes every open event in one sweep and flushes the session buffer as
    /// a single summary. Returns `None` when nothing was open.
    pub fn close_all(&mut self, config: &EngineConfig, now: DateTime<Utc>) -> Option<WasteSummary> {
        if self.active.is_empty() {
            return None;
        }

        let mut records = Vec::with_capacity(self.active.len());
        for mut event in self.active.drain(..) {
            event.ended_at = Some(now);
            let duration_seconds = (now - event.started_at).num_milliseconds() as f64 / 1000.0;
            records.push(cost_record(config, &event.device, duration_seconds));
        }

        Some(WasteSummary::new(now, records))
    }
}
