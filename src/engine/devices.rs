use chrono::{DateTime, Utc};

/// Last known power state for one monitored device label.
#[derive(Debug, Clone)]
pub struct DeviceRecord {
    pub label: String,
    pub is_on: bool,
    /// Moves only when `is_on` actually flips, not on every tick.
    pub last_changed_at: DateTime<Utc>,
}

/// In-memory device state table, mutated only by the engine's tick.
///
/// Backed by a Vec so sweeps over the table run in insertion order; lookups
/// are linear, which is fine for the handful of labels a camera ever sees.
/// Records persist for the life of the engine.
#[derive(Debug, Default)]
pub struct DeviceTable {
    records: Vec<DeviceRecord>,
}

impl DeviceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one observation. Returns true when the stored on/off state
    /// flipped. A previously-unseen label is inserted as off and the observed
    /// value applied on top, so first sight of an on device counts as a
    /// change. Cannot fail.
    pub fn update(&mut self, label: &str, is_on_now: bool, now: DateTime<Utc>) -> bool {
        match self.records.iter_mut().find(|r| r.label == label) {
            Some(record) => {
                if record.is_on == is_on_now {
                    return false;
                }
                record.is_on = is_on_now;
                record.last_changed_at = now;
                true
            }
            None => {
                self.records.push(DeviceRecord {
                    label: label.to_string(),
                    is_on: is_on_now,
                    last_changed_at: now,
                });
                is_on_now
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<&DeviceRecord> {
        self.records.iter().find(|r| r.label == label)
    }

    pub fn records(&self) -> &[DeviceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
