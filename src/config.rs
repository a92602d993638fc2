use std::{collections::HashMap, fs, path::Path};

use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Engine configuration. Power ratings, tariffs and the absence threshold are
/// declared here once; components read them through accessors instead of
/// carrying their own constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Grace period (seconds) after the last human sighting before presence
    /// is considered lost.
    pub absence_threshold_secs: u64,
    /// Per-device power draw in kilowatts.
    pub power_ratings_kw: HashMap<String, f64>,
    /// Rating used for labels missing from `power_ratings_kw`.
    pub default_rating_kw: f64,
    /// Per-device tariff overrides.
    pub rate_per_kwh: HashMap<String, f64>,
    /// Tariff used for labels missing from `rate_per_kwh`.
    pub default_rate_per_kwh: f64,
    /// Device -> room identifier, carried through on summary records.
    pub locations: HashMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let mut power_ratings_kw = HashMap::new();
        power_ratings_kw.insert("laptop".to_string(), 0.05);
        power_ratings_kw.insert("lamp".to_string(), 0.01);
        power_ratings_kw.insert("tv".to_string(), 0.1);
        power_ratings_kw.insert("screen".to_string(), 0.1);

        Self {
            absence_threshold_secs: 20,
            power_ratings_kw,
            default_rating_kw: 0.05,
            rate_per_kwh: HashMap::new(),
            default_rate_per_kwh: 0.4,
            locations: HashMap::new(),
        }
    }
}

impl EngineConfig {
    /// Reads configuration from a JSON file, falling back to the built-in
    /// defaults when the file is missing or malformed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            Ok(serde_json::from_str(&contents).unwrap_or_default())
        } else {
            Ok(Self::default())
        }
    }

    pub fn absence_threshold(&self) -> Duration {
        Duration::seconds(self.absence_threshold_secs as i64)
    }

    pub fn rating_for(&self, device: &str) -> f64 {
        self.power_ratings_kw
            .get(device)
            .copied()
            .unwrap_or(self.default_rating_kw)
    }

    pub fn rate_for(&self, device: &str) -> f64 {
        self.rate_per_kwh
            .get(device)
            .copied()
            .unwrap_or(self.default_rate_per_kwh)
    }

    pub fn location_for(&self, device: &str) -> Option<String> {
        self.locations.get(device).cloned()
    }
}
