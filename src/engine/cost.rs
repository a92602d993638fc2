use crate::config::EngineConfig;
use crate::models::WasteSummaryRecord;

/// Rounding happens only at this emission boundary; everything upstream keeps
/// full precision.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Converts a closed waste interval into a costed summary record.
///
/// Unknown labels fall back to the configured default rating and tariff so
/// the finalize sweep never fails mid-batch.
pub fn cost_record(config: &EngineConfig, device: &str, duration_seconds: f64) -> WasteSummaryRecord {
    let duration_hours = duration_seconds / 3600.0;
    let kwh = config.rating_for(device) * duration_hours;
    let cost = kwh * config.rate_for(device);

    WasteSummaryRecord {
        device: device.to_string(),
        location: config.location_for(device),
        duration_hours: round_to(duration_hours, 4),
        kwh: round_to(kwh, 5),
        cost: round_to(cost, 4),
    }
}
