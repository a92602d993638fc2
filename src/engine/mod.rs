//! The presence & waste-tracking engine.
//!
//! One `tick` processes a single frame observation to completion: device
//! state updates, the debounced presence signal, the waste open sweep, then
//! (when presence returns) the batched close sweep. The device table,
//! presence state and tracker are owned exclusively by the engine; nothing
//! else mutates them.

mod cost;
mod devices;
mod presence;
mod runner;
mod tracker;

pub use cost::cost_record;
pub use devices::{DeviceRecord, DeviceTable};
pub use presence::PresenceDebouncer;
pub use runner::EngineController;
pub use tracker::WasteTracker;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::config::EngineConfig;
use crate::models::{FrameObservation, Notification, NotificationLevel, WasteEvent, WasteSummary};
use crate::relay::NotificationRelay;
use crate::sink::SummarySink;

/// What one tick produced, for callers that render state (UI overlays, the
/// demo console) and for tests.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub present: bool,
    /// Seconds left before presence lapses; 0 when absent or never seen.
    pub remaining_grace_secs: i64,
    pub devices_on: usize,
    pub devices_off: usize,
    /// Devices whose waste event opened on this tick.
    pub opened: Vec<String>,
    /// The finalized batch, when presence returned on this tick.
    pub summary: Option<WasteSummary>,
}

pub struct Engine {
    config: EngineConfig,
    devices: DeviceTable,
    presence: PresenceDebouncer,
    tracker: WasteTracker,
    relay: NotificationRelay,
    sink: Option<Box<dyn SummarySink>>,
}

impl Engine {
    pub fn new(config: EngineConfig, relay: NotificationRelay) -> Self {
        let presence = PresenceDebouncer::new(config.absence_threshold());
        Self {
            config,
            devices: DeviceTable::new(),
            presence,
            tracker: WasteTracker::new(),
            relay,
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: Box<dyn SummarySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Processes one frame observation. Infallible: unknown devices fall back
    /// to configured defaults and downstream failures are logged and dropped,
    /// so the state machine can neither block nor corrupt mid-tick.
    pub fn tick(&mut self, now: DateTime<Utc>, observation: &FrameObservation) -> TickOutcome {
        for (label, &is_bright) in &observation.devices {
            if self.devices.update(label, is_bright, now) {
                debug!(
                    "device {label} is now {}",
                    if is_bright { "ON" } else { "OFF" }
                );
            }
        }

        let present = self.presence.observe(now, observation.person_present);

        let mut opened = Vec::new();
        if !present {
            for record in self.devices.records() {
                if !record.is_on {
                    continue;
                }
                if let Some(notification) = self.tracker.open(&record.label, now) {
                    warn!(
                        "{} left ON while absent; tracking waste duration",
                        record.label
                    );
                    opened.push(record.label.clone());
                    self.relay.publish(notification);
                }
            }
        }

        let mut summary = None;
        if present {
            if let Some(batch) = self.tracker.close_all(&self.config, now) {
                info!(
                    "presence restored; finalized {} waste event(s)",
                    batch.devices.len()
                );

                self.relay.publish(Notification::new(
                    format!("Human returned — {} waste event(s) logged.", batch.devices.len()),
                    None,
                    NotificationLevel::Info,
                    now,
                ));

                if let Some(sink) = &self.sink {
                    if let Err(err) = sink.store(&batch) {
                        warn!("waste summary hand-off failed, dropping batch: {err:#}");
                    }
                }

                summary = Some(batch);
            }
        }

        let devices_on = self.devices.records().iter().filter(|r| r.is_on).count();
        let devices_off = self.devices.len() - devices_on;

        TickOutcome {
            present,
            remaining_grace_secs: self.presence.remaining_grace(now).num_seconds(),
            devices_on,
            devices_off,
            opened,
            summary,
        }
    }

    pub fn devices(&self) -> &DeviceTable {
        &self.devices
    }

    pub fn is_present(&self) -> bool {
        self.presence.is_present()
    }

    pub fn active_events(&self) -> &[WasteEvent] {
        self.tracker.active_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn engine() -> (Engine, NotificationRelay) {
        let relay = NotificationRelay::new();
        (Engine::new(EngineConfig::default(), relay.clone()), relay)
    }

    fn warnings(relay: &NotificationRelay) -> usize {
        relay
            .recent(usize::MAX)
            .iter()
            .filter(|n| n.level == NotificationLevel::Warning)
            .count()
    }

    /// Scenario A: a lamp stays on while the person leaves; exactly one
    /// warning fires at the tick where the grace period first lapses, and no
    /// summary appears until someone comes back.
    #[test]
    fn single_warning_once_grace_lapses_and_no_premature_summary() {
        let (mut engine, relay) = engine();
        let t0 = Utc::now();

        engine.tick(t0, &FrameObservation::new(true).with_device("lamp", true));

        // 25 empty-room ticks spanning 21 seconds (875ms cadence).
        let mut lapse_tick = None;
        for i in 1..=25 {
            let now = t0 + Duration::milliseconds(875 * i);
            let outcome = engine.tick(now, &FrameObservation::new(false).with_device("lamp", true));
            assert!(outcome.summary.is_none());
            if !outcome.opened.is_empty() {
                lapse_tick = Some(i);
            }
        }

        // 875ms * 23 = 20.125s is the first tick past the 20s threshold.
        assert_eq!(lapse_tick, Some(23));
        assert_eq!(warnings(&relay), 1);
        assert_eq!(engine.active_events().len(), 1);
    }

    /// Scenario B: the person returns; one summary with one lamp record, and
    /// the active-events map is empty afterwards.
    #[test]
    fn presence_return_flushes_one_summary_and_empties_active_events() {
        let (mut engine, relay) = engine();
        let t0 = Utc::now();

        engine.tick(t0, &FrameObservation::new(true).with_device("lamp", true));
        let absent_start = t0 + Duration::seconds(21);
        engine.tick(absent_start, &FrameObservation::new(false).with_device("lamp", true));
        assert_eq!(engine.active_events().len(), 1);

        let returned_at = absent_start + Duration::seconds(100);
        let outcome = engine.tick(returned_at, &FrameObservation::new(true).with_device("lamp", true));

        let summary = outcome.summary.expect("summary should flush");
        assert_eq!(summary.devices.len(), 1);
        assert_eq!(summary.devices[0].device, "lamp");
        // durationHours ≈ elapsed / 3600, within the 4-decimal rounding.
        let expected_hours = 100.0 / 3600.0;
        assert!((summary.devices[0].duration_hours - expected_hours).abs() < 0.0001);
        assert!(engine.active_events().is_empty());

        // Exactly one info summary notification alongside the warning.
        let info_count = relay
            .recent(usize::MAX)
            .iter()
            .filter(|n| n.level == NotificationLevel::Info)
            .count();
        assert_eq!(info_count, 1);
    }

    /// Scenario C: two devices left on during one absence window close
    /// together into a single two-record batch, each independently costed.
    #[test]
    fn two_devices_close_in_one_batch() {
        let (mut engine, _relay) = engine();
        let t0 = Utc::now();

        engine.tick(
            t0,
            &FrameObservation::new(true)
                .with_device("lamp", true)
                .with_device("screen", true),
        );
        engine.tick(
            t0 + Duration::seconds(25),
            &FrameObservation::new(false)
                .with_device("lamp", true)
                .with_device("screen", true),
        );
        assert_eq!(engine.active_events().len(), 2);

        let outcome = engine.tick(
            t0 + Duration::seconds(60),
            &FrameObservation::new(true)
                .with_device("lamp", true)
                .with_device("screen", true),
        );

        let summary = outcome.summary.unwrap();
        assert_eq!(summary.devices.len(), 2);
        let mut devices: Vec<&str> = summary.devices.iter().map(|r| r.device.as_str()).collect();
        devices.sort_unstable();
        assert_eq!(devices, vec!["lamp", "screen"]);
        for record in &summary.devices {
            assert!(record.cost.is_finite());
            assert!(record.kwh > 0.0);
        }
    }

    /// A device turning off mid-absence does not close its event; only the
    /// person returning does.
    #[test]
    fn device_off_while_absent_keeps_the_event_open() {
        let (mut engine, _relay) = engine();
        let t0 = Utc::now();

        engine.tick(t0, &FrameObservation::new(true).with_device("lamp", true));
        engine.tick(
            t0 + Duration::seconds(25),
            &FrameObservation::new(false).with_device("lamp", true),
        );
        assert_eq!(engine.active_events().len(), 1);

        let outcome = engine.tick(
            t0 + Duration::seconds(30),
            &FrameObservation::new(false).with_device("lamp", false),
        );
        assert!(outcome.summary.is_none());
        assert_eq!(engine.active_events().len(), 1);
        assert!(!engine.devices().get("lamp").unwrap().is_on);
    }

    /// Feeding the same observation twice never touches last_changed_at.
    #[test]
    fn identical_consecutive_observations_are_idempotent() {
        let (mut engine, _relay) = engine();
        let t0 = Utc::now();
        let frame = FrameObservation::new(true).with_device("tv", true);

        engine.tick(t0, &frame);
        let stamp = engine.devices().get("tv").unwrap().last_changed_at;

        engine.tick(t0 + Duration::seconds(1), &frame);
        assert_eq!(engine.devices().get("tv").unwrap().last_changed_at, stamp);
    }

    /// An absent tick before anyone was ever seen opens events right away
    /// (never-seen means immediately absent).
    #[test]
    fn never_seen_opens_waste_immediately() {
        let (mut engine, relay) = engine();
        let outcome = engine.tick(Utc::now(), &FrameObservation::new(false).with_device("tv", true));

        assert!(!outcome.present);
        assert_eq!(outcome.opened, vec!["tv".to_string()]);
        assert_eq!(warnings(&relay), 1);
    }

    #[test]
    fn tick_reports_on_off_counts() {
        let (mut engine, _relay) = engine();
        let outcome = engine.tick(
            Utc::now(),
            &FrameObservation::new(true)
                .with_device("lamp", true)
                .with_device("tv", false),
        );

        assert_eq!(outcome.devices_on, 1);
        assert_eq!(outcome.devices_off, 1);
        assert_eq!(outcome.remaining_grace_secs, 20);
    }
}
