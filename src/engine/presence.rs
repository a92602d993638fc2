use chrono::{DateTime, Duration, Utc};

/// Debounces the raw, possibly-flickering per-frame person flag into a stable
/// present/absent signal.
///
/// Purely tick-driven: elapsed time is re-checked on every `observe` call and
/// no timer fires on its own, so the signal only moves when frames arrive.
#[derive(Debug)]
pub struct PresenceDebouncer {
    threshold: Duration,
    last_seen_at: Option<DateTime<Utc>>,
    present: bool,
}

impl PresenceDebouncer {
    /// Starts absent: with nobody ever seen there is no baseline to debounce
    /// from.
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            last_seen_at: None,
            present: false,
        }
    }

    /// Folds one tick into the signal and returns the debounced value.
    /// A detection flips to present immediately; absence only takes effect
    /// once more than the threshold has elapsed since the last sighting
    /// (elapsed exactly equal to the threshold still counts as present).
    pub fn observe(&mut self, now: DateTime<Utc>, person_detected: bool) -> bool {
        if person_detected {
            self.last_seen_at = Some(now);
            self.present = true;
            return true;
        }

        self.present = match self.last_seen_at {
            None => false,
            Some(last_seen) => now - last_seen <= self.threshold,
        };
        self.present
    }

    pub fn is_present(&self) -> bool {
        self.present
    }

    pub fn last_seen_at(&self) -> Option<DateTime<Utc>> {
        self.last_seen_at
    }

    /// Grace left before presence lapses, clamped at zero. Exposed for UI
    /// countdowns.
    pub fn remaining_grace(&self, now: DateTime<Utc>) -> Duration {
        match self.last_seen_at {
            None => Duration::zero(),
            Some(last_seen) => (self.threshold - (now - last_seen)).max(Duration::zero()),
        }
    }
}
