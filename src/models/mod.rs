//! Plain data types shared across the engine and the relay.

mod notification;
mod observation;
mod waste;

pub use notification::{Notification, NotificationLevel};
pub use observation::FrameObservation;
pub use waste::{WasteEvent, WasteSummary, WasteSummaryRecord};
