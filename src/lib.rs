pub mod config;
pub mod engine;
pub mod models;
pub mod relay;
pub mod sink;
pub mod source;

pub use config::EngineConfig;
pub use engine::{Engine, EngineController, TickOutcome};
pub use models::{
    FrameObservation, Notification, NotificationLevel, WasteEvent, WasteSummary,
    WasteSummaryRecord,
};
pub use relay::{NotificationRelay, Replicator, Subscription};
pub use sink::{JsonFileSink, SummarySink};
pub use source::{FrameSource, ScriptedSource, SimulatedCamera};
