use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::models::WasteSummary;

/// Hand-off seam for finalized waste summaries. The engine calls this once
/// per session flush; a failing sink costs that batch its persistence, never
/// the engine its state. Retries belong to the implementation.
pub trait SummarySink: Send + Sync {
    fn store(&self, summary: &WasteSummary) -> Result<()>;
}

/// Writes each session summary as pretty-printed JSON, replacing the previous
/// file.
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SummarySink for JsonFileSink {
    fn store(&self, summary: &WasteSummary) -> Result<()> {
        let serialized = serde_json::to_string_pretty(summary)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write waste summary to {}", self.path.display()))
    }
}
