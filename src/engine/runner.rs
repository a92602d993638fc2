use anyhow::{bail, Context, Result};
use chrono::Utc;
use log::{info, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::source::FrameSource;

use super::Engine;

/// Owns the engine's tick loop.
///
/// One observation is processed to completion before the next read; the loop
/// runs on a blocking worker because frame sources may stall waiting on the
/// camera. The loop runs until the source reports end-of-stream or `stop` is
/// called.
pub struct EngineController {
    handle: Option<JoinHandle<Engine>>,
    cancel_token: Option<CancellationToken>,
}

impl Default for EngineController {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    pub fn start(&mut self, engine: Engine, source: Box<dyn FrameSource + Send>) -> Result<()> {
        if self.handle.is_some() {
            bail!("engine loop already active");
        }

        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();

        let handle = tokio::task::spawn_blocking(move || engine_loop(engine, source, token_clone));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Cancels the loop and waits for it to drain, handing the engine back so
    /// callers can inspect final state.
    pub async fn stop(&mut self) -> Result<Option<Engine>> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            let engine = handle
                .await
                .context("engine loop task failed to join")?;
            Ok(Some(engine))
        } else {
            Ok(None)
        }
    }
}

fn engine_loop(
    mut engine: Engine,
    mut source: Box<dyn FrameSource + Send>,
    cancel_token: CancellationToken,
) -> Engine {
    info!("engine tick loop started");

    while !cancel_token.is_cancelled() {
        match source.next_observation() {
            Ok(Some(observation)) => {
                engine.tick(Utc::now(), &observation);
            }
            Ok(None) => {
                info!("frame source exhausted; engine loop stopping");
                break;
            }
            Err(err) => {
                // Transient camera failure: skip the tick, keep all state.
                warn!("frame read failed, skipping tick: {err:#}");
            }
        }
    }

    info!("engine tick loop shut down");
    engine
}
