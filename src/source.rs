use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::models::FrameObservation;

/// One camera + classifier pipeline, reduced to its output. Implementations
/// may block waiting for the next frame; the engine loop runs on a blocking
/// worker for that reason.
///
/// `Ok(Some)` is a classified frame, `Err` is a transient read failure (the
/// engine skips the tick and keeps all state), `Ok(None)` is end-of-stream
/// and terminates the tick loop cleanly.
pub trait FrameSource {
    fn next_observation(&mut self) -> Result<Option<FrameObservation>>;
}

/// Replays a fixed script of observations, then reports end-of-stream.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    frames: VecDeque<FrameObservation>,
}

impl ScriptedSource {
    pub fn new(frames: Vec<FrameObservation>) -> Self {
        Self {
            frames: frames.into(),
        }
    }
}

impl FrameSource for ScriptedSource {
    fn next_observation(&mut self) -> Result<Option<FrameObservation>> {
        Ok(self.frames.pop_front())
    }
}

/// Synthetic frame source for the demo binary: devices flicker mostly-on and
/// a person wanders in and out of frame.
pub struct SimulatedCamera {
    rng: StdRng,
    devices: Vec<String>,
    person_present: bool,
    frame_interval: Duration,
}

impl SimulatedCamera {
    pub fn new(devices: Vec<String>, frame_interval: Duration) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            devices,
            person_present: true,
            frame_interval,
        }
    }
}

impl FrameSource for SimulatedCamera {
    fn next_observation(&mut self) -> Result<Option<FrameObservation>> {
        std::thread::sleep(self.frame_interval);

        // Small chance each frame that the person enters or leaves.
        if self.rng.gen_bool(0.05) {
            self.person_present = !self.person_present;
        }

        let mut devices = HashMap::new();
        for label in &self.devices {
            devices.insert(label.clone(), self.rng.gen_bool(0.8));
        }

        Ok(Some(FrameObservation {
            devices,
            person_present: self.person_present,
        }))
    }
}
