use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One classified camera frame: each monitored device label the classifier
/// recognized with its brightness verdict, plus whether a person was in frame.
///
/// The classifier itself is an external collaborator; the engine only ever
/// sees this reduced form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameObservation {
    /// Device label -> "looks powered on" from the brightness heuristic.
    pub devices: HashMap<String, bool>,
    pub person_present: bool,
}

impl FrameObservation {
    pub fn new(person_present: bool) -> Self {
        Self {
            devices: HashMap::new(),
            person_present,
        }
    }

    pub fn with_device(mut self, label: &str, is_bright: bool) -> Self {
        self.devices.insert(label.to_string(), is_bright);
        self
    }
}
