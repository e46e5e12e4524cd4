//! Frozen simulator state.
//!
//! A [`SimulatorSnapshot`] holds what an exporter needs to resume the
//! animation elsewhere: the full settings, the clock, the animated hue
//! accumulator, and the PRNG seed plus regeneration count that together
//! rebuild the same blob set.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::settings::Settings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatorSnapshot {
    pub settings: Settings,
    pub time: f64,
    pub animated_hue: f64,
    pub seed: u64,
    /// How many times the pool was regenerated after creation.
    #[serde(default)]
    pub generation: u64,
}

impl SimulatorSnapshot {
    /// Checks that the clock and hue accumulator are usable numbers.
    pub fn validate(&self) -> Result<(), EngineError> {
        for (name, v) in [("time", self.time), ("animatedHue", self.animated_hue)] {
            if !v.is_finite() {
                return Err(EngineError::InvalidValue {
                    name: name.to_owned(),
                    value: v.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Parses and validates a JSON snapshot.
    pub fn from_json(text: &str) -> Result<Self, EngineError> {
        let snapshot: Self = serde_json::from_str(text).map_err(|e| EngineError::InvalidValue {
            name: "snapshot".to_owned(),
            value: e.to_string(),
        })?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}
