//! Effect trait definition
//!
//! Base trait for every block processor in the crate.

use crate::error::{RtapError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sample rate effects assume until `prepare` is called
pub const DEFAULT_SAMPLE_RATE: f32 = 44100.0;

/// Parameters common to all effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectParams {
    /// Unique identifier for this effect instance
    pub id: String,
    /// Whether the effect is enabled
    pub enabled: bool,
}

impl Default for EffectParams {
    fn default() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            enabled: true,
        }
    }
}

/// Base trait for all DSP effects
///
/// Effects are mono block processors. Processing runs strictly left to
/// right, so a sample is always read before the same index is written.
/// Processing never fails: when input and output differ in length only the
/// common prefix is touched.
pub trait Effect: Send {
    /// Process a block in place
    ///
    /// A disabled effect leaves the buffer untouched.
    fn process_in_place(&mut self, buffer: &mut [f32]);

    /// Process `input` into `output`
    fn process(&mut self, input: &[f32], output: &mut [f32]) {
        let n = input.len().min(output.len());
        output[..n].copy_from_slice(&input[..n]);
        self.process_in_place(&mut output[..n]);
    }

    /// Prepare the effect for a new sample rate
    fn prepare(&mut self, sample_rate: f32);

    /// Reset effect state
    ///
    /// Clears filter history; parameters are kept.
    fn reset(&mut self);

    /// Get the effect type identifier
    fn effect_type(&self) -> &'static str;

    /// Get human-readable display name
    fn display_name(&self) -> &str;

    /// Get the unique instance ID
    fn id(&self) -> &str;

    /// Set the unique instance ID
    fn set_id(&mut self, id: String);

    /// Check if effect is enabled
    fn is_enabled(&self) -> bool;

    /// Enable or disable the effect
    fn set_enabled(&mut self, enabled: bool);

    /// Serialize effect state to JSON
    fn to_json(&self) -> Result<Value>;

    /// Restore effect state from JSON
    fn from_json(&mut self, json: &Value) -> Result<()>;

    /// Get all parameters as JSON
    fn get_params(&self) -> Value;

    /// Set a single parameter by name
    fn set_param(&mut self, name: &str, value: &Value) -> Result<()>;
}

/// Read a JSON number as `f32`
pub(crate) fn expect_f32(param: &str, value: &Value) -> Result<f32> {
    value
        .as_f64()
        .map(|v| v as f32)
        .ok_or_else(|| RtapError::invalid_param(param, "number", value))
}

/// Read a JSON bool, accepting 0/1 the way host toggles send them
pub(crate) fn expect_bool(param: &str, value: &Value) -> Result<bool> {
    value
        .as_bool()
        .or_else(|| value.as_f64().map(|v| v != 0.0))
        .ok_or_else(|| RtapError::invalid_param(param, "bool", value))
}

/// Restore the `params` object written by `to_json`
pub(crate) fn restore_common(params: &mut EffectParams, json: &Value) {
    if let Some(enabled) = json
        .get("params")
        .and_then(|p| p.get("enabled"))
        .and_then(|v| v.as_bool())
    {
        params.enabled = enabled;
    }
    if let Some(id) = json
        .get("params")
        .and_then(|p| p.get("id"))
        .and_then(|v| v.as_str())
    {
        params.id = id.to_string();
    }
}

/// Helper macro to implement common Effect trait methods
#[macro_export]
macro_rules! impl_effect_common {
    ($effect_type:expr, $display_name:expr) => {
        fn effect_type(&self) -> &'static str {
            $effect_type
        }

        fn display_name(&self) -> &str {
            $display_name
        }

        fn id(&self) -> &str {
            &self.params.id
        }

        fn set_id(&mut self, id: String) {
            self.params.id = id;
        }

        fn is_enabled(&self) -> bool {
            self.params.enabled
        }

        fn set_enabled(&mut self, enabled: bool) {
            self.params.enabled = enabled;
        }
    };
}
