//! Output level stage
//!
//! Linear gain applied after the distortion, so loud shapers can be trimmed
//! back before the signal leaves the chain.

use log::debug;
use serde_json::{json, Value};

use crate::dsp::effect::{expect_bool, expect_f32, restore_common, Effect, EffectParams};
use crate::error::{RtapError, Result};
use crate::impl_effect_common;

// ============================================================================
// Constants
// ============================================================================

/// Default linear level
pub const DEFAULT_LEVEL: f32 = 0.5;

const MIN_LEVEL: f32 = 0.0;

/// Maximum linear level (+24 dB)
const MAX_LEVEL: f32 = 16.0;

/// Convert decibels to linear amplitude
#[inline]
fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

// ============================================================================
// Level Effect
// ============================================================================

/// Linear output level
///
/// # Parameters
/// - `level`: linear multiplier (0 to 16)
#[derive(Debug, Clone)]
pub struct Level {
    params: EffectParams,
    level: f32,
}

impl Level {
    /// Create a level stage; the value is clamped to 0..=16
    pub fn new(level: f32) -> Self {
        let mut stage = Self {
            params: EffectParams::default(),
            level: DEFAULT_LEVEL,
        };
        stage.set_level(level);
        stage
    }

    /// Set the linear level; NaN is ignored
    pub fn set_level(&mut self, level: f32) {
        if level.is_nan() {
            return;
        }
        self.level = level.clamp(MIN_LEVEL, MAX_LEVEL);
    }

    /// Set the level in decibels
    pub fn set_level_db(&mut self, db: f32) {
        self.set_level(db_to_linear(db));
    }

    pub fn level(&self) -> f32 {
        self.level
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL)
    }
}

impl Effect for Level {
    impl_effect_common!("level", "Level");

    fn process_in_place(&mut self, buffer: &mut [f32]) {
        if !self.params.enabled {
            return;
        }

        // Unity gain optimization
        if (self.level - 1.0).abs() < f32::EPSILON {
            return;
        }

        for sample in buffer.iter_mut() {
            *sample *= self.level;
        }
    }

    fn prepare(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {
        // Stateless
    }

    fn to_json(&self) -> Result<Value> {
        Ok(json!({
            "type": self.effect_type(),
            "params": serde_json::to_value(&self.params)?,
            "level": self.level,
        }))
    }

    fn from_json(&mut self, json: &Value) -> Result<()> {
        restore_common(&mut self.params, json);
        if let Some(level) = json.get("level").and_then(|v| v.as_f64()) {
            self.set_level(level as f32);
        }
        Ok(())
    }

    fn get_params(&self) -> Value {
        json!({
            "level": self.level,
            "enabled": self.params.enabled
        })
    }

    fn set_param(&mut self, name: &str, value: &Value) -> Result<()> {
        match name {
            "level" => {
                let v = expect_f32(name, value)?;
                self.set_level(v);
                if self.level != v {
                    debug!("level: {} clamped to {}", v, self.level);
                }
            }
            "level_db" => self.set_level_db(expect_f32(name, value)?),
            "enabled" => self.params.enabled = expect_bool(name, value)?,
            _ => {
                return Err(RtapError::UnknownParameter {
                    effect_type: self.effect_type().to_string(),
                    name: name.to_string(),
                })
            }
        }
        Ok(())
    }
}
