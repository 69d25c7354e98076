//! Effect Chain management
//!
//! Effects are processed in chain order (index 0 first).
//! Recommended order:
//! 1. Crossover (band-limit the input)
//! 2. Distortion (one or more instances)
//! 3. Level (always last)

use log::debug;

use super::effect::{Effect, DEFAULT_SAMPLE_RATE};
use crate::error::{RtapError, Result};

/// Order priority constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EffectPosition {
    Crossover = 0,
    Distortion = 1,
    Level = 2,
}

impl EffectPosition {
    /// Get recommended position for an effect type
    pub fn for_effect_type(effect_type: &str) -> Self {
        match effect_type {
            "crossover" => EffectPosition::Crossover,
            "level" => EffectPosition::Level,
            _ => EffectPosition::Distortion,
        }
    }
}

/// Chain of mono effects processed in place
pub struct EffectChain {
    effects: Vec<Box<dyn Effect>>,
    sample_rate: f32,
}

impl EffectChain {
    /// Create a new empty effect chain
    pub fn new() -> Self {
        Self {
            effects: Vec::new(),
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Prepare all effects for processing
    pub fn prepare(&mut self, sample_rate: f32) {
        debug!("chain: prepare {} effects at {} Hz", self.effects.len(), sample_rate);
        self.sample_rate = sample_rate;
        for effect in &mut self.effects {
            effect.prepare(sample_rate);
        }
    }

    /// Reset all effects
    pub fn reset(&mut self) {
        for effect in &mut self.effects {
            effect.reset();
        }
    }

    /// Add an effect at the recommended position
    ///
    /// Effects of the same kind keep their insertion order.
    pub fn add(&mut self, mut effect: Box<dyn Effect>) {
        effect.prepare(self.sample_rate);
        let position = self.get_recommended_position(effect.effect_type());
        self.effects.insert(position, effect);
    }

    /// Add an effect at a specific index
    pub fn add_at(&mut self, mut effect: Box<dyn Effect>, index: usize) {
        effect.prepare(self.sample_rate);
        let index = index.min(self.effects.len());
        self.effects.insert(index, effect);
    }

    /// Remove an effect by ID
    pub fn remove(&mut self, effect_id: &str) -> Result<Box<dyn Effect>> {
        let index = self
            .effects
            .iter()
            .position(|e| e.id() == effect_id)
            .ok_or_else(|| RtapError::EffectNotFound {
                effect_id: effect_id.to_string(),
            })?;

        Ok(self.effects.remove(index))
    }

    /// Get a reference to an effect by ID
    pub fn get(&self, effect_id: &str) -> Option<&dyn Effect> {
        self.effects
            .iter()
            .find(|e| e.id() == effect_id)
            .map(|e| e.as_ref())
    }

    /// Get a mutable reference to an effect by ID
    pub fn get_mut(&mut self, effect_id: &str) -> Option<&mut (dyn Effect + 'static)> {
        for effect in &mut self.effects {
            if effect.id() == effect_id {
                return Some(effect.as_mut());
            }
        }
        None
    }

    /// Set a parameter on the effect with the given ID
    pub fn set_param(
        &mut self,
        effect_id: &str,
        name: &str,
        value: &serde_json::Value,
    ) -> Result<()> {
        self.get_mut(effect_id)
            .ok_or_else(|| RtapError::EffectNotFound {
                effect_id: effect_id.to_string(),
            })?
            .set_param(name, value)
    }

    /// Process a block in place through every effect in order
    pub fn process_in_place(&mut self, buffer: &mut [f32]) {
        for effect in &mut self.effects {
            effect.process_in_place(buffer);
        }
    }

    /// Process `input` into `output` through the whole chain
    ///
    /// Only the common prefix of the two buffers is written.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) {
        let n = input.len().min(output.len());
        output[..n].copy_from_slice(&input[..n]);
        self.process_in_place(&mut output[..n]);
    }

    /// Get the number of effects in the chain
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Check if the chain is empty
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Iterate over effects
    pub fn iter(&self) -> impl Iterator<Item = &dyn Effect> {
        self.effects.iter().map(|e| e.as_ref())
    }

    /// Get recommended position for inserting an effect type
    fn get_recommended_position(&self, effect_type: &str) -> usize {
        let priority = EffectPosition::for_effect_type(effect_type);

        self.effects
            .iter()
            .position(|e| EffectPosition::for_effect_type(e.effect_type()) > priority)
            .unwrap_or(self.effects.len())
    }

    /// Serialize chain state to JSON
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let effects: Result<Vec<serde_json::Value>> =
            self.effects.iter().map(|e| e.to_json()).collect();

        Ok(serde_json::json!({
            "effects": effects?,
            "sample_rate": self.sample_rate,
        }))
    }
}

impl Default for EffectChain {
    fn default() -> Self {
        Self::new()
    }
}
