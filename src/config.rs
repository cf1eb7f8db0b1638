use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::layout::LayoutSettings;
use crate::words::ModelLimits;

/// Tunables for one cloud session. Every field has a working default; the
/// binary overrides them from command-line flags.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Live entries kept before a stale single-hit word is evicted.
    pub max_words: usize,
    /// Recent messages remembered per word.
    pub max_recent: usize,
    /// Messages between two decay passes.
    pub saturation_interval: u64,
    /// Messages drained from the queue per tick.
    pub drain_per_tick: usize,
    pub queue_capacity: usize,
    pub damping: f64,
    pub spring_length: f64,
    pub repulsion: f64,
    pub attraction: f64,
    /// Velocity ceiling per step.
    pub max_speed: f64,
    pub tick_hz: f64,
    /// Seed the coincident-bearing randomness with a constant.
    pub deterministic: bool,
    pub count_threshold: u32,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            max_words: 100,
            max_recent: 20,
            saturation_interval: 20,
            drain_per_tick: 20,
            queue_capacity: 4096,
            damping: 0.5,
            spring_length: 100.0,
            repulsion: 10_000.0,
            attraction: 0.1,
            max_speed: 5.0,
            tick_hz: 20.0,
            deterministic: false,
            count_threshold: 0,
        }
    }
}

impl CloudConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.damping) {
            bail!("damping must be within [0, 1], got {}", self.damping);
        }
        if !(self.spring_length > 0.0 && self.spring_length.is_finite()) {
            bail!("spring length must be positive, got {}", self.spring_length);
        }
        if !(self.max_speed > 0.0 && self.max_speed.is_finite()) {
            bail!("max speed must be positive, got {}", self.max_speed);
        }
        if !(self.tick_hz > 0.0 && self.tick_hz.is_finite()) {
            bail!("tick rate must be positive, got {}", self.tick_hz);
        }
        if !(self.repulsion.is_finite() && self.attraction.is_finite()) {
            bail!("force constants must be finite");
        }

        for (name, value) in [
            ("max words", self.max_words),
            ("max recent", self.max_recent),
            ("drain per tick", self.drain_per_tick),
            ("queue capacity", self.queue_capacity),
        ] {
            if value == 0 {
                bail!("{name} must be at least 1");
            }
        }
        if self.saturation_interval == 0 {
            bail!("saturation interval must be at least 1");
        }

        Ok(())
    }

    pub fn layout_settings(&self) -> LayoutSettings {
        LayoutSettings {
            repulsion: self.repulsion,
            attraction: self.attraction,
            max_speed: self.max_speed,
            deterministic: self.deterministic,
        }
    }

    pub fn model_limits(&self) -> ModelLimits {
        ModelLimits {
            max_words: self.max_words,
            max_recent: self.max_recent,
            saturation_interval: self.saturation_interval,
        }
    }
}
