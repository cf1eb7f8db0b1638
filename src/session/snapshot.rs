use std::time::Duration;

use serde::Serialize;

use crate::geometry::{Bounds, Vector2};

/// One surfaced word as the renderer should draw it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WordSprite {
    pub key: String,
    pub display_text: String,
    pub count: u32,
    /// Logical coordinates; multiply by `RenderSnapshot::fit_scale`.
    pub position: Vector2,
    /// Suggested font size in points.
    pub size_hint: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    pub entries: usize,
    pub backlog: usize,
    pub dropped_messages: u64,
    pub skipped_ticks: u64,
    pub messages_seen: u64,
    pub displacement: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub frame: u64,
    /// Ascending by count, so later sprites draw on top.
    pub words: Vec<WordSprite>,
    pub root: Vector2,
    pub bounds: Option<Bounds>,
    /// A tick was skipped since the previous snapshot.
    pub overrun: bool,
    pub count_threshold: u32,
    pub diagnostics: Diagnostics,
}

impl RenderSnapshot {
    pub fn fit_scale(&self, viewport_width: f64, viewport_height: f64) -> f64 {
        self.bounds
            .map_or(1.0, |bounds| bounds.fit_scale(viewport_width, viewport_height))
    }

    pub fn word(&self, key: &str) -> Option<&WordSprite> {
        self.words.iter().find(|sprite| sprite.key == key)
    }
}

/// Hover details for one word.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WordDetail {
    pub key: String,
    pub display_text: String,
    pub count: u32,
    pub since_update: Duration,
    pub recent_messages: Vec<String>,
}

fn normalize_log(value: u32, min: u32, max: u32) -> f32 {
    let min = f64::from(min.max(1));
    let max = f64::from(max).max(min);
    let value = f64::from(value.max(1));

    let denominator = max.ln() - min.ln();
    if denominator.abs() < f64::EPSILON {
        return 0.5;
    }

    ((value.ln() - min.ln()) / denominator).clamp(0.0, 1.0) as f32
}

pub(crate) fn size_hint(count: u32, min: u32, max: u32) -> f32 {
    12.0 + (normalize_log(count, min, max) * 28.0)
}
