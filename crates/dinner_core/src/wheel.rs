//! Wheel geometry and spin easing. Pure math, no timing source.

use serde::Serialize;

use crate::{Recipe, RecipeId};

pub const FULL_TURN_DEG: f64 = 360.0;

/// Segment fill colours, cycled when there are more segments than entries.
pub const SEGMENT_COLORS: [&str; 10] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#FFA07A", "#98D8C8", "#F7DC6F", "#BB8FCE", "#85C1E2",
    "#F8B739", "#52BE80",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WheelSegment {
    pub recipe_id: RecipeId,
    pub label: String,
    pub start_deg: f64,
    pub sweep_deg: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WheelLayout {
    pub segments: Vec<WheelSegment>,
}

impl WheelLayout {
    /// Equal slices, one per recipe, in the given order. Built fresh each
    /// time the wheel opens; nothing carries over from an earlier layout.
    pub fn new(recipes: &[&Recipe]) -> Self {
        let sweep = segment_sweep_deg(recipes.len());
        let segments = recipes
            .iter()
            .enumerate()
            .map(|(i, recipe)| WheelSegment {
                recipe_id: recipe.id,
                label: recipe.name.clone(),
                start_deg: i as f64 * sweep,
                sweep_deg: sweep,
                color: SEGMENT_COLORS[i % SEGMENT_COLORS.len()],
            })
            .collect();
        Self { segments }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

fn segment_sweep_deg(count: usize) -> f64 {
    if count == 0 {
        return FULL_TURN_DEG;
    }
    FULL_TURN_DEG / count as f64
}

/// Ease-out cubic: fast start, gentle stop. `progress` is clamped to `[0, 1]`.
pub fn ease_out_cubic(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

/// Total rotation that lands the middle of `winner_index`'s slice under the
/// pointer after `extra_rotations` full turns.
pub fn target_rotation_deg(winner_index: usize, segment_count: usize, extra_rotations: u32) -> f64 {
    let sweep = segment_sweep_deg(segment_count);
    let offset = FULL_TURN_DEG - winner_index as f64 * sweep - sweep / 2.0;
    f64::from(extra_rotations) * FULL_TURN_DEG + offset
}

/// A fixed-duration eased rotation toward a precomputed target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinAnimation {
    pub total_rotation_deg: f64,
    pub duration_ms: u64,
}

impl SpinAnimation {
    pub fn new(winner_index: usize, segment_count: usize, extra_rotations: u32, duration_ms: u64) -> Self {
        Self {
            total_rotation_deg: target_rotation_deg(winner_index, segment_count, extra_rotations),
            duration_ms,
        }
    }

    pub fn progress(&self, elapsed_ms: u64) -> f64 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        (elapsed_ms as f64 / self.duration_ms as f64).min(1.0)
    }

    pub fn rotation_at(&self, elapsed_ms: u64) -> f64 {
        self.total_rotation_deg * ease_out_cubic(self.progress(elapsed_ms))
    }

    pub fn is_finished(&self, elapsed_ms: u64) -> bool {
        elapsed_ms >= self.duration_ms
    }
}
