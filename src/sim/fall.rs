//! Fall paths for decorative items
//!
//! Each fall cycle draws a fresh path: random horizontal start and end across
//! the viewport, a fixed vertical span from above the top edge to past the
//! bottom edge, and a random duration. Motion is linear and loops until the
//! cycle is replaced.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::Viewport;
use crate::consts::*;
use crate::lerp;

/// One randomized fall from spawn to exit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallPath {
    /// Top-left corner at t = 0
    pub start: Vec2,
    /// Top-left corner at t = duration
    pub end: Vec2,
    /// Seconds per loop
    pub duration_secs: f32,
}

impl FallPath {
    /// Draw a new path for the given viewport
    pub fn sample<R: Rng>(rng: &mut R, viewport: Viewport) -> Self {
        let width = viewport.width.max(0.0);
        let start_x = rng.random::<f32>() * width;
        let end_x = rng.random::<f32>() * width;
        let duration_secs = rng.random::<f32>() * FALL_DURATION_SPREAD + FALL_DURATION_MIN;

        Self {
            start: Vec2::new(start_x, -SPAWN_OFFSET),
            end: Vec2::new(end_x, viewport.height + EXIT_OVERSHOOT),
            duration_secs,
        }
    }

    /// Loop progress in [0, 1) after `elapsed_secs`
    pub fn progress(&self, elapsed_secs: f32) -> f32 {
        if self.duration_secs <= 0.0 {
            return 0.0;
        }
        (elapsed_secs.max(0.0) % self.duration_secs) / self.duration_secs
    }

    /// Top-left corner after `elapsed_secs` (linear, looping)
    pub fn position_at(&self, elapsed_secs: f32) -> Vec2 {
        let t = self.progress(elapsed_secs);
        Vec2::new(
            lerp(self.start.x, self.end.x, t),
            lerp(self.start.y, self.end.y, t),
        )
    }

    /// Seconds into the loop at which an item of `item_height` first has its
    /// bottom edge at or below `y` (None if the path never gets there)
    pub fn time_to_reach(&self, y: f32, item_height: f32) -> Option<f32> {
        let target_top = y - item_height;
        let span = self.end.y - self.start.y;
        if span <= 0.0 || target_top > self.end.y {
            return None;
        }
        let t = ((target_top - self.start.y) / span).max(0.0);
        Some(t * self.duration_secs)
    }
}
