//! Hero Fall - falling images with collision bursts
//!
//! Core modules:
//! - `sim`: Deterministic simulation (fall paths, collision polling, bursts, timers)
//! - `scene`: Scene composition (falling layer + static decorative panels)
//! - `renderer`: Quad instance buffers and DOM output
//! - `settings`: Scene configuration
//! - `theme`: Light/dark theme flag

pub mod renderer;
pub mod scene;
pub mod settings;
pub mod sim;
pub mod theme;

pub use scene::{ComposedScene, DrawCommand, compose};
pub use settings::{ConfigError, SceneConfig};
pub use sim::Scene;
pub use theme::Theme;

/// Scene configuration constants
pub mod consts {
    /// Collision poll period (milliseconds)
    pub const POLL_INTERVAL_MS: u64 = 50;
    /// How long a collision stays recorded before the item respawns (milliseconds)
    pub const COLLISION_DISPLAY_MS: u64 = 2000;

    /// Items spawn this far above the top edge
    pub const SPAWN_OFFSET: f32 = 200.0;
    /// Items travel this far past the bottom edge before looping
    pub const EXIT_OVERSHOOT: f32 = 100.0;
    /// Fall duration = FALL_DURATION_MIN + random * FALL_DURATION_SPREAD (seconds)
    pub const FALL_DURATION_MIN: f32 = 6.0;
    pub const FALL_DURATION_SPREAD: f32 = 8.0;
    /// Falling item edge length (h-28 / w-28)
    pub const ITEM_SIZE: f32 = 112.0;

    /// Particles per burst
    pub const BURST_PARTICLES: usize = 20;
    /// Particle horizontal displacement range [min, max)
    pub const PARTICLE_SPREAD_X: (f32, f32) = (-40.0, 40.0);
    /// Particle vertical displacement range [min, max) (negative = up)
    pub const PARTICLE_SPREAD_Y: (f32, f32) = (-60.0, -10.0);
    /// Particle fade duration range [min, max) (seconds)
    pub const PARTICLE_FADE_SECS: (f32, f32) = (0.5, 2.0);
    /// Particle edge length (h-1 / w-1)
    pub const PARTICLE_SIZE: f32 = 4.0;
    /// Central streak fade duration (seconds)
    pub const STREAK_FADE_SECS: f32 = 1.5;
    /// Central streak size (w-10 h-2)
    pub const STREAK_WIDTH: f32 = 40.0;
    pub const STREAK_HEIGHT: f32 = 8.0;

    /// Default viewport when the host can't be queried
    pub const DEFAULT_VIEWPORT: (f32, f32) = (1280.0, 720.0);
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Ease-out curve on [0, 1] (fast start, decelerating finish)
#[inline]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Milliseconds to seconds
#[inline]
pub fn ms_to_secs(ms: u64) -> f32 {
    ms as f32 / 1000.0
}
