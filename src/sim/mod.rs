//! Deterministic simulation module
//!
//! All falling/collision logic lives here. This module must be pure and deterministic:
//! - Host-driven virtual clock only
//! - Injected RNG only
//! - Stable iteration order (items in mount order, timers by deadline then arm order)
//! - No rendering or platform dependencies

pub mod burst;
pub mod collision;
pub mod fall;
pub mod geometry;
pub mod state;
pub mod tick;
pub mod timer;

pub use burst::{Burst, Particle};
pub use collision::{CollisionEvent, LayoutProbe, item_boundary_collision, sample_collision};
pub use fall::FallPath;
pub use geometry::{Rect, Viewport};
pub use state::{
    FallingItem, ItemId, ItemPhase, ItemSnapshot, ItemVisual, Scene, SceneEvent, SceneSnapshot,
};
pub use tick::{SimulatedLayout, tick, tick_with_probe};
pub use timer::{CancelToken, Millis, Scheduler, TimerId};
