//! Collision detection between falling items and the boundary panel
//!
//! The check is deliberately one-dimensional: an item collides as soon as its
//! bottom edge reaches the boundary's top edge, wherever it is horizontally.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use super::state::ItemId;

/// Source of live element rectangles, all in the same (viewport) space.
///
/// Any rect may be unavailable, e.g. before the element is mounted.
pub trait LayoutProbe {
    /// Screen rect of a falling item
    fn item_rect(&self, id: ItemId) -> Option<Rect>;
    /// Screen rect of the boundary panel
    fn boundary_rect(&self) -> Option<Rect>;
    /// Screen rect of the scene root
    fn scene_rect(&self) -> Option<Rect>;
}

/// Per-cycle collision record.
///
/// `coordinates` is present exactly when a collision was detected.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CollisionEvent {
    coordinates: Option<Vec2>,
}

impl CollisionEvent {
    /// No collision this cycle
    pub const fn none() -> Self {
        Self { coordinates: None }
    }

    /// Collision at `point` (scene-local)
    pub const fn hit(point: Vec2) -> Self {
        Self {
            coordinates: Some(point),
        }
    }

    pub fn detected(&self) -> bool {
        self.coordinates.is_some()
    }

    pub fn coordinates(&self) -> Option<Vec2> {
        self.coordinates
    }
}

impl Serialize for CollisionEvent {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        CollisionRecord {
            detected: self.detected(),
            coordinates: self.coordinates,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CollisionEvent {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = CollisionRecord::deserialize(deserializer)?;
        if record.detected != record.coordinates.is_some() {
            return Err(serde::de::Error::custom(
                "collision coordinates must be present iff detected",
            ));
        }
        Ok(Self {
            coordinates: record.coordinates,
        })
    }
}

/// Wire shape of [`CollisionEvent`]
#[derive(Serialize, Deserialize)]
struct CollisionRecord {
    detected: bool,
    coordinates: Option<Vec2>,
}

/// Check whether `item` has reached `boundary`.
///
/// Returns the collision point relative to `scene`: the item's horizontal
/// center and its bottom edge.
pub fn item_boundary_collision(item: &Rect, boundary: &Rect, scene: &Rect) -> Option<Vec2> {
    if item.bottom() < boundary.top {
        return None;
    }
    let local = item.relative_to(scene);
    Some(Vec2::new(local.center_x(), local.bottom()))
}

/// Sample the probe for one item.
///
/// Silently yields None while any of the three rects is unmeasured; the caller
/// retries on its next tick.
pub fn sample_collision(probe: &dyn LayoutProbe, id: ItemId) -> Option<Vec2> {
    let item = probe.item_rect(id)?;
    let boundary = probe.boundary_rect()?;
    let scene = probe.scene_rect()?;
    item_boundary_collision(&item, &boundary, &scene)
}
