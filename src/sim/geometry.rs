//! Axis-aligned rectangles in screen space
//!
//! Screen coordinates: x grows right, y grows down. A rect is stored as its
//! top-left corner plus size, matching what a layout engine reports.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle (top-left origin, y down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rect of the given size with its top-left corner at `pos`
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    /// Rect of the given size centered on `center`
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self::new(
            center.x - size.x / 2.0,
            center.y - size.y / 2.0,
            size.x,
            size.y,
        )
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.left + self.width / 2.0
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.center_x(), self.top + self.height / 2.0)
    }

    #[inline]
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.left, self.top)
    }

    /// Same rect shifted by `offset`
    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(
            self.left + offset.x,
            self.top + offset.y,
            self.width,
            self.height,
        )
    }

    /// Express this rect relative to `parent`'s top-left corner
    pub fn relative_to(&self, parent: &Rect) -> Self {
        self.translated(-parent.origin())
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left
            && point.x <= self.right()
            && point.y >= self.top
            && point.y <= self.bottom()
    }
}

/// Host viewport size (window inner width/height)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Full-viewport rect at the origin
    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        let (width, height) = crate::consts::DEFAULT_VIEWPORT;
        Self { width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges() {
        let r = Rect::new(10.0, 20.0, 112.0, 112.0);
        assert_eq!(r.right(), 122.0);
        assert_eq!(r.bottom(), 132.0);
        assert_eq!(r.center_x(), 66.0);
    }

    #[test]
    fn test_relative_to_parent() {
        let parent = Rect::new(0.0, -300.0, 1280.0, 720.0);
        let child = Rect::new(50.0, 100.0, 10.0, 10.0);
        let local = child.relative_to(&parent);
        assert_eq!(local.left, 50.0);
        assert_eq!(local.top, 400.0);
    }

    #[test]
    fn test_centered() {
        let r = Rect::centered(Vec2::new(100.0, 50.0), Vec2::new(40.0, 8.0));
        assert_eq!(r.left, 80.0);
        assert_eq!(r.top, 46.0);
        assert!(r.contains(Vec2::new(100.0, 50.0)));
        assert!(!r.contains(Vec2::new(130.0, 50.0)));
    }
}
