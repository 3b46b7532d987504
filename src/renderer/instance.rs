//! Quad instance buffers
//!
//! Every draw command becomes one instanced quad. The layout is plain POD so a
//! GPU backend can upload `InstanceBatch::as_bytes` straight into a vertex
//! buffer with instance step mode.

use bytemuck::{Pod, Zeroable};

use crate::scene::{ComposedScene, DrawCommand};

/// Quad kinds (must match shader)
pub mod kind {
    pub const BACKDROP: f32 = 0.0;
    pub const BUILDING: f32 = 1.0;
    pub const SPOTLIGHT: f32 = 2.0;
    pub const BOUNDARY: f32 = 3.0;
    pub const IMAGE: f32 = 4.0;
    pub const PLACEHOLDER: f32 = 5.0;
    pub const STREAK: f32 = 6.0;
    pub const PARTICLE: f32 = 7.0;
}

/// Texture slot for quads without an image
pub const NO_TEXTURE: f32 = -1.0;

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct QuadInstance {
    /// left, top, width, height (scene pixels)
    pub rect: [f32; 4],
    /// Primary color (gradient start)
    pub color: [f32; 4],
    /// Gradient end (or grid color for the backdrop)
    pub color_to: [f32; 4],
    /// rotation (radians), opacity, kind, texture slot
    pub params: [f32; 4],
}

impl QuadInstance {
    fn new(
        rect: [f32; 4],
        color: [f32; 4],
        color_to: [f32; 4],
        rotation: f32,
        opacity: f32,
        kind: f32,
        texture: f32,
    ) -> Self {
        Self {
            rect,
            color,
            color_to,
            params: [rotation, opacity, kind, texture],
        }
    }

    pub fn kind(&self) -> f32 {
        self.params[2]
    }

    pub fn opacity(&self) -> f32 {
        self.params[1]
    }

    pub fn texture(&self) -> Option<usize> {
        (self.params[3] >= 0.0).then_some(self.params[3] as usize)
    }
}

/// One frame of instances plus the textures they reference
#[derive(Debug, Clone, Default)]
pub struct InstanceBatch {
    pub instances: Vec<QuadInstance>,
    /// Image sources, indexed by texture slot
    pub textures: Vec<String>,
}

impl InstanceBatch {
    pub fn from_scene(composed: &ComposedScene) -> Self {
        let mut batch = Self {
            instances: Vec::with_capacity(composed.commands.len()),
            textures: Vec::new(),
        };
        for cmd in &composed.commands {
            let instance = batch.encode(cmd);
            batch.instances.push(instance);
        }
        batch
    }

    fn texture_slot(&mut self, src: &str) -> f32 {
        let slot = match self.textures.iter().position(|t| t == src) {
            Some(i) => i,
            None => {
                self.textures.push(src.to_string());
                self.textures.len() - 1
            }
        };
        slot as f32
    }

    fn encode(&mut self, cmd: &DrawCommand) -> QuadInstance {
        use kind::*;
        match cmd {
            DrawCommand::Backdrop { rect, color, grid } => {
                QuadInstance::new(rect_array(rect), *color, *grid, 0.0, 1.0, BACKDROP, NO_TEXTURE)
            }
            DrawCommand::Building { rect, rotation_deg, opacity, from, to } => QuadInstance::new(
                rect_array(rect),
                *from,
                *to,
                rotation_deg.to_radians(),
                *opacity,
                BUILDING,
                NO_TEXTURE,
            ),
            DrawCommand::Spotlight { rect, color } => {
                QuadInstance::new(rect_array(rect), *color, *color, 0.0, 1.0, SPOTLIGHT, NO_TEXTURE)
            }
            DrawCommand::Boundary { rect, color } => {
                QuadInstance::new(rect_array(rect), *color, *color, 0.0, 1.0, BOUNDARY, NO_TEXTURE)
            }
            DrawCommand::Image { rect, src, .. } => {
                let slot = self.texture_slot(src);
                QuadInstance::new(rect_array(rect), WHITE, WHITE, 0.0, 1.0, IMAGE, slot)
            }
            DrawCommand::Placeholder { rect, color, .. } => {
                QuadInstance::new(rect_array(rect), *color, *color, 0.0, 1.0, PLACEHOLDER, NO_TEXTURE)
            }
            DrawCommand::Streak { rect, color, opacity } => {
                QuadInstance::new(rect_array(rect), *color, *color, 0.0, *opacity, STREAK, NO_TEXTURE)
            }
            DrawCommand::Particle { rect, color, opacity } => {
                QuadInstance::new(rect_array(rect), *color, *color, 0.0, *opacity, PARTICLE, NO_TEXTURE)
            }
        }
    }

    /// Raw instance data for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

fn rect_array(rect: &crate::sim::Rect) -> [f32; 4] {
    [rect.left, rect.top, rect.width, rect.height]
}
