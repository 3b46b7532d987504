//! Scene composition
//!
//! Lays the falling layer over the static hero decoration (grid backdrop,
//! building blocks, spotlights) and flattens everything into an ordered
//! draw list, back to front. Rendering backends only ever see this list.

use glam::Vec2;
use serde::Serialize;

use crate::consts::*;
use crate::settings::SceneConfig;
use crate::sim::{ItemId, ItemVisual, Rect, Scene, Viewport};
use crate::theme::{Color, Theme};

/// Classes always applied to the scene root
pub const ROOT_CLASSES: &str = "h-screen absolute inset-0 pointer-events-none overflow-hidden z-40";

/// Fill for items without an image (indigo-500)
pub const PLACEHOLDER_COLOR: Color = [0.39, 0.4, 0.95, 1.0];
/// Burst particle/streak tint
pub const BURST_COLOR: Color = [0.55, 0.36, 0.96, 1.0];

/// Building blocks: (width, height, rotation degrees, opacity)
const BUILDINGS: [(f32, f32, f32, f32); 3] = [
    (96.0, 256.0, -6.0, 0.8),
    (128.0, 320.0, 6.0, 0.7),
    (112.0, 288.0, -3.0, 0.9),
];
/// Gap between building blocks (space-x-8)
const BUILDING_GAP: f32 = 32.0;

/// One thing to draw, in scene-local coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawCommand {
    Backdrop { rect: Rect, color: Color, grid: Color },
    Building { rect: Rect, rotation_deg: f32, opacity: f32, from: Color, to: Color },
    Spotlight { rect: Rect, color: Color },
    Boundary { rect: Rect, color: Color },
    Image { item: ItemId, rect: Rect, src: String },
    Placeholder { item: ItemId, rect: Rect, color: Color },
    Streak { rect: Rect, color: Color, opacity: f32 },
    Particle { rect: Rect, color: Color, opacity: f32 },
}

/// A frame's worth of drawing
#[derive(Debug, Clone, Serialize)]
pub struct ComposedScene {
    pub root_classes: String,
    pub size: Viewport,
    pub theme: Theme,
    /// Back to front
    pub commands: Vec<DrawCommand>,
}

impl ComposedScene {
    pub fn count<F: Fn(&DrawCommand) -> bool>(&self, pred: F) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }
}

/// Join root classes with caller overrides, keeping order and dropping blanks
/// and repeats
pub fn merge_classes(base: &str, overrides: &[String]) -> String {
    let mut out: Vec<&str> = Vec::new();
    let all = base
        .split_whitespace()
        .chain(overrides.iter().flat_map(|o| o.split_whitespace()));
    for class in all {
        if !out.contains(&class) {
            out.push(class);
        }
    }
    out.join(" ")
}

/// Compose the full hero scene at the scene's current time
pub fn compose<R>(scene: &Scene<R>, config: &SceneConfig, theme: Theme) -> ComposedScene {
    let viewport = scene.viewport;
    let palette = theme.palette();
    let mut commands = Vec::with_capacity(8 + scene.items.len() + scene.bursts.len() * 21);

    commands.push(DrawCommand::Backdrop {
        rect: viewport.rect(),
        color: palette.backdrop,
        grid: palette.grid,
    });
    commands.extend(buildings(viewport, &palette.buildings));
    commands.extend(spotlights(viewport));
    commands.push(DrawCommand::Boundary {
        rect: scene.boundary_rect(),
        color: palette.boundary,
    });

    let now = scene.now();
    for item in &scene.items {
        let rect = item.rect_at(now, scene.item_size);
        commands.push(match &item.visual {
            ItemVisual::Image(src) => DrawCommand::Image {
                item: item.id,
                rect,
                src: src.clone(),
            },
            ItemVisual::Placeholder => DrawCommand::Placeholder {
                item: item.id,
                rect,
                color: PLACEHOLDER_COLOR,
            },
        });
    }

    for burst in &scene.bursts {
        let age = burst.age_secs(now);
        commands.push(DrawCommand::Streak {
            rect: Rect::centered(burst.origin, Vec2::new(STREAK_WIDTH, STREAK_HEIGHT)),
            color: BURST_COLOR,
            opacity: burst.streak_opacity(now),
        });

        let fade = burst.exit_fade(now);
        for particle in &burst.particles {
            let opacity = particle.opacity_at(age) * fade;
            if opacity <= 0.0 {
                continue;
            }
            commands.push(DrawCommand::Particle {
                rect: Rect::centered(
                    burst.origin + particle.offset_at(age),
                    Vec2::splat(PARTICLE_SIZE),
                ),
                color: BURST_COLOR,
                opacity,
            });
        }
    }

    ComposedScene {
        root_classes: merge_classes(ROOT_CLASSES, &config.class_overrides),
        size: viewport,
        theme,
        commands,
    }
}

/// Three tilted blocks, centered in the viewport
fn buildings(viewport: Viewport, gradients: &[(Color, Color); 3]) -> Vec<DrawCommand> {
    let total_width: f32 =
        BUILDINGS.iter().map(|b| b.0).sum::<f32>() + BUILDING_GAP * (BUILDINGS.len() - 1) as f32;
    let mut x = (viewport.width - total_width) / 2.0;

    BUILDINGS
        .iter()
        .zip(gradients)
        .map(|(&(w, h, rotation_deg, opacity), &(from, to))| {
            let rect = Rect::new(x, (viewport.height - h) / 2.0, w, h);
            x += w + BUILDING_GAP;
            DrawCommand::Building {
                rect,
                rotation_deg,
                opacity,
                from,
                to,
            }
        })
        .collect()
}

/// White, purple and blue spotlights
fn spotlights(viewport: Viewport) -> [DrawCommand; 3] {
    let (vw, vh) = (viewport.width, viewport.height);
    [
        DrawCommand::Spotlight {
            rect: Rect::new(-40.0, -160.0, vw * 0.84, vh),
            color: [1.0, 1.0, 1.0, 0.21],
        },
        DrawCommand::Spotlight {
            rect: Rect::new(vw, 40.0, vw * 0.5, vh * 0.8),
            color: [0.66, 0.33, 0.97, 0.21],
        },
        DrawCommand::Spotlight {
            rect: Rect::new(320.0, 112.0, vw * 0.5, vh * 0.8),
            color: [0.23, 0.51, 0.96, 0.21],
        },
    ]
}
