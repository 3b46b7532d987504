//! Scene state and falling items
//!
//! Everything here is transient: created at mount, gone at unmount.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::burst::Burst;
use super::collision::CollisionEvent;
use super::fall::FallPath;
use super::geometry::{Rect, Viewport};
use super::timer::{CancelToken, Millis, Scheduler, TimerId};
use crate::ms_to_secs;
use crate::settings::SceneConfig;

/// Stable falling item identifier (mount order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u32);

/// What a falling item shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemVisual {
    /// Image by source path/URL
    Image(String),
    /// Solid block, used for empty image identifiers
    Placeholder,
}

impl ItemVisual {
    pub fn from_src(src: &str) -> Self {
        if src.is_empty() {
            ItemVisual::Placeholder
        } else {
            ItemVisual::Image(src.to_string())
        }
    }

    pub fn src(&self) -> Option<&str> {
        match self {
            ItemVisual::Image(src) => Some(src),
            ItemVisual::Placeholder => None,
        }
    }
}

/// Collision lifecycle of a falling item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemPhase {
    /// Moving, polled for collisions
    Falling,
    /// Collision recorded, burst showing, respawn scheduled
    CollisionPending,
}

/// Deferred work owned by an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerAction {
    Poll(ItemId),
    ClearCollision(ItemId),
    AdvanceCycle(ItemId),
}

/// Observable scene happenings, drained by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneEvent {
    CollisionDetected { item: ItemId, at: Vec2, time: Millis },
    CollisionCleared { item: ItemId, time: Millis },
    CycleAdvanced { item: ItemId, cycle_key: u32, time: Millis },
}

/// A decorative image dropping through the scene
#[derive(Debug, Clone)]
pub struct FallingItem {
    pub id: ItemId,
    pub visual: ItemVisual,
    /// Bumped on every collision respawn; a new key means a new path
    pub cycle_key: u32,
    pub path: FallPath,
    /// Scene time when the current path started
    pub cycle_started_at: Millis,
    pub collision: CollisionEvent,
    pub(crate) poll_timer: Option<TimerId>,
    pub(crate) token: CancelToken,
}

impl FallingItem {
    pub fn phase(&self) -> ItemPhase {
        if self.collision.detected() {
            ItemPhase::CollisionPending
        } else {
            ItemPhase::Falling
        }
    }

    /// Top-left corner (scene-local) at scene time `now`
    pub fn position_at(&self, now: Millis) -> Vec2 {
        let elapsed = ms_to_secs(now.saturating_sub(self.cycle_started_at));
        self.path.position_at(elapsed)
    }

    /// Scene-local rect at scene time `now`
    pub fn rect_at(&self, now: Millis, size: f32) -> Rect {
        Rect::from_pos_size(self.position_at(now), Vec2::splat(size))
    }

    /// Whether a collision poll is currently armed
    pub fn is_polling(&self) -> bool {
        self.poll_timer.is_some()
    }
}

/// The falling-items scene: items, bursts and their timers.
///
/// The RNG is injected so runs are reproducible; [`Scene::new`] seeds a
/// `Pcg32` from the config (or from entropy when no seed is given).
#[derive(Debug)]
pub struct Scene<R = Pcg32> {
    /// Seed used for the RNG, when known
    pub seed: Option<u64>,
    pub(crate) rng: R,
    /// Viewport used for the next path sample
    pub viewport: Viewport,
    /// Scene root's top-left corner in viewport space (scroll/layout offset)
    pub origin: Vec2,
    pub boundary_height: f32,
    pub item_size: f32,
    pub poll_interval_ms: Millis,
    pub collision_display_ms: Millis,
    /// Items in mount order
    pub items: Vec<FallingItem>,
    /// Live bursts (including ones playing their exit fade)
    pub bursts: Vec<Burst>,
    pub(crate) events: Vec<SceneEvent>,
    pub(crate) timers: Scheduler<TimerAction>,
    mounted: bool,
}

impl Scene<Pcg32> {
    /// Mount a scene with a `Pcg32` seeded from `config.seed` (or entropy)
    pub fn new(config: &SceneConfig, viewport: Viewport) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random::<u64>);
        let mut scene = Self::with_rng(config, viewport, Pcg32::seed_from_u64(seed));
        scene.seed = Some(seed);
        scene
    }
}

impl<R: Rng> Scene<R> {
    /// Mount a scene with a caller-supplied RNG
    pub fn with_rng(config: &SceneConfig, viewport: Viewport, rng: R) -> Self {
        let mut scene = Self {
            seed: None,
            rng,
            viewport,
            origin: Vec2::ZERO,
            boundary_height: config.boundary_height,
            item_size: config.item_size,
            poll_interval_ms: config.poll_interval_ms,
            collision_display_ms: config.collision_display_ms,
            items: Vec::with_capacity(config.images.len()),
            bursts: Vec::new(),
            events: Vec::new(),
            timers: Scheduler::new(),
            mounted: true,
        };

        for src in &config.images {
            scene.mount_item(src);
        }
        log::info!(
            "Scene mounted: {} items, viewport {}x{}",
            scene.items.len(),
            viewport.width,
            viewport.height
        );

        scene
    }

    fn mount_item(&mut self, src: &str) {
        let id = ItemId(self.items.len() as u32 + 1);
        let token = CancelToken::new();
        let poll_timer = self
            .timers
            .schedule_every(self.poll_interval_ms, TimerAction::Poll(id), &token);
        let path = FallPath::sample(&mut self.rng, self.viewport);

        self.items.push(FallingItem {
            id,
            visual: ItemVisual::from_src(src),
            cycle_key: 0,
            path,
            cycle_started_at: self.timers.now(),
            collision: CollisionEvent::none(),
            poll_timer: Some(poll_timer),
            token,
        });
    }
}

impl<R> Scene<R> {
    /// Current scene time
    pub fn now(&self) -> Millis {
        self.timers.now()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub(crate) fn item_index(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    /// Host viewport changed. Only paths sampled from now on see the new size.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Scene root moved within the viewport (scroll or layout shift)
    pub fn set_origin(&mut self, origin: Vec2) {
        self.origin = origin;
    }

    /// Scene root rect (scene-local)
    pub fn scene_rect(&self) -> Rect {
        self.viewport.rect()
    }

    /// Boundary panel rect (scene-local): full width, anchored to the bottom
    pub fn boundary_rect(&self) -> Rect {
        Rect::new(
            0.0,
            self.viewport.height - self.boundary_height,
            self.viewport.width,
            self.boundary_height,
        )
    }

    /// Number of armed timers across all items
    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    /// Take all events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    /// Tear the scene down, cancelling every timer its items armed
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        for item in &self.items {
            item.token.cancel();
        }
        log::info!(
            "Scene unmounted at {}ms ({} items)",
            self.now(),
            self.items.len()
        );
        self.items.clear();
        self.bursts.clear();
        self.mounted = false;
    }

    /// Serializable view of the current state
    pub fn snapshot(&self) -> SceneSnapshot {
        let now = self.now();
        SceneSnapshot {
            time_ms: now,
            seed: self.seed,
            items: self
                .items
                .iter()
                .map(|item| ItemSnapshot {
                    id: item.id,
                    src: item.visual.src().map(str::to_string),
                    cycle_key: item.cycle_key,
                    phase: item.phase(),
                    rect: item.rect_at(now, self.item_size),
                    collision: item.collision,
                })
                .collect(),
            bursts: self.bursts.len(),
        }
    }
}

/// Serializable item state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub id: ItemId,
    pub src: Option<String>,
    pub cycle_key: u32,
    pub phase: ItemPhase,
    pub rect: Rect,
    pub collision: CollisionEvent,
}

/// Serializable scene state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub time_ms: Millis,
    pub seed: Option<u64>,
    pub items: Vec<ItemSnapshot>,
    pub bursts: usize,
}
