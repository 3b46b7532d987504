//! Scene clock
//!
//! Advances the scene by a host-supplied delta, firing due timers in order:
//! collision polls, collision clears and cycle restarts.

use glam::Vec2;
use rand::Rng;

use super::burst::Burst;
use super::collision::{CollisionEvent, LayoutProbe, sample_collision};
use super::fall::FallPath;
use super::geometry::Rect;
use super::state::{FallingItem, ItemId, Scene, SceneEvent, TimerAction};
use super::timer::Millis;

/// Layout derived from the simulation itself: item rects come from their fall
/// paths, shifted by the scene origin into viewport space.
pub struct SimulatedLayout<'a> {
    items: &'a [FallingItem],
    now: Millis,
    item_size: f32,
    origin: Vec2,
    scene: Rect,
    boundary: Rect,
}

impl<'a> SimulatedLayout<'a> {
    pub fn of<R>(scene: &'a Scene<R>) -> Self {
        Self {
            items: &scene.items,
            now: scene.now(),
            item_size: scene.item_size,
            origin: scene.origin,
            scene: scene.scene_rect(),
            boundary: scene.boundary_rect(),
        }
    }
}

impl LayoutProbe for SimulatedLayout<'_> {
    fn item_rect(&self, id: ItemId) -> Option<Rect> {
        self.items
            .iter()
            .find(|i| i.id == id)
            .map(|i| i.rect_at(self.now, self.item_size).translated(self.origin))
    }

    fn boundary_rect(&self) -> Option<Rect> {
        Some(self.boundary.translated(self.origin))
    }

    fn scene_rect(&self) -> Option<Rect> {
        Some(self.scene.translated(self.origin))
    }
}

/// Advance the scene by `dt_ms`, measuring items from the simulation
pub fn tick<R: Rng>(scene: &mut Scene<R>, dt_ms: Millis) {
    run(scene, dt_ms, None);
}

/// Advance the scene by `dt_ms`, measuring items through `probe`
pub fn tick_with_probe<R: Rng>(scene: &mut Scene<R>, dt_ms: Millis, probe: &dyn LayoutProbe) {
    run(scene, dt_ms, Some(probe));
}

fn run<R: Rng>(scene: &mut Scene<R>, dt_ms: Millis, probe: Option<&dyn LayoutProbe>) {
    if !scene.is_mounted() {
        return;
    }

    let target = scene.now() + dt_ms;
    while let Some((_, action)) = scene.timers.pop_due(target) {
        match action {
            TimerAction::Poll(id) => poll(scene, id, probe),
            TimerAction::ClearCollision(id) => clear_collision(scene, id),
            TimerAction::AdvanceCycle(id) => advance_cycle(scene, id),
        }
    }
    scene.timers.advance_to(target);

    let now = scene.now();
    scene.bursts.retain(|b| !b.is_finished(now));
}

/// One collision check for one item
fn poll<R: Rng>(scene: &mut Scene<R>, id: ItemId, probe: Option<&dyn LayoutProbe>) {
    let Some(idx) = scene.item_index(id) else {
        return;
    };
    // Already hit this cycle
    if scene.items[idx].collision.detected() {
        return;
    }

    let hit = match probe {
        Some(probe) => sample_collision(probe, id),
        None => sample_collision(&SimulatedLayout::of(scene), id),
    };
    let Some(point) = hit else {
        return;
    };

    let now = scene.now();
    let delay = scene.collision_display_ms;
    let item = &mut scene.items[idx];
    item.collision = CollisionEvent::hit(point);
    if let Some(timer) = item.poll_timer.take() {
        scene.timers.cancel(timer);
    }
    let token = item.token.clone();
    scene
        .timers
        .schedule_once(delay, TimerAction::ClearCollision(id), &token);
    scene
        .timers
        .schedule_once(delay, TimerAction::AdvanceCycle(id), &token);

    let burst = Burst::spawn(&mut scene.rng, id, point, now);
    scene.bursts.push(burst);
    scene.events.push(SceneEvent::CollisionDetected {
        item: id,
        at: point,
        time: now,
    });
    log::debug!(
        "Item {} hit boundary at ({:.1}, {:.1}) t={}ms",
        id.0,
        point.x,
        point.y,
        now
    );
}

/// Drop the collision record and re-arm polling
fn clear_collision<R>(scene: &mut Scene<R>, id: ItemId) {
    let Some(idx) = scene.item_index(id) else {
        return;
    };
    let now = scene.now();
    let period = scene.poll_interval_ms;

    let item = &mut scene.items[idx];
    item.collision = CollisionEvent::none();
    if item.poll_timer.is_none() {
        item.poll_timer = Some(
            scene
                .timers
                .schedule_every(period, TimerAction::Poll(id), &item.token),
        );
    }

    for burst in scene.bursts.iter_mut().filter(|b| b.owner == id) {
        burst.begin_exit(now);
    }
    scene
        .events
        .push(SceneEvent::CollisionCleared { item: id, time: now });
}

/// Restart the item on a freshly sampled path
fn advance_cycle<R: Rng>(scene: &mut Scene<R>, id: ItemId) {
    let Some(idx) = scene.item_index(id) else {
        return;
    };
    let now = scene.now();
    let path = FallPath::sample(&mut scene.rng, scene.viewport);

    let item = &mut scene.items[idx];
    item.cycle_key += 1;
    item.path = path;
    item.cycle_started_at = now;

    let cycle_key = item.cycle_key;
    scene.events.push(SceneEvent::CycleAdvanced {
        item: id,
        cycle_key,
        time: now,
    });
    log::debug!(
        "Item {} respawned (cycle {}, {:.2}s fall)",
        id.0,
        cycle_key,
        path.duration_secs
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SceneConfig;
    use crate::sim::geometry::Viewport;
    use crate::sim::state::ItemPhase;
    use std::cell::Cell;

    const VIEWPORT: Viewport = Viewport::new(1000.0, 700.0);

    fn config(images: &[&str]) -> SceneConfig {
        SceneConfig {
            images: images.iter().map(|s| s.to_string()).collect(),
            seed: Some(4242),
            ..Default::default()
        }
    }

    /// Probe whose item bottom edge is driven by the test
    struct ScriptedProbe {
        bottoms: Vec<Cell<f32>>,
        boundary_top: f32,
        scene_top: f32,
    }

    impl ScriptedProbe {
        fn new(items: usize, boundary_top: f32) -> Self {
            Self {
                bottoms: (0..items).map(|_| Cell::new(0.0)).collect(),
                boundary_top,
                scene_top: 0.0,
            }
        }

        fn set_bottom(&self, id: ItemId, bottom: f32) {
            self.bottoms[id.0 as usize - 1].set(bottom);
        }
    }

    impl LayoutProbe for ScriptedProbe {
        fn item_rect(&self, id: ItemId) -> Option<Rect> {
            let bottom = self.bottoms.get(id.0 as usize - 1)?.get();
            Some(Rect::new(200.0, bottom - 112.0, 112.0, 112.0))
        }
        fn boundary_rect(&self) -> Option<Rect> {
            Some(Rect::new(0.0, self.boundary_top, 1000.0, 0.0))
        }
        fn scene_rect(&self) -> Option<Rect> {
            Some(Rect::new(0.0, self.scene_top, 1000.0, 700.0))
        }
    }

    fn detections(events: &[SceneEvent]) -> Vec<(ItemId, Millis)> {
        events
            .iter()
            .filter_map(|e| match e {
                SceneEvent::CollisionDetected { item, time, .. } => Some((*item, *time)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_detects_on_first_tick_at_boundary() {
        let mut scene = Scene::new(&config(&["a.jpg"]), VIEWPORT);
        let probe = ScriptedProbe::new(1, 700.0);
        let id = ItemId(1);

        // Approaching: bottom edge above the boundary for 10 polls
        for n in 1..=10 {
            probe.set_bottom(id, 600.0 + n as f32);
            tick_with_probe(&mut scene, 50, &probe);
        }
        assert_eq!(scene.items[0].phase(), ItemPhase::Falling);
        assert!(scene.drain_events().is_empty());

        // Reaches the boundary on poll 11
        probe.set_bottom(id, 700.0);
        tick_with_probe(&mut scene, 50, &probe);
        let events = scene.drain_events();
        assert_eq!(detections(&events), vec![(id, 550)]);
        assert_eq!(scene.items[0].phase(), ItemPhase::CollisionPending);
        assert_eq!(
            scene.items[0].collision.coordinates(),
            Some(Vec2::new(256.0, 700.0))
        );
    }

    #[test]
    fn test_collision_recorded_once_per_cycle() {
        let mut scene = Scene::new(&config(&["a.jpg"]), VIEWPORT);
        let probe = ScriptedProbe::new(1, 700.0);
        probe.set_bottom(ItemId(1), 800.0);

        // Stays past the boundary for most of the display window
        for _ in 0..30 {
            tick_with_probe(&mut scene, 50, &probe);
        }
        let events = scene.drain_events();
        assert_eq!(detections(&events).len(), 1);
        assert_eq!(scene.bursts.len(), 1);
        assert!(!scene.items[0].is_polling());
    }

    #[test]
    fn test_clear_and_restart_after_display_window() {
        let mut scene = Scene::new(&config(&["a.jpg"]), VIEWPORT);
        let probe = ScriptedProbe::new(1, 700.0);
        probe.set_bottom(ItemId(1), 750.0);

        tick_with_probe(&mut scene, 50, &probe);
        assert_eq!(scene.items[0].phase(), ItemPhase::CollisionPending);
        let old_path = scene.items[0].path;
        scene.drain_events();

        // Move away so the re-armed poll doesn't fire again
        probe.set_bottom(ItemId(1), 0.0);

        tick_with_probe(&mut scene, 1999, &probe);
        assert_eq!(scene.items[0].phase(), ItemPhase::CollisionPending);
        assert_eq!(scene.items[0].cycle_key, 0);

        tick_with_probe(&mut scene, 1, &probe);
        assert_eq!(scene.now(), 2050);
        assert_eq!(scene.items[0].phase(), ItemPhase::Falling);
        assert_eq!(scene.items[0].cycle_key, 1);
        assert_eq!(scene.items[0].cycle_started_at, 2050);
        assert_ne!(scene.items[0].path, old_path);
        assert!(scene.items[0].is_polling());

        // Clear strictly before the cycle advance, both at detection + 2000
        let events = scene.drain_events();
        assert_eq!(
            events,
            vec![
                SceneEvent::CollisionCleared { item: ItemId(1), time: 2050 },
                SceneEvent::CycleAdvanced { item: ItemId(1), cycle_key: 1, time: 2050 },
            ]
        );

        // Much later: still exactly one increment
        tick_with_probe(&mut scene, 10_000, &probe);
        assert_eq!(scene.items[0].cycle_key, 1);
    }

    #[test]
    fn test_burst_exits_after_clear() {
        let mut scene = Scene::new(&config(&["a.jpg"]), VIEWPORT);
        let probe = ScriptedProbe::new(1, 700.0);
        probe.set_bottom(ItemId(1), 750.0);
        tick_with_probe(&mut scene, 50, &probe);
        probe.set_bottom(ItemId(1), 0.0);

        tick_with_probe(&mut scene, 2000, &probe);
        assert_eq!(scene.bursts.len(), 1);
        assert!(scene.bursts[0].is_exiting());

        tick_with_probe(&mut scene, 1500, &probe);
        assert!(scene.bursts.is_empty());
    }

    #[test]
    fn test_unmeasured_items_are_skipped() {
        struct Unmounted;
        impl LayoutProbe for Unmounted {
            fn item_rect(&self, _id: ItemId) -> Option<Rect> {
                None
            }
            fn boundary_rect(&self) -> Option<Rect> {
                Some(Rect::new(0.0, 0.0, 1000.0, 0.0))
            }
            fn scene_rect(&self) -> Option<Rect> {
                Some(Rect::new(0.0, 0.0, 1000.0, 700.0))
            }
        }

        let mut scene = Scene::new(&config(&["a.jpg"]), VIEWPORT);
        tick_with_probe(&mut scene, 1000, &Unmounted);
        assert_eq!(scene.items[0].phase(), ItemPhase::Falling);
        assert!(scene.items[0].is_polling());
        assert!(scene.drain_events().is_empty());
    }

    #[test]
    fn test_no_collision_keeps_looping_same_cycle() {
        let mut scene = Scene::new(&config(&["a.jpg"]), VIEWPORT);
        // Boundary far below anything the item can reach
        let probe = ScriptedProbe::new(1, 100_000.0);
        let loop_ms = (scene.items[0].path.duration_secs * 1000.0) as u64;

        let mut last_y = scene.items[0].position_at(scene.now()).y;
        let mut wrapped = false;
        let mut elapsed = 0;
        while elapsed < loop_ms + 1000 {
            probe.set_bottom(ItemId(1), 500.0);
            tick_with_probe(&mut scene, 50, &probe);
            elapsed += 50;

            let y = scene.items[0].position_at(scene.now()).y;
            wrapped |= y < last_y;
            last_y = y;
        }

        assert!(wrapped);
        assert!(scene.drain_events().is_empty());
        assert_eq!(scene.items[0].cycle_key, 0);
        assert_eq!(scene.items[0].phase(), ItemPhase::Falling);
        assert!(scene.items[0].is_polling());
        assert!(scene.bursts.is_empty());
    }

    #[test]
    fn test_two_items_collide_independently() {
        let mut scene = Scene::new(&config(&["a.jpg", "b.jpg"]), VIEWPORT);
        let probe = ScriptedProbe::new(2, 700.0);
        probe.set_bottom(ItemId(1), 720.0);
        probe.set_bottom(ItemId(2), 710.0);

        tick_with_probe(&mut scene, 50, &probe);
        let events = scene.drain_events();
        assert_eq!(
            detections(&events),
            vec![(ItemId(1), 50), (ItemId(2), 50)]
        );
        assert_eq!(scene.bursts.len(), 2);
        assert_ne!(scene.bursts[0].owner, scene.bursts[1].owner);

        probe.set_bottom(ItemId(1), 0.0);
        probe.set_bottom(ItemId(2), 0.0);
        tick_with_probe(&mut scene, 2000, &probe);
        assert_eq!(scene.items[0].cycle_key, 1);
        assert_eq!(scene.items[1].cycle_key, 1);

        let advanced: Vec<_> = scene
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, SceneEvent::CycleAdvanced { .. }))
            .collect();
        assert_eq!(advanced.len(), 2);
    }

    #[test]
    fn test_collision_point_in_scene_space() {
        let mut scene = Scene::new(&config(&["a.jpg"]), VIEWPORT);
        let mut probe = ScriptedProbe::new(1, 400.0);
        // Scene root scrolled 300px up
        probe.scene_top = -300.0;
        probe.set_bottom(ItemId(1), 400.0);

        tick_with_probe(&mut scene, 50, &probe);
        assert_eq!(
            scene.items[0].collision.coordinates(),
            Some(Vec2::new(256.0, 700.0))
        );
        assert_eq!(scene.bursts[0].origin, Vec2::new(256.0, 700.0));
    }

    #[test]
    fn test_simulated_fall_hits_near_predicted_time() {
        let mut scene = Scene::new(&config(&["a.jpg"]), VIEWPORT);
        let path = scene.items[0].path;
        let expected = path
            .time_to_reach(VIEWPORT.height, scene.item_size)
            .unwrap();
        let expected_ms = (expected * 1000.0) as Millis;

        for _ in 0..400 {
            tick(&mut scene, 50);
            if scene.items[0].collision.detected() {
                break;
            }
        }
        let events = scene.drain_events();
        let hits = detections(&events);
        assert_eq!(hits.len(), 1);
        let at = hits[0].1;
        // Never early; at most one poll period late (plus rounding)
        assert!(
            at + 1 >= expected_ms && at <= expected_ms + 51,
            "hit at {at}, expected ~{expected_ms}"
        );
    }

    #[test]
    fn test_simulated_collision_ignores_scroll_offset() {
        let mut a = Scene::new(&config(&["a.jpg"]), VIEWPORT);
        let mut b = Scene::new(&config(&["a.jpg"]), VIEWPORT);
        b.set_origin(Vec2::new(0.0, -450.0));

        for _ in 0..400 {
            tick(&mut a, 50);
            tick(&mut b, 50);
        }
        let ha = detections(&a.drain_events());
        let hb = detections(&b.drain_events());
        assert!(!ha.is_empty());
        assert_eq!(ha, hb);

        let pa = a.bursts.iter().map(|b| b.origin);
        let pb = b.bursts.iter().map(|b| b.origin);
        for (x, y) in pa.zip(pb) {
            assert!((x - y).length() < 0.01);
        }
    }

    #[test]
    fn test_unmount_stops_pending_work() {
        let mut scene = Scene::new(&config(&["a.jpg"]), VIEWPORT);
        let probe = ScriptedProbe::new(1, 700.0);
        probe.set_bottom(ItemId(1), 750.0);
        tick_with_probe(&mut scene, 50, &probe);
        assert_eq!(scene.pending_timers(), 2);
        scene.drain_events();

        scene.unmount();
        assert_eq!(scene.pending_timers(), 0);
        tick_with_probe(&mut scene, 5000, &probe);
        assert!(scene.drain_events().is_empty());
    }

    #[test]
    fn test_determinism() {
        let mut a = Scene::new(&config(&["a.jpg", "", "b.jpg"]), VIEWPORT);
        let mut b = Scene::new(&config(&["a.jpg", "", "b.jpg"]), VIEWPORT);
        for _ in 0..600 {
            tick(&mut a, 16);
            tick(&mut b, 16);
        }
        assert_eq!(a.drain_events(), b.drain_events());
        for (x, y) in a.items.iter().zip(&b.items) {
            assert_eq!(x.path, y.path);
            assert_eq!(x.cycle_key, y.cycle_key);
        }
    }
}
