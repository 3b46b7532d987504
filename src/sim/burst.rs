//! Particle bursts spawned at collision points
//!
//! A burst is purely visual: 20 particles flung up and outwards while they
//! fade, plus a central streak. It lives while its owner's collision is
//! recorded, then plays an exit fade and is dropped.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::ItemId;
use super::timer::Millis;
use crate::consts::*;
use crate::{ease_out, ms_to_secs};

/// One burst particle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Final horizontal displacement from the burst origin
    pub direction_x: f32,
    /// Final vertical displacement (negative = up)
    pub direction_y: f32,
    /// Fade-out time (seconds)
    pub duration_secs: f32,
}

impl Particle {
    fn sample<R: Rng>(rng: &mut R) -> Self {
        let (x_min, x_max) = PARTICLE_SPREAD_X;
        let (y_min, y_max) = PARTICLE_SPREAD_Y;
        let (d_min, d_max) = PARTICLE_FADE_SECS;
        Self {
            direction_x: rng.random_range(x_min..x_max).floor(),
            direction_y: rng.random_range(y_min..y_max).floor(),
            duration_secs: rng.random_range(d_min..d_max),
        }
    }

    fn eased(&self, age_secs: f32) -> f32 {
        ease_out(age_secs / self.duration_secs)
    }

    /// Displacement from the origin after `age_secs`
    pub fn offset_at(&self, age_secs: f32) -> Vec2 {
        Vec2::new(self.direction_x, self.direction_y) * self.eased(age_secs)
    }

    /// Opacity after `age_secs` (1 at spawn, 0 when done)
    pub fn opacity_at(&self, age_secs: f32) -> f32 {
        1.0 - self.eased(age_secs)
    }
}

/// Burst effect at a collision point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Burst {
    /// Item whose collision spawned this burst
    pub owner: ItemId,
    /// Collision point (scene-local)
    pub origin: Vec2,
    pub particles: Vec<Particle>,
    pub spawned_at: Millis,
    /// Set once the owner's collision is cleared
    pub exit_started_at: Option<Millis>,
}

impl Burst {
    pub fn spawn<R: Rng>(rng: &mut R, owner: ItemId, origin: Vec2, now: Millis) -> Self {
        let particles = (0..BURST_PARTICLES).map(|_| Particle::sample(rng)).collect();
        Self {
            owner,
            origin,
            particles,
            spawned_at: now,
            exit_started_at: None,
        }
    }

    /// Seconds since spawn
    pub fn age_secs(&self, now: Millis) -> f32 {
        ms_to_secs(now.saturating_sub(self.spawned_at))
    }

    pub fn is_exiting(&self) -> bool {
        self.exit_started_at.is_some()
    }

    /// Start the exit fade (no-op if already exiting)
    pub fn begin_exit(&mut self, now: Millis) {
        self.exit_started_at.get_or_insert(now);
    }

    /// True once the exit fade has run to completion
    pub fn is_finished(&self, now: Millis) -> bool {
        match self.exit_started_at {
            Some(start) => ms_to_secs(now.saturating_sub(start)) >= STREAK_FADE_SECS,
            None => false,
        }
    }

    /// Streak opacity: eases in after spawn, eases out after exit starts
    pub fn streak_opacity(&self, now: Millis) -> f32 {
        match self.exit_started_at {
            Some(start) => {
                let shown = ms_to_secs(start.saturating_sub(self.spawned_at));
                ease_out(shown / STREAK_FADE_SECS) * self.exit_fade(now)
            }
            None => ease_out(self.age_secs(now) / STREAK_FADE_SECS),
        }
    }

    /// Multiplier applied to particle opacity while exiting
    pub fn exit_fade(&self, now: Millis) -> f32 {
        match self.exit_started_at {
            Some(start) => 1.0 - ease_out(ms_to_secs(now.saturating_sub(start)) / STREAK_FADE_SECS),
            None => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn burst(seed: u64) -> Burst {
        let mut rng = Pcg32::seed_from_u64(seed);
        Burst::spawn(&mut rng, ItemId(1), Vec2::new(300.0, 700.0), 1000)
    }

    #[test]
    fn test_burst_has_twenty_particles() {
        assert_eq!(burst(1).particles.len(), 20);
    }

    #[test]
    fn test_particle_motion() {
        let p = Particle {
            direction_x: 30.0,
            direction_y: -50.0,
            duration_secs: 1.0,
        };
        assert_eq!(p.offset_at(0.0), Vec2::ZERO);
        assert_eq!(p.opacity_at(0.0), 1.0);
        assert_eq!(p.offset_at(1.0), Vec2::new(30.0, -50.0));
        assert_eq!(p.opacity_at(1.0), 0.0);
        // Holds at the end
        assert_eq!(p.offset_at(5.0), Vec2::new(30.0, -50.0));
    }

    #[test]
    fn test_streak_fades_in_then_out() {
        let mut b = burst(2);
        assert_eq!(b.streak_opacity(1000), 0.0);
        assert!((b.streak_opacity(2500) - 1.0).abs() < 1e-6);

        b.begin_exit(3000);
        assert!((b.streak_opacity(3000) - 1.0).abs() < 1e-6);
        assert!(b.streak_opacity(3750) < 1.0);
        assert!(!b.is_finished(4499));
        assert!(b.is_finished(4500));
        assert_eq!(b.streak_opacity(4500), 0.0);
    }

    #[test]
    fn test_begin_exit_keeps_first_time() {
        let mut b = burst(3);
        b.begin_exit(2000);
        b.begin_exit(2600);
        assert_eq!(b.exit_started_at, Some(2000));
    }

    proptest! {
        #[test]
        fn prop_particles_within_bounds(seed in any::<u64>()) {
            let b = burst(seed);
            prop_assert_eq!(b.particles.len(), BURST_PARTICLES);
            for p in &b.particles {
                prop_assert!((-40.0..=40.0).contains(&p.direction_x));
                prop_assert!((-60.0..=-10.0).contains(&p.direction_y));
                prop_assert!(p.duration_secs >= 0.5 && p.duration_secs <= 2.0);
            }
        }
    }
}
