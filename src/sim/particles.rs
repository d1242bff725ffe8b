//! Fixed-capacity particle pool
//!
//! Particles are never allocated or freed after construction. Dead slots
//! (life <= 0) are recycled in place by the next spawn.

use glam::{Vec3, Vec4};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::{PARTICLE_FADE_RATE, PARTICLE_LIFE, PARTICLE_SPEED_FACTOR};
use crate::sim::bodies::VisualKind;

/// Color family of a spawned particle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleTint {
    /// Green, emitted by balls
    Green,
    /// White/gray, emitted by pins
    Gray,
}

impl From<VisualKind> for ParticleTint {
    fn from(kind: VisualKind) -> Self {
        match kind {
            VisualKind::Ball => ParticleTint::Green,
            VisualKind::Pin | VisualKind::Plane => ParticleTint::Gray,
        }
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec3,
    pub vel: Vec3,
    pub color: Vec4,
    /// Seconds left; <= 0 means inert
    pub life: f32,
}

impl Particle {
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Fixed-size particle pool with a reuse cursor
#[derive(Debug, Clone)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    /// Slot handed out by the previous spawn; search starts here
    last_used: usize,
    rng: Pcg32,
}

impl ParticlePool {
    /// Create a pool of `capacity` inert particles (at least one slot)
    pub fn new(capacity: usize, seed: u64) -> Self {
        Self {
            particles: vec![Particle::default(); capacity.max(1)],
            last_used: 0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn last_used(&self) -> usize {
        self.last_used
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Find a slot to reuse: first dead particle from the cursor onward, then
    /// from the start. When every particle is alive, slot 0 is overwritten.
    pub fn first_unused(&mut self) -> usize {
        let start = self.last_used.min(self.particles.len());
        let found = (start..self.particles.len())
            .chain(0..start)
            .find(|&i| !self.particles[i].is_alive());

        self.last_used = found.unwrap_or(0);
        self.last_used
    }

    /// Emit a particle from a source body
    pub fn spawn(&mut self, source_pos: Vec3, source_vel: Vec3, tint: ParticleTint) -> usize {
        let slot = self.first_unused();
        let brightness: f32 = self.rng.random_range(0.5..1.5);
        let color = match tint {
            ParticleTint::Green => Vec4::new(0.0, brightness, 0.0, 1.0),
            ParticleTint::Gray => Vec4::new(brightness, brightness, brightness, 1.0),
        };

        self.particles[slot] = Particle {
            pos: source_pos,
            vel: source_vel * PARTICLE_SPEED_FACTOR,
            color,
            life: PARTICLE_LIFE,
        };
        slot
    }

    /// Age every particle. Live ones drift back along their velocity and fade.
    pub fn tick(&mut self, dt: f32) {
        for p in self.particles.iter_mut() {
            p.life -= dt;
            if p.is_alive() {
                p.pos -= p.vel * dt;
                p.color.w -= dt * PARTICLE_FADE_RATE;
            }
        }
    }

    /// Particles that should be drawn
    pub fn live_particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.is_alive())
    }

    pub fn live_count(&self) -> usize {
        self.live_particles().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_pool_is_inert() {
        let pool = ParticlePool::new(8, 1);
        assert_eq!(pool.capacity(), 8);
        assert_eq!(pool.live_count(), 0);
    }

    #[test]
    fn test_spawn_sets_life_speed_and_color() {
        let mut pool = ParticlePool::new(4, 7);
        let slot = pool.spawn(Vec3::new(1.0, 2.0, 3.0), Vec3::new(10.0, 0.0, -5.0), ParticleTint::Green);
        let p = pool.particles()[slot];
        assert_eq!(p.life, PARTICLE_LIFE);
        assert_eq!(p.pos, Vec3::new(1.0, 2.0, 3.0));
        assert!((p.vel - Vec3::new(1.0, 0.0, -0.5)).length() < 1e-6);
        assert_eq!(p.color.x, 0.0);
        assert_eq!(p.color.z, 0.0);
        assert!((0.5..1.5).contains(&p.color.y));
        assert_eq!(p.color.w, 1.0);
    }

    #[test]
    fn test_gray_tint_is_uniform() {
        let mut pool = ParticlePool::new(2, 3);
        let slot = pool.spawn(Vec3::ZERO, Vec3::ZERO, ParticleTint::Gray);
        let c = pool.particles()[slot].color;
        assert_eq!(c.x, c.y);
        assert_eq!(c.y, c.z);
        assert!((0.5..1.5).contains(&c.x));
    }

    #[test]
    fn test_spawn_walks_forward_from_cursor() {
        let mut pool = ParticlePool::new(4, 0);
        assert_eq!(pool.spawn(Vec3::ZERO, Vec3::ZERO, ParticleTint::Gray), 0);
        assert_eq!(pool.spawn(Vec3::ZERO, Vec3::ZERO, ParticleTint::Gray), 1);
        assert_eq!(pool.spawn(Vec3::ZERO, Vec3::ZERO, ParticleTint::Gray), 2);
        assert_eq!(pool.last_used(), 2);
    }

    #[test]
    fn test_spawn_wraps_to_front() {
        let mut pool = ParticlePool::new(3, 0);
        for _ in 0..3 {
            pool.spawn(Vec3::ZERO, Vec3::ZERO, ParticleTint::Gray);
        }
        // Kill slot 0 only; cursor is at 2
        pool.particles[0].life = 0.0;
        assert_eq!(pool.spawn(Vec3::ZERO, Vec3::ZERO, ParticleTint::Gray), 0);
    }

    #[test]
    fn test_full_pool_recycles_slot_zero() {
        let mut pool = ParticlePool::new(3, 0);
        for _ in 0..3 {
            pool.spawn(Vec3::ZERO, Vec3::ZERO, ParticleTint::Gray);
        }
        assert_eq!(pool.live_count(), 3);
        assert_eq!(pool.spawn(Vec3::ONE, Vec3::ZERO, ParticleTint::Green), 0);
        assert_eq!(pool.last_used(), 0);
        assert_eq!(pool.particles()[0].pos, Vec3::ONE);
    }

    #[test]
    fn test_tick_moves_against_velocity_and_fades() {
        let mut pool = ParticlePool::new(1, 0);
        pool.spawn(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), ParticleTint::Gray);
        pool.tick(0.1);
        let p = pool.particles()[0];
        assert!((p.life - 0.9).abs() < 1e-6);
        assert!((p.pos.x - (-0.1)).abs() < 1e-6);
        assert!((p.color.w - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_particle_dies_after_lifetime() {
        let mut pool = ParticlePool::new(1, 0);
        pool.spawn(Vec3::ZERO, Vec3::ONE, ParticleTint::Gray);
        pool.tick(0.6);
        pool.tick(0.6);
        assert_eq!(pool.live_count(), 0);
        let frozen = pool.particles()[0].pos;
        pool.tick(0.6);
        assert_eq!(pool.particles()[0].pos, frozen);
    }

    fn op_strategy() -> impl Strategy<Value = Option<f32>> {
        // None = spawn, Some(dt) = tick
        prop_oneof![Just(None), (0.0f32..0.5).prop_map(Some)]
    }

    proptest! {
        #[test]
        fn prop_spawn_slot_in_range(capacity in 1usize..32, ops in prop::collection::vec(op_strategy(), 0..200)) {
            let mut pool = ParticlePool::new(capacity, 42);
            for op in ops {
                match op {
                    None => {
                        let slot = pool.spawn(Vec3::ZERO, Vec3::ONE, ParticleTint::Green);
                        prop_assert!(slot < capacity);
                    }
                    Some(dt) => pool.tick(dt),
                }
                prop_assert_eq!(pool.capacity(), capacity);
            }
        }

        #[test]
        fn prop_dead_particles_stay_dead(capacity in 1usize..16, spawns in 0usize..16, dts in prop::collection::vec(0.0f32..0.5, 1..20)) {
            let mut pool = ParticlePool::new(capacity, 9);
            for _ in 0..spawns {
                pool.spawn(Vec3::ZERO, Vec3::ONE, ParticleTint::Gray);
            }
            for dt in dts {
                let dead: Vec<usize> = (0..capacity).filter(|&i| !pool.particles()[i].is_alive()).collect();
                pool.tick(dt);
                for i in dead {
                    prop_assert!(!pool.particles()[i].is_alive());
                }
            }
        }
    }
}
