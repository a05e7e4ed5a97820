//! Cosmetic flap bursts. Gameplay never reads them.

use std::f32::consts::FRAC_PI_2;

use rand::Rng;

use crate::constants::game;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    pub alpha: f32,
    pub life: f32,
}

#[derive(Debug)]
pub struct Particles {
    particles: Vec<Particle>,
    next_id: u32,
}

impl Particles {
    pub fn new() -> Self {
        Particles { particles: Vec::new(), next_id: 1 }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Emits a fan of particles spreading upwards from `(x, y)`.
    pub fn burst<R: Rng + ?Sized>(&mut self, x: f32, y: f32, rng: &mut R) {
        for _ in 0..game::PARTICLE_BURST {
            let angle = -FRAC_PI_2 + (rng.gen::<f32>() - 0.5) * 0.9;
            let speed = 70.0 + rng.gen::<f32>() * 90.0;
            self.particles.push(Particle {
                id: self.next_id,
                x,
                y,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                radius: 2.0 + rng.gen::<f32>() * 3.5,
                alpha: 0.9,
                life: 0.4 + rng.gen::<f32>() * 0.25,
            });
            self.next_id += 1;
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.particles.retain_mut(|p| {
            p.life -= dt;
            if p.life <= 0.0 {
                return false;
            }
            p.x += p.vx * dt;
            p.y += p.vy * dt;
            p.vx *= game::PARTICLE_DRAG;
            p.vy += game::PARTICLE_GRAVITY * dt;
            p.alpha = (p.alpha - dt * game::PARTICLE_FADE).max(0.0);
            p.alpha > 0.0
        });
    }

    pub fn reset(&mut self) {
        self.particles.clear();
        self.next_id = 1;
    }
}

impl Default for Particles {
    fn default() -> Self {
        Particles::new()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn test_burst_goes_up() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut particles = Particles::new();
        particles.burst(game::BIRD_X, 300.0, &mut rng);
        assert_eq!(particles.len(), game::PARTICLE_BURST);
        for p in particles.iter() {
            assert!(p.vy < 0.0);
            assert!((2.0..5.5).contains(&p.radius));
            assert!((0.4..0.65).contains(&p.life));
        }
        let ids: Vec<u32> = particles.iter().map(|p| p.id).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_particles_expire() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut particles = Particles::new();
        particles.burst(0.0, 0.0, &mut rng);
        particles.update(0.1);
        assert_eq!(particles.len(), game::PARTICLE_BURST);
        assert!(particles.iter().all(|p| p.alpha < 0.9));
        for _ in 0..40 {
            particles.update(1.0 / 60.0);
        }
        assert!(particles.is_empty());
    }

    #[test]
    fn test_reset_restarts_ids() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut particles = Particles::new();
        particles.burst(0.0, 0.0, &mut rng);
        particles.reset();
        assert!(particles.is_empty());
        particles.burst(0.0, 0.0, &mut rng);
        assert_eq!(particles.iter().next().map(|p| p.id), Some(1));
    }
}
