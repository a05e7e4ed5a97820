use crate::constants::game;

/// The player-controlled bird. Its horizontal position is fixed at [`game::BIRD_X`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bird {
    pub y: f32,
    pub velocity: f32,
}

impl Bird {
    pub fn new(y: f32) -> Self {
        Bird { y, velocity: 0.0 }
    }

    pub fn x(&self) -> f32 {
        game::BIRD_X
    }

    pub fn radius(&self) -> f32 {
        game::BIRD_R
    }

    /// Velocity first, then position.
    pub fn integrate(&mut self, dt: f32) {
        self.velocity += game::GRAVITY * dt;
        self.y += self.velocity * dt;
    }

    /// The state after `dt`, leaving `self` untouched.
    pub fn integrated(&self, dt: f32) -> Bird {
        let mut next = *self;
        next.integrate(dt);
        next
    }

    /// Overrides the current velocity; repeated flaps never stack.
    pub fn flap(&mut self) {
        self.velocity = game::JUMP_VELOCITY;
    }

    pub fn reset(&mut self) {
        *self = Bird::default();
    }
}

impl Default for Bird {
    fn default() -> Self {
        Bird::new(game::VIEW_H / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_integrate_updates_velocity_before_position() {
        let mut bird = Bird::new(100.0);
        bird.integrate(0.01);
        assert!((bird.velocity - 17.0).abs() < 1e-4);
        // 100 + 17 * 0.01, not 100 + 0 * 0.01
        assert!((bird.y - 100.17).abs() < 1e-4);
    }

    #[test]
    fn test_integrated_does_not_mutate() {
        let bird = Bird::new(200.0);
        let next = bird.integrated(0.016);
        assert_eq!(bird, Bird::new(200.0));
        assert!(next.y > bird.y);
    }

    #[test]
    fn test_flap_spam_does_not_accumulate() {
        let mut bird = Bird::new(300.0);
        bird.velocity = 250.0;
        for _ in 0..5 {
            bird.flap();
        }
        assert_eq!(bird.velocity, game::JUMP_VELOCITY);
    }

    #[test]
    fn test_zero_dt_is_a_no_op() {
        let mut bird = Bird::new(300.0);
        bird.flap();
        bird.integrate(0.0);
        assert_eq!(bird.y, 300.0);
        assert_eq!(bird.velocity, game::JUMP_VELOCITY);
    }

    #[test]
    fn test_reset_centers_bird() {
        let mut bird = Bird::new(12.0);
        bird.flap();
        bird.reset();
        assert_eq!(bird, Bird { y: game::VIEW_H / 2.0, velocity: 0.0 });
    }
}
