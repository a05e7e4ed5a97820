use serde::{Deserialize, Serialize};

use crate::constants::game;

/// User tuning applied on top of the score-driven difficulty curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    speed_multiplier: f32,
    gap_offset: f32,
}

impl Difficulty {
    pub fn new(speed_multiplier: f32, gap_offset: f32) -> Self {
        let mut difficulty = Difficulty::default();
        difficulty.set_speed_multiplier(speed_multiplier);
        difficulty.set_gap_offset(gap_offset);
        difficulty
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    pub fn gap_offset(&self) -> f32 {
        self.gap_offset
    }

    pub fn set_speed_multiplier(&mut self, value: f32) {
        let value = if value.is_finite() { value } else { 1.0 };
        self.speed_multiplier = value.clamp(game::SPEED_MULTIPLIER_MIN, game::SPEED_MULTIPLIER_MAX);
    }

    pub fn set_gap_offset(&mut self, value: f32) {
        let value = if value.is_finite() { value } else { 0.0 };
        self.gap_offset = value.clamp(game::GAP_OFFSET_MIN, game::GAP_OFFSET_MAX);
    }

    /// Scroll speed in world units per second.
    pub fn speed(&self, score: u32) -> f32 {
        let base = (game::INITIAL_SPEED + score as f32 * game::SPEED_PER_POINT)
            .clamp(game::MIN_SPEED, game::MAX_SPEED);
        (base * self.speed_multiplier).clamp(game::MIN_SPEED, game::MAX_SPEED)
    }

    pub fn gap_height(&self, score: u32) -> f32 {
        (game::INITIAL_GAP - score as f32 * game::GAP_PER_POINT + self.gap_offset)
            .clamp(game::MIN_GAP, game::MAX_GAP)
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty { speed_multiplier: 1.0, gap_offset: 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_defaults_at_zero() {
        let difficulty = Difficulty::default();
        assert_eq!(difficulty.speed(0), game::INITIAL_SPEED);
        assert_eq!(difficulty.gap_height(0), game::INITIAL_GAP);
    }

    #[test]
    fn test_score_twenty() {
        let difficulty = Difficulty::default();
        assert_eq!(difficulty.speed(20), game::MAX_SPEED);
        assert!((difficulty.gap_height(20) - 126.0).abs() < 1e-3);
    }

    #[test]
    fn test_monotonic_and_bounded() {
        for (multiplier, offset) in [(1.0, 0.0), (0.7, 80.0), (1.4, -80.0), (0.85, 12.0)] {
            let difficulty = Difficulty::new(multiplier, offset);
            let mut previous = (difficulty.speed(0), difficulty.gap_height(0));
            for score in 1..500 {
                let speed = difficulty.speed(score);
                let gap = difficulty.gap_height(score);
                assert!(speed >= previous.0, "speed dropped at score {score}");
                assert!(gap <= previous.1, "gap grew at score {score}");
                assert!((game::MIN_SPEED..=game::MAX_SPEED).contains(&speed));
                assert!((game::MIN_GAP..=game::MAX_GAP).contains(&gap));
                previous = (speed, gap);
            }
        }
    }

    #[test]
    fn test_tuning_is_clamped() {
        let difficulty = Difficulty::new(3.0, -500.0);
        assert_eq!(difficulty.speed_multiplier(), game::SPEED_MULTIPLIER_MAX);
        assert_eq!(difficulty.gap_offset(), game::GAP_OFFSET_MIN);
        assert_eq!(difficulty.gap_height(0), game::MIN_GAP);

        let difficulty = Difficulty::new(f32::NAN, f32::NAN);
        assert_eq!(difficulty, Difficulty::default());
    }

    #[test]
    fn test_slow_multiplier() {
        let difficulty = Difficulty::new(0.7, 0.0);
        assert!((difficulty.speed(0) - 98.0).abs() < 1e-3);
    }
}
