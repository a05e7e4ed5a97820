use ratatui::{
    style::Color,
    widgets::canvas::{Painter, Shape},
};

use crate::constants::game;

/// A cloud as `(left, top, width, height)` in world units.
type Cloud = (f32, f32, f32, f32);

const FAR_CLOUDS: [Cloud; 3] = [(10.0, 40.0, 100.0, 40.0), (280.0, 120.0, 120.0, 48.0), (160.0, 220.0, 90.0, 36.0)];
const NEAR_CLOUDS: [Cloud; 2] = [(200.0, 80.0, 140.0, 56.0), (40.0, 180.0, 110.0, 44.0)];

const FAR_FACTOR: f32 = 0.3;
const NEAR_FACTOR: f32 = 0.6;

/// Sampling step when filling clouds, roughly one braille dot.
const STEP: f32 = 3.0;

/// Two cloud layers drifting slower than the pipes.
///
/// Expects a canvas with `x_bounds = [0, VIEW_W]` and `y_bounds = [0, VIEW_H]`, world y flipped.
#[derive(Debug, Clone)]
pub struct Parallax {
    pub world_x: f32,
    pub far_color: Color,
    pub near_color: Color,
}

impl Parallax {
    pub fn new(world_x: f32) -> Self {
        Self { world_x, far_color: Color::Gray, near_color: game::CLOUD_COLOR }
    }

    /// Left edge of a cloud after scrolling, wrapped so it re-enters from the right.
    pub fn scrolled_left(left: f32, width: f32, world_x: f32, factor: f32) -> f32 {
        let span = game::VIEW_W + width;
        (left - world_x * factor + width).rem_euclid(span) - width
    }

    fn paint_cloud(painter: &mut Painter, cloud: &Cloud, left: f32, color: Color) {
        let (_, top, width, height) = *cloud;
        let (rx, ry) = (width / 2.0, height / 2.0);
        let (cx, cy) = (left + rx, top + ry);

        let mut y = top;
        while y <= top + height {
            let mut x = left;
            while x <= left + width {
                let (dx, dy) = ((x - cx) / rx, (y - cy) / ry);
                if dx * dx + dy * dy <= 1.0 {
                    if let Some((px, py)) = painter.get_point(x as f64, (game::VIEW_H - y) as f64) {
                        painter.paint(px, py, color);
                    }
                }
                x += STEP;
            }
            y += STEP;
        }
    }
}

impl Shape for Parallax {
    fn draw(&self, painter: &mut Painter) {
        for cloud in FAR_CLOUDS.iter() {
            let left = Self::scrolled_left(cloud.0, cloud.2, self.world_x, FAR_FACTOR);
            Self::paint_cloud(painter, cloud, left, self.far_color);
        }
        for cloud in NEAR_CLOUDS.iter() {
            let left = Self::scrolled_left(cloud.0, cloud.2, self.world_x, NEAR_FACTOR);
            Self::paint_cloud(painter, cloud, left, self.near_color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_speeds() {
        assert_eq!(Parallax::scrolled_left(200.0, 140.0, 0.0, NEAR_FACTOR), 200.0);
        assert!((Parallax::scrolled_left(200.0, 140.0, 100.0, NEAR_FACTOR) - 140.0).abs() < 1e-4);
        assert!((Parallax::scrolled_left(200.0, 100.0, 100.0, FAR_FACTOR) - 170.0).abs() < 1e-4);
    }

    #[test]
    fn test_clouds_wrap_around() {
        // fully off the left edge comes back in from the right
        let left = Parallax::scrolled_left(10.0, 100.0, 500.0, 0.3);
        assert!(left > 0.0 && left <= game::VIEW_W);
        for world_x in [0.0, 123.0, 4567.0, 1.0e5] {
            let left = Parallax::scrolled_left(40.0, 110.0, world_x, NEAR_FACTOR);
            assert!(left >= -110.0 && left < game::VIEW_W);
        }
    }
}
