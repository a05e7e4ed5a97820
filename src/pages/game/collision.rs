use super::pipes::Pipe;
use crate::constants::game;

/// Axis-aligned rectangle in world coordinates, y pointing down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

pub fn circle_hits_rect(cx: f32, cy: f32, r: f32, rect: &Rect) -> bool {
    let closest_x = cx.max(rect.x).min(rect.right());
    let closest_y = cy.max(rect.y).min(rect.bottom());
    let dx = cx - closest_x;
    let dy = cy - closest_y;
    dx * dx + dy * dy <= r * r
}

/// Ceiling or ground.
pub fn hits_bounds(y: f32, r: f32) -> bool {
    y - r <= 0.0 || y + r >= game::PLAYFIELD_BOTTOM
}

pub fn hits_pipes<'a>(y: f32, r: f32, pipes: impl IntoIterator<Item = &'a Pipe>) -> bool {
    let left = game::BIRD_X - r;
    let right = game::BIRD_X + r;
    pipes.into_iter().filter(|pipe| right >= pipe.x && left <= pipe.right()).any(|pipe| {
        let (top, bottom) = pipe.segments();
        circle_hits_rect(game::BIRD_X, y, r, &top) || circle_hits_rect(game::BIRD_X, y, r, &bottom)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipe(x: f32, gap_center: f32, gap_height: f32) -> Pipe {
        Pipe { id: 1, x, gap_center, gap_height, passed: false }
    }

    #[test]
    fn test_bounds() {
        let r = game::BIRD_R;
        assert!(hits_bounds(r, r));
        assert!(hits_bounds(game::PLAYFIELD_BOTTOM - r, r));
        assert!(!hits_bounds(game::PLAYFIELD_BOTTOM / 2.0, r));
        assert!(!hits_bounds(r + 0.5, r));
        assert!(hits_bounds(-40.0, r));
    }

    #[test]
    fn test_inside_gap_does_not_collide() {
        let pipes = [pipe(100.0, 300.0, 170.0)];
        assert!(!hits_pipes(300.0, 16.0, &pipes));
    }

    #[test]
    fn test_top_segment_collides() {
        let pipes = [pipe(104.0, 300.0, 170.0)];
        assert!(hits_pipes(50.0, 16.0, &pipes));
    }

    #[test]
    fn test_bottom_segment_collides() {
        let pipes = [pipe(104.0, 300.0, 170.0)];
        // gap bottom is at 385
        assert!(hits_pipes(372.0, 16.0, &pipes));
        assert!(!hits_pipes(368.0, 16.0, &pipes));
    }

    #[test]
    fn test_distant_pipe_is_ignored() {
        let pipes = [pipe(300.0, 300.0, 170.0), pipe(-200.0, 300.0, 170.0)];
        assert!(!hits_pipes(50.0, 16.0, &pipes));
    }

    #[test]
    fn test_every_pipe_is_checked() {
        let pipes = [pipe(300.0, 300.0, 170.0), pipe(100.0, 300.0, 170.0)];
        assert!(hits_pipes(50.0, 16.0, &pipes));
    }

    #[test]
    fn test_corner_uses_circle_distance() {
        // The top segment's bottom-left corner is at (130, 215).
        let rect = Rect::new(130.0, 0.0, game::PIPE_W, 215.0);
        // 10 right and 10 below would be inside an axis-aligned box test but is 14.1 away.
        assert!(!circle_hits_rect(120.0, 225.0, 14.0, &rect));
        assert!(circle_hits_rect(120.0, 225.0, 15.0, &rect));
    }
}
