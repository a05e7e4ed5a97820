use std::collections::VecDeque;

use rand::Rng;

use super::collision::Rect;
use crate::constants::game;

#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    pub id: u32,
    /// Leading (left) edge.
    pub x: f32,
    pub gap_center: f32,
    pub gap_height: f32,
    pub passed: bool,
}

impl Pipe {
    pub fn right(&self) -> f32 {
        self.x + game::PIPE_W
    }

    pub fn gap_top(&self) -> f32 {
        self.gap_center - self.gap_height / 2.0
    }

    pub fn gap_bottom(&self) -> f32 {
        self.gap_center + self.gap_height / 2.0
    }

    /// Top and bottom segments. Heights never go negative.
    pub fn segments(&self) -> (Rect, Rect) {
        let top = Rect::new(self.x, 0.0, game::PIPE_W, self.gap_top().max(0.0));
        let bottom_y = self.gap_bottom();
        let bottom = Rect::new(self.x, bottom_y, game::PIPE_W, (game::PLAYFIELD_BOTTOM - bottom_y).max(0.0));
        (top, bottom)
    }
}

/// Seconds between spawns at the given scroll speed.
pub fn spawn_interval(speed: f32) -> f32 {
    (game::SPAWN_EVERY - speed / game::SPAWN_SPEED_DIVISOR).max(game::MIN_SPAWN_INTERVAL)
}

/// Gap center for a uniform sample `u` in `[0, 1)`.
///
/// The result is clamped back into the safe band; when `gap_height` leaves no room the band
/// collapses to its lower limit.
pub fn place_gap(gap_height: f32, u: f32) -> f32 {
    let lo = game::SAFE_MARGIN + gap_height / 2.0;
    let hi = game::PLAYFIELD_BOTTOM - game::SAFE_MARGIN - gap_height / 2.0;
    (lo + u * (hi - lo)).min(hi).max(lo)
}

/// Live obstacles, oldest first.
#[derive(Debug)]
pub struct Pipes {
    pipes: VecDeque<Pipe>,
    spawn_timer: f32,
    next_id: u32,
}

impl Pipes {
    pub fn new() -> Self {
        Pipes { pipes: VecDeque::new(), spawn_timer: 0.0, next_id: 1 }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pipe> {
        self.pipes.iter()
    }

    pub fn len(&self) -> usize {
        self.pipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipes.is_empty()
    }

    pub fn spawn_timer(&self) -> f32 {
        self.spawn_timer
    }

    pub fn reset(&mut self) {
        self.pipes.clear();
        self.spawn_timer = 0.0;
        self.next_id = 1;
    }

    /// Advances every pipe, reports newly passed pipes to `on_pass`, drops the ones that left the
    /// screen and spawns a new pipe when the timer runs out.
    pub fn update<R, F>(&mut self, dt: f32, speed: f32, gap_height: f32, rng: &mut R, mut on_pass: F)
    where
        R: Rng + ?Sized,
        F: FnMut(&Pipe),
    {
        for pipe in self.pipes.iter_mut() {
            pipe.x -= speed * dt;
            if !pipe.passed && pipe.right() < game::BIRD_X {
                pipe.passed = true;
                on_pass(pipe);
            }
        }
        self.pipes.retain(|pipe| pipe.right() >= -game::DESPAWN_MARGIN);

        self.spawn_timer -= dt;
        if self.spawn_timer <= 0.0 {
            self.spawn(gap_height, rng);
            self.spawn_timer = spawn_interval(speed);
        }
    }

    pub fn spawn<R: Rng + ?Sized>(&mut self, gap_height: f32, rng: &mut R) -> &Pipe {
        let gap_height = gap_height.clamp(game::MIN_GAP, game::MAX_GAP);
        let gap_center = place_gap(gap_height, rng.gen::<f32>());
        let pipe = Pipe {
            id: self.next_id,
            x: game::VIEW_W + game::SPAWN_OFFSET,
            gap_center,
            gap_height,
            passed: false,
        };
        self.next_id += 1;
        tracing::trace!("spawned pipe {} at gap {:.1}", pipe.id, pipe.gap_center);
        self.pipes.push_back(pipe);
        &self.pipes[self.pipes.len() - 1]
    }

    #[cfg(test)]
    pub(super) fn push(&mut self, pipe: Pipe) {
        self.pipes.push_back(pipe);
    }
}

impl Default for Pipes {
    fn default() -> Self {
        Pipes::new()
    }
}
