//! The game session: one owned struct holding every piece of per-frame state.
//!
//! Lifecycle: `Ready -> Running <-> Paused`, `Running -> GameOver`, and `reset` from anywhere back
//! to `Ready`. Physics only advances while `Running`.

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use serde_json::json;
use strum::Display;
use tracing::{debug, info, warn};

use super::{
    bird::Bird,
    collision,
    difficulty::Difficulty,
    particles::Particles,
    pipes::{Pipe, Pipes},
};
use crate::{
    clock::clamp_dt,
    constants::game,
    storage::{self, Leaderboard, ScoreStore},
};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Display, Serialize)]
pub enum Phase {
    #[default]
    Ready,
    Running,
    Paused,
    GameOver,
}

/// Read-only view handed to the renderer once per frame.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub phase: Phase,
    pub score: u32,
    pub best: u32,
    pub bird: &'a Bird,
    pub pipes: &'a Pipes,
    pub particles: &'a Particles,
    pub world_x: f32,
    pub difficulty: &'a Difficulty,
    pub panel_open: bool,
    pub leaderboard: &'a Leaderboard,
}

pub struct Session<R = StdRng> {
    phase: Phase,
    score: u32,
    best: u32,
    bird: Bird,
    pipes: Pipes,
    particles: Particles,
    world_x: f32,
    difficulty: Difficulty,
    panel_open: bool,
    leaderboard: Leaderboard,
    store: Box<dyn ScoreStore>,
    rng: R,
}

impl Session<StdRng> {
    pub fn from_seed(seed: Option<u64>, store: Box<dyn ScoreStore>, difficulty: Difficulty) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Session::new(rng, store, difficulty)
    }
}

impl<R: Rng> Session<R> {
    /// Creates a session in `Ready`, loading the best score and leaderboard from `store`.
    pub fn new(rng: R, store: Box<dyn ScoreStore>, difficulty: Difficulty) -> Self {
        let leaderboard =
            Leaderboard::from_scores(storage::load_scores(store.as_ref(), game::SCORES_KEY), game::LEADERBOARD_SIZE);
        let best = storage::load_u32(store.as_ref(), game::BEST_KEY);
        debug!("session loaded best score {best}");
        Session {
            phase: Phase::Ready,
            score: 0,
            best,
            bird: Bird::default(),
            pipes: Pipes::new(),
            particles: Particles::new(),
            world_x: 0.0,
            difficulty,
            panel_open: false,
            leaderboard,
            store,
            rng,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn bird(&self) -> &Bird {
        &self.bird
    }

    pub fn pipes(&self) -> &Pipes {
        &self.pipes
    }

    pub fn difficulty(&self) -> &Difficulty {
        &self.difficulty
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn store(&self) -> &dyn ScoreStore {
        self.store.as_ref()
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            phase: self.phase,
            score: self.score,
            best: self.best,
            bird: &self.bird,
            pipes: &self.pipes,
            particles: &self.particles,
            world_x: self.world_x,
            difficulty: &self.difficulty,
            panel_open: self.panel_open,
            leaderboard: &self.leaderboard,
        }
    }

    /// Starts the session from `Ready`, or flaps while `Running`.
    pub fn flap(&mut self) {
        match self.phase {
            Phase::Ready => {
                self.phase = Phase::Running;
                info!("session started");
            },
            Phase::Running => {
                self.bird.flap();
                self.particles.burst(self.bird.x(), self.bird.y, &mut self.rng);
            },
            Phase::Paused | Phase::GameOver => {},
        }
    }

    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            Phase::Running => Phase::Paused,
            Phase::Paused => Phase::Running,
            phase => phase,
        };
    }

    /// The terminal lost focus or the app is being suspended. Never resumes by itself.
    pub fn focus_lost(&mut self) {
        if self.phase == Phase::Running {
            debug!("pausing on focus loss");
            self.phase = Phase::Paused;
        }
    }

    pub fn reset(&mut self) {
        self.phase = Phase::Ready;
        self.score = 0;
        self.bird.reset();
        self.pipes.reset();
        self.particles.reset();
        self.world_x = 0.0;
    }

    pub fn toggle_panel(&mut self) {
        self.panel_open = !self.panel_open;
    }

    pub fn panel_open(&self) -> bool {
        self.panel_open
    }

    pub fn set_speed_multiplier(&mut self, value: f32) {
        self.difficulty.set_speed_multiplier(value);
    }

    pub fn set_gap_offset(&mut self, value: f32) {
        self.difficulty.set_gap_offset(value);
    }

    pub fn nudge_speed_multiplier(&mut self, steps: i32) {
        let value = self.difficulty.speed_multiplier() + steps as f32 * game::SPEED_MULTIPLIER_STEP;
        self.set_speed_multiplier(value);
    }

    pub fn nudge_gap_offset(&mut self, steps: i32) {
        let value = self.difficulty.gap_offset() + steps as f32 * game::GAP_OFFSET_STEP;
        self.set_gap_offset(value);
    }

    /// Advances the simulation by one frame.
    ///
    /// The bird's next position is tested before it is committed, so a frame that ends inside a
    /// pipe is never shown as alive.
    pub fn update(&mut self, dt: f32) {
        if self.phase != Phase::Running {
            return;
        }
        let dt = clamp_dt(dt, game::MAX_DT);
        let speed = self.difficulty.speed(self.score);
        let gap_height = self.difficulty.gap_height(self.score);

        let next = self.bird.integrated(dt);

        self.world_x += speed * dt;
        self.particles.update(dt);

        let mut passed = 0;
        self.pipes.update(dt, speed, gap_height, &mut self.rng, |pipe: &Pipe| {
            debug!("passed pipe {}", pipe.id);
            passed += 1;
        });

        if collision::hits_bounds(next.y, next.radius())
            || collision::hits_pipes(next.y, next.radius(), self.pipes.iter())
        {
            self.game_over();
            return;
        }
        // a pipe passed in the crash frame does not count
        self.score += passed;
        self.bird = next;
    }

    fn game_over(&mut self) {
        self.phase = Phase::GameOver;
        self.best = self.best.max(self.score);
        self.leaderboard.push(self.score);
        info!("game over with score {} (best {})", self.score, self.best);

        if let Err(e) = self.store.set(game::BEST_KEY, json!(self.best)) {
            warn!("failed to save best score: {e:#}");
        }
        if let Err(e) = self.store.set(game::SCORES_KEY, json!(self.leaderboard.entries())) {
            warn!("failed to save leaderboard: {e:#}");
        }
    }
}
