//! World constants. Units are world units (the viewport is `VIEW_W` x `VIEW_H`) and seconds.

use ratatui::style::Color;

pub const VIEW_W: f32 = 420.0;
pub const VIEW_H: f32 = 680.0;
pub const GROUND_H: f32 = 90.0;
/// Top edge of the ground band.
pub const PLAYFIELD_BOTTOM: f32 = VIEW_H - GROUND_H;

pub const BIRD_X: f32 = 120.0;
pub const BIRD_R: f32 = 16.0;

pub const GRAVITY: f32 = 1700.0;
pub const JUMP_VELOCITY: f32 = -520.0;

pub const PIPE_W: f32 = 74.0;
pub const INITIAL_GAP: f32 = 170.0;
pub const MIN_GAP: f32 = 120.0;
pub const MAX_GAP: f32 = 260.0;
pub const GAP_PER_POINT: f32 = 2.2;

pub const INITIAL_SPEED: f32 = 140.0;
pub const MIN_SPEED: f32 = 60.0;
pub const MAX_SPEED: f32 = 220.0;
pub const SPEED_PER_POINT: f32 = 4.5;

pub const SPAWN_EVERY: f32 = 1.5;
pub const MIN_SPAWN_INTERVAL: f32 = 0.9;
pub const SPAWN_SPEED_DIVISOR: f32 = 400.0;
/// Pipes enter this far to the right of the viewport.
pub const SPAWN_OFFSET: f32 = 40.0;
/// Pipes are dropped once their trailing edge is this far left of the viewport.
pub const DESPAWN_MARGIN: f32 = 20.0;
/// Distance kept between a gap and the sky or the ground.
pub const SAFE_MARGIN: f32 = 80.0;

pub const MAX_DT: f32 = 0.032;

pub const SPEED_MULTIPLIER_MIN: f32 = 0.7;
pub const SPEED_MULTIPLIER_MAX: f32 = 1.4;
pub const SPEED_MULTIPLIER_STEP: f32 = 0.05;
pub const GAP_OFFSET_MIN: f32 = -80.0;
pub const GAP_OFFSET_MAX: f32 = 80.0;
pub const GAP_OFFSET_STEP: f32 = 5.0;

pub const LEADERBOARD_SIZE: usize = 10;
pub const BEST_KEY: &str = "flappy_best";
pub const SCORES_KEY: &str = "flappy_scores";

pub const PARTICLE_BURST: usize = 10;
pub const PARTICLE_GRAVITY: f32 = 400.0;
pub const PARTICLE_DRAG: f32 = 0.98;
pub const PARTICLE_FADE: f32 = 2.2;

pub const SKY_COLOR: Color = Color::Rgb(219, 234, 254);
pub const CLOUD_COLOR: Color = Color::White;
pub const GROUND_COLOR: Color = Color::Rgb(245, 158, 11);
pub const PIPE_COLOR: Color = Color::LightGreen;
pub const BIRD_COLOR: Color = Color::Yellow;
pub const DEAD_BIRD_COLOR: Color = Color::Red;
pub const PARTICLE_COLOR: Color = Color::LightYellow;
