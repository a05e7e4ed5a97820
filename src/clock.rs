use std::time::Instant;

/// Clamp a raw frame delta into `[0, max_dt]`.
///
/// Non-finite and negative deltas collapse to zero so the simulation never integrates backwards.
pub fn clamp_dt(raw: f32, max_dt: f32) -> f32 {
    if !raw.is_finite() || raw <= 0.0 {
        0.0
    } else {
        raw.min(max_dt)
    }
}

/// Turns frame instants into bounded deltas.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    last: Instant,
    max_dt: f32,
}

impl FrameClock {
    /// Start measuring at `start`. The first delta is taken against this instant.
    pub fn new(start: Instant, max_dt: f32) -> Self {
        Self { last: start, max_dt }
    }

    pub fn tick(&mut self, now: Instant) -> f32 {
        let raw = now.saturating_duration_since(self.last).as_secs_f32();
        if now > self.last {
            self.last = now;
        }
        clamp_dt(raw, self.max_dt)
    }
}
