use clap::Parser;

use crate::utils::version;

#[derive(Parser, Debug, Default)]
#[command(author, version = version(), about)]
pub struct Cli {
    /// Frames per second; overrides `game.frame_rate` from the config
    #[arg(short, long, value_name = "FLOAT")]
    pub frame_rate: Option<f64>,

    /// Seed for pipe placement, for reproducible runs
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Scroll speed multiplier, 0.7 to 1.4
    #[arg(long, value_name = "FLOAT")]
    pub speed_multiplier: Option<f32>,

    /// Extra gap height in world units, -80 to 80
    #[arg(long, value_name = "FLOAT", allow_hyphen_values = true)]
    pub gap_offset: Option<f32>,
}

impl Cli {
    /// Command-line values win over the config file.
    pub fn apply(&self, settings: &mut crate::config::GameSettings) {
        if let Some(frame_rate) = self.frame_rate {
            settings.frame_rate = frame_rate;
        }
        if let Some(multiplier) = self.speed_multiplier {
            settings.speed_multiplier = multiplier;
        }
        if let Some(offset) = self.gap_offset {
            settings.gap_offset = offset;
        }
    }
}
