use serde::Deserialize;
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Deserialize)]
pub enum GameAction {
    Flap,
    PauseToggle,
    Reset,
    TogglePanel,
    SpeedUp,
    SpeedDown,
    GapUp,
    GapDown,
    Leave,
}
