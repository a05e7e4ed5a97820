mod game;
mod home;

use serde::Deserialize;
use strum::Display;

pub use crate::action::{game::GameAction, home::HomeAction};

#[derive(Debug, Clone, PartialEq, Display, Deserialize)]
pub enum Action {
    /// Seconds since the previous frame, already clamped.
    Frame(f32),
    Render,
    Resize(u16, u16),
    Suspend,
    Resume,
    Quit,
    FocusLost,
    Error(String),
    ToggleShowHelp,
    StartGame,
    ShowHome,
    ScoresChanged,
    // Page actions
    Home(HomeAction),
    Game(GameAction),
}

impl Action {
    /// Name shown in the help overlay.
    pub fn label(&self) -> String {
        match self {
            Action::Home(action) => action.to_string(),
            Action::Game(action) => action.to_string(),
            action => action.to_string(),
        }
    }
}
