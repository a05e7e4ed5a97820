pub mod game;

/// Terminal cells reserved for the whole application frame.
pub const WIDTH: u16 = 64;
pub const HEIGHT: u16 = 40;

/// Terminal cells used by the playfield canvas (border included).
pub const PLAYFIELD_WIDTH: u16 = 44;
pub const PLAYFIELD_HEIGHT: u16 = 36;

pub const TITLE_TEXT: &str = r#"
 ____  _           __ _
/ ___|| | ___   _ / _| | __ _ _ __
\___ \| |/ / | | | |_| |/ _` | '_ \
 ___) |   <| |_| |  _| | (_| | |_) |
|____/|_|\_\\__, |_| |_|\__,_| .__/
            |___/            |_|
"#;
