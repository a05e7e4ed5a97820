use std::{collections::HashMap, path::PathBuf};

use color_eyre::eyre::{eyre, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use derive_deref::{Deref, DerefMut};
use serde::{
    de::{self, Deserializer},
    Deserialize, Serialize,
};

use crate::{
    action::{Action, GameAction, HomeAction},
    constants::game,
    pages::PageId,
};

const CONFIG: &str = include_str!("../.config/config.yaml");

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub config_dir: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub speed_multiplier: f32,
    pub gap_offset: f32,
    pub frame_rate: f64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self { speed_multiplier: 1.0, gap_offset: 0.0, frame_rate: 60.0 }
    }
}

impl GameSettings {
    /// Settings with tuning pulled back into range.
    pub fn sanitized(mut self) -> Self {
        let multiplier = if self.speed_multiplier.is_finite() { self.speed_multiplier } else { 1.0 };
        self.speed_multiplier = multiplier.clamp(game::SPEED_MULTIPLIER_MIN, game::SPEED_MULTIPLIER_MAX);
        let offset = if self.gap_offset.is_finite() { self.gap_offset } else { 0.0 };
        self.gap_offset = offset.clamp(game::GAP_OFFSET_MIN, game::GAP_OFFSET_MAX);
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            self.frame_rate = 60.0;
        }
        self
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    #[serde(default)]
    pub game: GameSettings,
    #[serde(default)]
    pub keybindings: KeyBindings,
}

impl Config {
    pub fn new() -> Result<Self> {
        let default_config = Self::embedded()?;
        let data_dir = crate::utils::get_data_dir();
        let config_dir = crate::utils::get_config_dir();
        let config_file = config_dir.join("config.yaml");

        let builder = config::Config::builder()
            .set_default("data_dir", data_dir.to_string_lossy().to_string())?
            .set_default("config_dir", config_dir.to_string_lossy().to_string())?
            .set_default("game.speed_multiplier", default_config.game.speed_multiplier as f64)?
            .set_default("game.gap_offset", default_config.game.gap_offset as f64)?
            .set_default("game.frame_rate", default_config.game.frame_rate)?
            .add_source(config::File::from(config_file.clone()).format(config::FileFormat::Yaml).required(false))
            .add_source(
                config::Environment::with_prefix(&crate::utils::PROJECT_NAME)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        if !config_file.exists() {
            tracing::debug!("no user config at {config_file:?}, using defaults");
        }

        let mut cfg: Self = builder.build()?.try_deserialize()?;
        cfg.game = cfg.game.sanitized();

        for (page, default_bindings) in default_config.keybindings.pages.iter() {
            let user_bindings = cfg.keybindings.pages.entry(*page).or_default();
            for (key, action) in default_bindings.iter() {
                user_bindings.entry(*key).or_insert_with(|| action.clone());
            }
        }
        for (key, action) in default_config.keybindings.global.iter() {
            cfg.keybindings.global.entry(*key).or_insert_with(|| action.clone());
        }

        Ok(cfg)
    }

    /// The defaults compiled into the binary.
    pub fn embedded() -> Result<Self> {
        serde_yaml::from_str(CONFIG).map_err(|e| eyre!("invalid embedded config: {e}"))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deref, DerefMut)]
pub struct PageKeyBindings(pub HashMap<KeyEvent, Action>);

#[derive(Clone, Debug, Default)]
pub struct KeyBindings {
    pub global: PageKeyBindings,
    pub pages: HashMap<PageId, PageKeyBindings>,
}

impl KeyBindings {
    /// Global bindings win over page bindings.
    pub fn lookup(&self, page: PageId, key: KeyEvent) -> Option<&Action> {
        let key = normalize_key(key);
        self.global.get(&key).or_else(|| self.pages.get(&page).and_then(|bindings| bindings.get(&key)))
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
struct RawKeyBindings {
    #[serde(default)]
    global: HashMap<String, String>,
    #[serde(default)]
    pages: HashMap<String, HashMap<String, String>>,
}

impl<'de> Deserialize<'de> for KeyBindings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawKeyBindings::deserialize(deserializer)?;

        let global = raw
            .global
            .iter()
            .map(|(key, action)| {
                let action: Action = serde_plain::from_str(action).map_err(de::Error::custom)?;
                Ok((parse_key_event(key).map_err(de::Error::custom)?, action))
            })
            .collect::<Result<_, D::Error>>()?;

        let mut pages = HashMap::new();
        for (page, bindings) in raw.pages {
            let page: PageId = serde_plain::from_str(&page).map_err(de::Error::custom)?;
            let bindings = bindings
                .iter()
                .map(|(key, action)| {
                    Ok((parse_key_event(key).map_err(de::Error::custom)?, parse_page_action(page, action)?))
                })
                .collect::<Result<_, D::Error>>()?;
            pages.insert(page, PageKeyBindings(bindings));
        }

        Ok(KeyBindings { global: PageKeyBindings(global), pages })
    }
}

/// Page bindings name a page action, or any global action such as `Quit`.
fn parse_page_action<E: de::Error>(page: PageId, raw: &str) -> Result<Action, E> {
    let page_action = match page {
        PageId::Home => serde_plain::from_str::<HomeAction>(raw).map(Action::Home),
        PageId::Game => serde_plain::from_str::<GameAction>(raw).map(Action::Game),
    };
    page_action
        .or_else(|_| serde_plain::from_str::<Action>(raw))
        .map_err(|_| E::custom(format!("unknown action `{raw}` for page {page}")))
}

/// Drops everything a binding does not care about: release/repeat kinds, lock state and the shift
/// modifier on characters (the character already carries it).
pub fn normalize_key(key: KeyEvent) -> KeyEvent {
    let mut modifiers = key.modifiers;
    if let KeyCode::Char(_) = key.code {
        modifiers.remove(KeyModifiers::SHIFT);
    }
    KeyEvent { code: key.code, modifiers, kind: KeyEventKind::Press, state: KeyEventState::NONE }
}

pub fn parse_key_event(raw: &str) -> Result<KeyEvent, String> {
    if raw.chars().filter(|c| *c == '>').count() != raw.chars().filter(|c| *c == '<').count() {
        return Err(format!("Unable to parse `{}`", raw));
    }
    let raw = raw.strip_prefix('<').unwrap_or(raw);
    let raw = raw.strip_suffix('>').unwrap_or(raw);
    if raw.is_empty() {
        return Err("Empty key binding".to_string());
    }

    let raw_lower = raw.to_ascii_lowercase();
    let (remaining, modifiers) = extract_modifiers(&raw_lower);
    parse_key_code_with_modifiers(remaining, modifiers).map(normalize_key)
}

fn extract_modifiers(raw: &str) -> (&str, KeyModifiers) {
    let mut modifiers = KeyModifiers::empty();
    let mut current = raw;

    loop {
        match current {
            rest if rest.starts_with("ctrl-") => {
                modifiers.insert(KeyModifiers::CONTROL);
                current = &rest[5..];
            },
            rest if rest.starts_with("alt-") => {
                modifiers.insert(KeyModifiers::ALT);
                current = &rest[4..];
            },
            rest if rest.starts_with("shift-") => {
                modifiers.insert(KeyModifiers::SHIFT);
                current = &rest[6..];
            },
            _ => break,
        };
    }

    (current, modifiers)
}

fn parse_key_code_with_modifiers(raw: &str, mut modifiers: KeyModifiers) -> Result<KeyEvent, String> {
    let c = match raw {
        "esc" => KeyCode::Esc,
        "enter" => KeyCode::Enter,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "backtab" => {
            modifiers.insert(KeyModifiers::SHIFT);
            KeyCode::BackTab
        },
        "backspace" => KeyCode::Backspace,
        "delete" => KeyCode::Delete,
        "insert" => KeyCode::Insert,
        "space" => KeyCode::Char(' '),
        "hyphen" | "minus" => KeyCode::Char('-'),
        "plus" => KeyCode::Char('+'),
        "tab" => KeyCode::Tab,
        f if f.len() > 1 && f.starts_with('f') => match f[1..].parse::<u8>() {
            Ok(n) if (1..=12).contains(&n) => KeyCode::F(n),
            _ => return Err(format!("Unable to parse {raw}")),
        },
        c if c.chars().count() == 1 => {
            let mut c = c.chars().next().ok_or_else(|| format!("Unable to parse {raw}"))?;
            if modifiers.contains(KeyModifiers::SHIFT) {
                c = c.to_ascii_uppercase();
            }
            KeyCode::Char(c)
        },
        _ => return Err(format!("Unable to parse {raw}")),
    };
    Ok(KeyEvent::new(c, modifiers))
}

pub fn key_event_to_string(key_event: &KeyEvent) -> String {
    let char;
    let key_code = match key_event.code {
        KeyCode::Backspace => "Backspace",
        KeyCode::Enter => "Enter",
        KeyCode::Left => "Left",
        KeyCode::Right => "Right",
        KeyCode::Up => "Up",
        KeyCode::Down => "Down",
        KeyCode::Home => "Home",
        KeyCode::End => "End",
        KeyCode::PageUp => "PageUp",
        KeyCode::PageDown => "PageDown",
        KeyCode::Tab => "Tab",
        KeyCode::BackTab => "BackTab",
        KeyCode::Delete => "Delete",
        KeyCode::Insert => "Insert",
        KeyCode::F(c) => {
            char = format!("F{c}");
            &char
        },
        KeyCode::Char(' ') => "Space",
        KeyCode::Char(c) => {
            char = c.to_string();
            &char
        },
        KeyCode::Esc => "Esc",
        _ => "",
    };

    let mut modifiers = Vec::with_capacity(3);
    if key_event.modifiers.intersects(KeyModifiers::CONTROL) {
        modifiers.push("Ctrl");
    }
    if key_event.modifiers.intersects(KeyModifiers::SHIFT) {
        modifiers.push("Shift");
    }
    if key_event.modifiers.intersects(KeyModifiers::ALT) {
        modifiers.push("Alt");
    }

    let mut key = modifiers.join("-");
    if !key.is_empty() {
        key.push('-');
    }
    key.push_str(key_code);

    key
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_embedded_config() -> Result<()> {
        let c = Config::embedded()?;
        assert_eq!(c.game, GameSettings::default());
        assert_eq!(
            c.keybindings.lookup(PageId::Game, KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE)),
            Some(&Action::Game(GameAction::Flap))
        );
        assert_eq!(
            c.keybindings.lookup(PageId::Home, KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)),
            Some(&Action::Quit)
        );
        assert_eq!(
            c.keybindings.lookup(PageId::Home, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(&Action::Quit)
        );
        assert_eq!(c.keybindings.lookup(PageId::Home, KeyEvent::new(KeyCode::Char('p'), KeyModifiers::NONE)), None);
        Ok(())
    }

    #[test]
    fn test_shifted_characters_match() -> Result<()> {
        let c = Config::embedded()?;
        // terminals report `?` with shift held
        let key = KeyEvent::new(KeyCode::Char('?'), KeyModifiers::SHIFT);
        assert_eq!(c.keybindings.lookup(PageId::Game, key), Some(&Action::ToggleShowHelp));
        let key = KeyEvent::new_with_kind(KeyCode::Char('+'), KeyModifiers::SHIFT, KeyEventKind::Press);
        assert_eq!(c.keybindings.lookup(PageId::Game, key), Some(&Action::Game(GameAction::GapUp)));
        Ok(())
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let raw = "pages:\n  game:\n    \"<space>\": Jump\n";
        let err = serde_yaml::from_str::<KeyBindings>(raw).unwrap_err();
        assert!(err.to_string().contains("unknown action `Jump`"));
    }

    #[test]
    fn test_sanitized_settings() {
        let settings = GameSettings { speed_multiplier: 3.0, gap_offset: f32::NAN, frame_rate: 0.0 }.sanitized();
        assert_eq!(settings, GameSettings { speed_multiplier: 1.4, gap_offset: 0.0, frame_rate: 60.0 });
    }

    #[test]
    fn test_simple_keys() {
        assert_eq!(parse_key_event("a").unwrap(), KeyEvent::new(KeyCode::Char('a'), KeyModifiers::empty()));
        assert_eq!(parse_key_event("<enter>").unwrap(), KeyEvent::new(KeyCode::Enter, KeyModifiers::empty()));
        assert_eq!(parse_key_event("<->").unwrap(), KeyEvent::new(KeyCode::Char('-'), KeyModifiers::empty()));
        assert_eq!(parse_key_event("<f5>").unwrap(), KeyEvent::new(KeyCode::F(5), KeyModifiers::empty()));
    }

    #[test]
    fn test_with_modifiers() {
        assert_eq!(parse_key_event("ctrl-a").unwrap(), KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL));
        assert_eq!(parse_key_event("alt-enter").unwrap(), KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT));
        assert_eq!(parse_key_event("shift-esc").unwrap(), KeyEvent::new(KeyCode::Esc, KeyModifiers::SHIFT));
        assert_eq!(parse_key_event("shift-a").unwrap(), KeyEvent::new(KeyCode::Char('A'), KeyModifiers::NONE));
        assert_eq!(
            parse_key_event("<CTRL-alt-a>").unwrap(),
            KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL | KeyModifiers::ALT)
        );
    }

    #[test]
    fn test_invalid_keys() {
        assert!(parse_key_event("invalid-key").is_err());
        assert!(parse_key_event("ctrl-invalid-key").is_err());
        assert!(parse_key_event("<a").is_err());
        assert!(parse_key_event("<>").is_err());
        assert!(parse_key_event("f13").is_err());
    }

    #[test]
    fn test_key_event_to_string() {
        insta::assert_snapshot!(
            key_event_to_string(&KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL | KeyModifiers::ALT)),
            @"Ctrl-Alt-a"
        );
        insta::assert_snapshot!(key_event_to_string(&KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE)), @"Space");
        insta::assert_snapshot!(key_event_to_string(&KeyEvent::new(KeyCode::F(2), KeyModifiers::SHIFT)), @"Shift-F2");
    }
}
