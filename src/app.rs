use color_eyre::eyre::Result;
use ratatui::{
    layout::{Constraint, Layout, Margin},
    prelude::Rect,
    style::{Color, Style},
    widgets::{Block, BorderType, Borders},
    Frame,
};
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::{
    action::Action,
    components::help::Help,
    config::Config,
    constants::{game::MAX_DT, HEIGHT, WIDTH},
    pages::{
        game::{difficulty::Difficulty, session::Session, GamePage},
        home::HomePage,
        Page, PageId,
    },
    storage::JsonFileStore,
    tui::{self, Event},
};

pub struct App {
    config: Config,
    frame_rate: f64,
    should_quit: bool,
    should_suspend: bool,
    show_help: bool,
    pages: Vec<Box<dyn Page>>,
    active_page: PageId,
}

impl App {
    pub fn new(config: Config, seed: Option<u64>) -> Result<Self> {
        let store = JsonFileStore::in_dir(&config.config.data_dir);
        tracing::info!("scores stored in {:?}", store.path());

        let difficulty = Difficulty::new(config.game.speed_multiplier, config.game.gap_offset);
        let session = Session::from_seed(seed, Box::new(store.clone()), difficulty);
        let home_page = HomePage::new(store)?;
        let game_page = GamePage::new(session);

        Ok(Self {
            frame_rate: config.game.frame_rate,
            config,
            should_quit: false,
            should_suspend: false,
            show_help: false,
            pages: vec![Box::new(home_page), Box::new(game_page)],
            active_page: PageId::Home,
        })
    }

    fn get_page(&mut self, id: PageId) -> Option<&mut Box<dyn Page>> {
        self.pages.iter_mut().find(|page| page.id() == id)
    }

    fn set_active_page(&mut self, id: PageId) {
        if self.active_page != id {
            tracing::debug!("switching to {id} page");
            self.active_page = id;
        }
    }

    /// Turns a terminal event into the action it stands for, if any.
    fn map_event(&self, event: &Event) -> Option<Action> {
        match event {
            Event::Frame(dt) => Some(Action::Frame(*dt)),
            Event::Resize(w, h) => Some(Action::Resize(*w, *h)),
            Event::FocusLost => Some(Action::FocusLost),
            Event::Error => Some(Action::Error("terminal input failed".to_string())),
            Event::Key(key) => {
                let action = self.config.keybindings.lookup(self.active_page, *key).cloned();
                if let Some(action) = &action {
                    tracing::debug!("key {key:?} -> {action}");
                }
                action
            },
            // a paused game waits for the player, even after focus comes back
            Event::FocusGained => None,
            Event::Init => None,
        }
    }

    /// Updates app-level state and routes the action to the pages. Returns the follow-up actions.
    fn update(&mut self, action: &Action) -> Result<Vec<Action>> {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Suspend => self.should_suspend = true,
            Action::Resume => self.should_suspend = false,
            Action::ToggleShowHelp => self.show_help = !self.show_help,
            Action::StartGame => self.set_active_page(PageId::Game),
            Action::ShowHome => self.set_active_page(PageId::Home),
            Action::Error(message) => tracing::error!("{message}"),
            _ => {},
        }

        let mut follow_ups = Vec::new();
        match action {
            Action::ScoresChanged | Action::Suspend | Action::FocusLost | Action::StartGame | Action::ShowHome => {
                for page in self.pages.iter_mut() {
                    follow_ups.extend(page.update(action.clone())?);
                }
            },
            Action::ToggleShowHelp if self.show_help => {
                for page in self.pages.iter_mut() {
                    follow_ups.extend(page.update(Action::FocusLost)?);
                }
            },
            Action::Frame(_) | Action::Home(_) | Action::Game(_) if !self.show_help => {
                let active_page = self.active_page;
                if let Some(page) = self.get_page(active_page) {
                    follow_ups.extend(page.update(action.clone())?);
                }
            },
            _ => {},
        }
        Ok(follow_ups)
    }

    pub async fn run(&mut self) -> Result<()> {
        let (action_tx, mut action_rx) = mpsc::unbounded_channel();

        let mut tui = tui::Tui::new(self.frame_rate, MAX_DT)?;
        tui.enter()?;

        loop {
            if let Some(event) = tui.next().await {
                if let Some(action) = self.map_event(&event) {
                    let is_frame = matches!(action, Action::Frame(_));
                    action_tx.send(action)?;
                    if is_frame {
                        action_tx.send(Action::Render)?;
                    }
                }
            }

            while let Ok(action) = action_rx.try_recv() {
                if !matches!(action, Action::Frame(_) | Action::Render) {
                    tracing::debug!("{action:?}");
                }
                match &action {
                    Action::Resize(w, h) => {
                        tui.resize(Rect::new(0, 0, *w, *h))?;
                        self.render(&mut tui, &action_tx)?;
                    },
                    Action::Render => self.render(&mut tui, &action_tx)?,
                    _ => {},
                }
                for follow_up in self.update(&action)? {
                    action_tx.send(follow_up)?;
                }
            }

            if self.should_suspend {
                tui.suspend()?;
                action_tx.send(Action::Resume)?;
                tui.resume()?;
            } else if self.should_quit {
                tui.pump.stop().await;
                break;
            }
        }
        tui.exit()?;
        Ok(())
    }

    fn render(&mut self, tui: &mut tui::Tui, action_tx: &UnboundedSender<Action>) -> Result<()> {
        tui.draw(|f| {
            if let Err(e) = self.draw(f) {
                if let Err(e) = action_tx.send(Action::Error(format!("Failed to draw: {e:?}"))) {
                    tracing::error!("{e}");
                }
            }
        })?;
        Ok(())
    }

    fn draw(&mut self, f: &mut Frame<'_>) -> Result<()> {
        let area = f.area();

        let [_, area, _] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(HEIGHT), Constraint::Fill(1)]).areas(area);
        let [_, area, _] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(WIDTH), Constraint::Fill(1)]).areas(area);

        let border = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(" skyflap ")
            .style(Style::default().bg(Color::Black));
        f.render_widget(border, area);

        let area = area.inner(Margin { horizontal: 1, vertical: 1 });

        let active_page = self.active_page;
        if let Some(page) = self.get_page(active_page) {
            page.draw(f, area)?;
        }

        if self.show_help {
            let mut groups = vec![("System".to_string(), &self.config.keybindings.global)];
            if let Some(bindings) = self.config.keybindings.pages.get(&self.active_page) {
                groups.push((self.active_page.to_string(), bindings));
            }
            f.render_widget(Help::new(groups), area);
        }

        Ok(())
    }
}
