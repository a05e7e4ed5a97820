use color_eyre::eyre::Result;
use derive_builder::Builder;
use ratatui::{layout::Flex, prelude::*, widgets::*};

use super::{Page, PageId};
use crate::{
    action::{Action, HomeAction},
    constants::{game, TITLE_TEXT},
    storage::{self, JsonFileStore, Leaderboard, ScoreStore},
};

/// Title screen with the best score and the leaderboard.
#[derive(Builder)]
#[builder(pattern = "owned")]
pub struct HomePage {
    store: JsonFileStore,
    #[builder(default)]
    best: u32,
    #[builder(default)]
    leaderboard: Leaderboard,
    #[builder(default = "String::from(\"Press Enter to play\")")]
    prompt: String,
}

impl HomePage {
    pub fn new(store: JsonFileStore) -> Result<Self> {
        let mut page = HomePageBuilder::default().store(store).build()?;
        page.reload();
        Ok(page)
    }

    /// Re-reads scores from disk, which the game page writes on game over.
    pub fn reload(&mut self) {
        let store: &dyn ScoreStore = &self.store;
        self.best = storage::load_u32(store, game::BEST_KEY);
        self.leaderboard =
            Leaderboard::from_scores(storage::load_scores(store, game::SCORES_KEY), game::LEADERBOARD_SIZE);
        tracing::debug!("home page loaded best {} and {} scores", self.best, self.leaderboard.entries().len());
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    fn leaderboard_lines(&self) -> Vec<Line<'_>> {
        if self.leaderboard.is_empty() {
            return vec![Line::from("No scores yet").italic()];
        }
        self.leaderboard
            .entries()
            .iter()
            .enumerate()
            .map(|(index, score)| Line::from(format!("{:>2}. {:>5}", index + 1, score)))
            .collect()
    }
}

impl Page for HomePage {
    fn id(&self) -> PageId {
        PageId::Home
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Home(HomeAction::Start) => return Ok(Some(Action::StartGame)),
            Action::ScoresChanged | Action::ShowHome => self.reload(),
            _ => {},
        }
        Ok(None)
    }

    fn draw(&mut self, f: &mut Frame<'_>, rect: Rect) -> Result<()> {
        f.render_widget(Clear, rect);

        let title_lines: Vec<&str> = TITLE_TEXT.lines().filter(|s| !s.is_empty()).collect();
        let num_title_lines = title_lines.len() as u16;
        let board = self.leaderboard_lines();
        let board_height = board.len() as u16 + 2;

        let [title_area, best_area, board_area, prompt_area] = Layout::vertical([
            Constraint::Length(num_title_lines),
            Constraint::Length(1),
            Constraint::Length(board_height),
            Constraint::Length(1),
        ])
        .flex(Flex::SpaceAround)
        .areas(rect);

        let lines = title_lines.iter().map(|line| Line::from(*line)).collect::<Vec<_>>();
        let title = Paragraph::new(lines).style(Style::default().fg(game::BIRD_COLOR)).alignment(Alignment::Center);
        f.render_widget(title, title_area);

        let best = Line::from(vec!["Best ".into(), self.best.to_string().bold()]).alignment(Alignment::Center);
        f.render_widget(best, best_area);

        let [board_area] = Layout::horizontal([Constraint::Length(20)]).flex(Flex::Center).areas(board_area);
        let board = Paragraph::new(board).alignment(Alignment::Center).block(
            Block::default().borders(Borders::ALL).border_type(BorderType::Rounded).title(" Top scores "),
        );
        f.render_widget(board, board_area);

        let prompt = Line::from(self.prompt.as_str()).style(Style::default().bg(Color::Cyan).fg(Color::Black));
        let [prompt_area] =
            Layout::horizontal([Constraint::Length(self.prompt.len() as u16 + 4)]).flex(Flex::Center).areas(prompt_area);
        f.render_widget(Paragraph::new(prompt).alignment(Alignment::Center), prompt_area);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use pretty_assertions::assert_eq;
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;

    use super::*;

    fn temp_store() -> JsonFileStore {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
        JsonFileStore::in_dir(&std::env::temp_dir().join(format!("skyflap-home-{}-{nanos}", std::process::id())))
    }

    #[test]
    fn test_start_and_reload() -> Result<()> {
        let mut store = temp_store();
        let mut page = HomePage::new(store.clone())?;
        assert_eq!(page.best(), 0);
        assert!(page.leaderboard().is_empty());
        assert_eq!(page.update(Action::Home(HomeAction::Start))?, Some(Action::StartGame));

        store.set(game::BEST_KEY, json!(9))?;
        store.set(game::SCORES_KEY, json!([9, 4]))?;
        page.update(Action::ScoresChanged)?;
        assert_eq!(page.best(), 9);
        assert_eq!(page.leaderboard().entries(), &[9, 4]);

        if let Some(dir) = store.path().parent() {
            std::fs::remove_dir_all(dir)?;
        }
        Ok(())
    }

    #[test]
    fn test_draw_lists_scores() -> Result<()> {
        let mut page = HomePageBuilder::default()
            .store(temp_store())
            .best(12)
            .leaderboard(Leaderboard::from_scores(vec![12, 3], game::LEADERBOARD_SIZE))
            .build()?;
        let mut terminal = Terminal::new(TestBackend::new(62, 38))?;
        terminal.draw(|f| page.draw(f, f.area()).unwrap())?;
        let screen: String = terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect();
        assert!(screen.contains("Top scores"));
        assert!(screen.contains(" 1.    12"));
        assert!(screen.contains("Press Enter to play"));
        Ok(())
    }
}
