pub mod bird;
pub mod collision;
pub mod difficulty;
pub mod particles;
pub mod pipes;
pub mod session;

use color_eyre::eyre::Result;
use ratatui::{
    layout::Flex,
    prelude::*,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Circle, Context, Line as CanvasLine, Points},
        Block, BorderType, Borders, Padding, Paragraph,
    },
};

use self::{
    collision::Rect as WorldRect,
    session::{Phase, Session, Snapshot},
};
use super::{Page, PageId};
use crate::{
    action::{Action, GameAction},
    components::parallax::Parallax,
    constants::{game, PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH},
};

/// World units between fill strokes, about one braille dot column.
const FILL_STEP: f32 = game::VIEW_W / (PLAYFIELD_WIDTH as f32 * 2.0);
const GROUND_STRIPE: f32 = 28.0;

pub struct GamePage {
    session: Session,
}

impl GamePage {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn handle_game_action(&mut self, action: GameAction) -> Option<Action> {
        let panel_open = self.session.panel_open();
        match action {
            GameAction::Flap => self.session.flap(),
            GameAction::PauseToggle => self.session.toggle_pause(),
            GameAction::Reset => self.session.reset(),
            GameAction::TogglePanel => self.session.toggle_panel(),
            GameAction::SpeedUp if panel_open => self.session.nudge_speed_multiplier(1),
            GameAction::SpeedDown if panel_open => self.session.nudge_speed_multiplier(-1),
            GameAction::GapUp if panel_open => self.session.nudge_gap_offset(1),
            GameAction::GapDown if panel_open => self.session.nudge_gap_offset(-1),
            GameAction::SpeedUp | GameAction::SpeedDown | GameAction::GapUp | GameAction::GapDown => {},
            GameAction::Leave => {
                self.session.focus_lost();
                return Some(Action::ShowHome);
            },
        }
        None
    }
}

fn canvas_y(y: f32) -> f64 {
    (game::VIEW_H - y) as f64
}

/// Fills a world rectangle with vertical strokes.
fn fill_rect(ctx: &mut Context<'_>, rect: &WorldRect, color: Color) {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return;
    }
    let mut x = rect.x.max(0.0);
    let right = rect.right().min(game::VIEW_W);
    while x <= right {
        ctx.draw(&CanvasLine {
            x1: x as f64,
            y1: canvas_y(rect.y),
            x2: x as f64,
            y2: canvas_y(rect.bottom()),
            color,
        });
        x += FILL_STEP;
    }
}

fn draw_world(ctx: &mut Context<'_>, snapshot: &Snapshot<'_>) {
    ctx.draw(&Parallax::new(snapshot.world_x));
    ctx.layer();

    for pipe in snapshot.pipes.iter() {
        let (top, bottom) = pipe.segments();
        fill_rect(ctx, &top, game::PIPE_COLOR);
        fill_rect(ctx, &bottom, game::PIPE_COLOR);
    }

    let ground = WorldRect::new(0.0, game::PLAYFIELD_BOTTOM, game::VIEW_W, game::GROUND_H);
    fill_rect(ctx, &ground, game::GROUND_COLOR);
    let mut stripe = -(snapshot.world_x % GROUND_STRIPE);
    while stripe < game::VIEW_W {
        ctx.draw(&CanvasLine {
            x1: stripe as f64,
            y1: canvas_y(game::PLAYFIELD_BOTTOM),
            x2: (stripe + GROUND_STRIPE / 2.0) as f64,
            y2: canvas_y(game::PLAYFIELD_BOTTOM + 12.0),
            color: Color::Rgb(180, 83, 9),
        });
        stripe += GROUND_STRIPE;
    }
    ctx.layer();

    let coords: Vec<(f64, f64)> =
        snapshot.particles.iter().filter(|p| p.alpha > 0.2).map(|p| (p.x as f64, canvas_y(p.y))).collect();
    ctx.draw(&Points { coords: &coords, color: game::PARTICLE_COLOR });

    let bird = snapshot.bird;
    let color = if snapshot.phase == Phase::GameOver { game::DEAD_BIRD_COLOR } else { game::BIRD_COLOR };
    let mut radius = bird.radius();
    while radius > 0.0 {
        ctx.draw(&Circle { x: bird.x() as f64, y: canvas_y(bird.y), radius: radius as f64, color });
        radius -= FILL_STEP;
    }

    let message = match snapshot.phase {
        Phase::Ready => Some("Press Space to start"),
        Phase::Paused => Some("Paused"),
        Phase::GameOver => Some("Game over! R to retry"),
        Phase::Running => None,
    };
    if let Some(message) = message {
        let x = game::VIEW_W / 2.0 - message.len() as f32 * (FILL_STEP * 2.0) / 2.0;
        ctx.print(x as f64, canvas_y(game::VIEW_H / 3.0), message.bold().fg(Color::Black));
    }
}

fn hud_lines(snapshot: &Snapshot<'_>) -> Vec<Line<'static>> {
    let difficulty = snapshot.difficulty;
    let mut lines = vec![
        Line::from(vec!["Score ".into(), snapshot.score.to_string().bold()]),
        Line::from(vec!["Best  ".into(), snapshot.best.to_string().bold()]),
        Line::from(""),
        Line::from(format!("{}", snapshot.phase)).fg(Color::Cyan),
        Line::from(""),
        Line::from(format!("Speed {:.0}", difficulty.speed(snapshot.score))),
        Line::from(format!("Gap   {:.0}", difficulty.gap_height(snapshot.score))),
    ];

    if snapshot.panel_open {
        lines.extend([
            Line::from(""),
            Line::from("Settings").bold().underlined(),
            Line::from(format!("x{:.2}  <- ->", difficulty.speed_multiplier())),
            Line::from(format!("{:+.0}    - +", difficulty.gap_offset())),
        ]);
    }
    lines
}

impl Page for GamePage {
    fn id(&self) -> PageId {
        PageId::Game
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let action = match action {
            Action::Frame(dt) => {
                let before = self.session.phase();
                self.session.update(dt);
                if before != Phase::GameOver && self.session.phase() == Phase::GameOver {
                    return Ok(Some(Action::ScoresChanged));
                }
                None
            },
            Action::FocusLost | Action::Suspend => {
                self.session.focus_lost();
                None
            },
            Action::StartGame => {
                self.session.reset();
                None
            },
            Action::Game(action) => self.handle_game_action(action),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, f: &mut Frame<'_>, rect: Rect) -> Result<()> {
        let snapshot = self.session.snapshot();

        let [playfield, side] =
            Layout::horizontal([Constraint::Length(PLAYFIELD_WIDTH), Constraint::Fill(1)]).areas(rect);
        let [playfield] = Layout::vertical([Constraint::Length(PLAYFIELD_HEIGHT)]).flex(Flex::Center).areas(playfield);

        let canvas = Canvas::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .title(format!(" {} ", snapshot.score))
                    .title_alignment(Alignment::Center),
            )
            .background_color(game::SKY_COLOR)
            .marker(Marker::Braille)
            .x_bounds([0.0, game::VIEW_W as f64])
            .y_bounds([0.0, game::VIEW_H as f64])
            .paint(|ctx| draw_world(ctx, &snapshot));
        f.render_widget(canvas, playfield);

        let hud = Paragraph::new(hud_lines(&snapshot)).block(Block::default().padding(Padding::horizontal(1)));
        f.render_widget(hud, side);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::{pages::game::difficulty::Difficulty, storage::MemoryStore};

    fn page() -> GamePage {
        GamePage::new(Session::from_seed(Some(11), Box::new(MemoryStore::new()), Difficulty::default()))
    }

    fn render(page: &mut GamePage) -> String {
        let mut terminal = Terminal::new(TestBackend::new(62, 38)).unwrap();
        terminal.draw(|f| page.draw(f, f.area()).unwrap()).unwrap();
        terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_tuning_needs_the_panel() {
        let mut page = page();
        page.update(Action::Game(GameAction::SpeedUp)).unwrap();
        assert_eq!(page.session().difficulty().speed_multiplier(), 1.0);

        page.update(Action::Game(GameAction::TogglePanel)).unwrap();
        page.update(Action::Game(GameAction::SpeedUp)).unwrap();
        page.update(Action::Game(GameAction::GapDown)).unwrap();
        assert!((page.session().difficulty().speed_multiplier() - 1.05).abs() < 1e-5);
        assert_eq!(page.session().difficulty().gap_offset(), -game::GAP_OFFSET_STEP);
    }

    #[test]
    fn test_game_over_reports_once() {
        let mut page = page();
        page.update(Action::Game(GameAction::Flap)).unwrap();
        let mut reports = 0;
        for _ in 0..600 {
            if page.update(Action::Frame(1.0 / 60.0)).unwrap() == Some(Action::ScoresChanged) {
                reports += 1;
            }
        }
        assert_eq!(page.session().phase(), Phase::GameOver);
        assert_eq!(reports, 1);
    }

    #[test]
    fn test_leave_pauses_and_goes_home() {
        let mut page = page();
        page.update(Action::Game(GameAction::Flap)).unwrap();
        assert_eq!(page.update(Action::Game(GameAction::Leave)).unwrap(), Some(Action::ShowHome));
        assert_eq!(page.session().phase(), Phase::Paused);

        page.update(Action::StartGame).unwrap();
        assert_eq!(page.session().phase(), Phase::Ready);
    }

    #[test]
    fn test_focus_loss_pauses() {
        let mut page = page();
        page.update(Action::Game(GameAction::Flap)).unwrap();
        page.update(Action::FocusLost).unwrap();
        assert_eq!(page.session().phase(), Phase::Paused);
    }

    #[test]
    fn test_draw_shows_hud() {
        let mut page = page();
        let screen = render(&mut page);
        assert!(screen.contains("Score"));
        assert!(screen.contains("Ready"));
        assert!(!screen.contains("Settings"));

        page.update(Action::Game(GameAction::TogglePanel)).unwrap();
        let screen = render(&mut page);
        assert!(screen.contains("Settings"));
        assert!(screen.contains("x1.00"));
    }
}
