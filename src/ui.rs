//! Terminal front-end: turns key presses into engine commands and draws
//! snapshots with ratatui.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent};
use log::info;
use rand::seq::SliceRandom;
use rand::Rng;
use ratatui::{
    prelude::*,
    style::{Style, Stylize},
    widgets::*,
};

use qsnek::{
    Cell, Command, Difficulty, Direction, Engine, GameEvent, GameOverRecord, HighScoreStore,
    Phase, Snapshot,
};

const QUIPS: [&str; 6] = [
    "The snake has left the building.",
    "Walls: 1, Snake: 0.",
    "Turns out the tail was not food.",
    "Even snakes need a better sense of direction.",
    "That is one way to end a meal.",
    "Hiss-terically bad luck.",
];

/// Frames of board shake after eating.
const FOOD_SHAKE: u8 = 5;
const BONUS_SHAKE: u8 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Engine(Command),
    SelectNext,
    SelectPrevious,
    Exit,
}

/// Maps a key to what it means in `phase`. `selected` is the difficulty
/// highlighted in the menu.
pub fn action_for(phase: Phase, selected: Difficulty, key: KeyCode) -> Option<Action> {
    match (phase, key) {
        (_, KeyCode::Char('q')) => Some(Action::Exit),
        (Phase::Menu, KeyCode::Esc) => Some(Action::Exit),
        (Phase::Menu, KeyCode::Char(' ') | KeyCode::Enter) => {
            Some(Action::Engine(Command::Start(selected)))
        }
        (Phase::Menu, KeyCode::Up | KeyCode::Char('w')) => Some(Action::SelectPrevious),
        (Phase::Menu, KeyCode::Down | KeyCode::Char('s')) => Some(Action::SelectNext),
        (Phase::Running | Phase::Paused, KeyCode::Char(' ')) => {
            Some(Action::Engine(Command::TogglePause))
        }
        (Phase::Running | Phase::Paused, KeyCode::Esc) => Some(Action::Exit),
        (Phase::Running, _) => direction_for(key).map(|d| Action::Engine(Command::Turn(d))),
        (Phase::GameOver(_), KeyCode::Char(' ') | KeyCode::Enter) => {
            Some(Action::Engine(Command::Restart))
        }
        (Phase::GameOver(_), KeyCode::Esc | KeyCode::Char('m')) => {
            Some(Action::Engine(Command::OpenMenu))
        }
        _ => None,
    }
}

fn direction_for(key: KeyCode) -> Option<Direction> {
    match key {
        KeyCode::Up | KeyCode::Char('w') => Some(Direction::North),
        KeyCode::Down | KeyCode::Char('s') => Some(Direction::South),
        KeyCode::Left | KeyCode::Char('a') => Some(Direction::West),
        KeyCode::Right | KeyCode::Char('d') => Some(Direction::East),
        _ => None,
    }
}

pub struct App<R = rand::rngs::StdRng, S = qsnek::JsonFileStore> {
    engine: Engine<R, S>,
    selected: Difficulty,
    high_score: u32,
    quip: &'static str,
    shake: u8,
    exit: bool,
}

impl<R: Rng, S: HighScoreStore> App<R, S> {
    pub fn new(engine: Engine<R, S>, selected: Difficulty) -> Self {
        let high_score = engine.store().read_high_score();
        App {
            engine,
            selected,
            high_score,
            quip: QUIPS[0],
            shake: 0,
            exit: false,
        }
    }

    pub fn should_exit(&self) -> bool {
        self.exit
    }

    pub fn handle_input(&mut self, key: KeyEvent) {
        let Some(action) = action_for(self.engine.phase(), self.selected, key.code) else {
            return;
        };
        match action {
            Action::Engine(command) => {
                self.engine.apply(command);
            }
            Action::SelectNext => self.selected = self.selected.next(),
            Action::SelectPrevious => self.selected = self.selected.previous(),
            Action::Exit => self.exit = true,
        }
    }

    pub fn update(&mut self, dt: Duration) {
        self.shake = self.shake.saturating_sub(1);
        self.engine.update(dt);

        for event in self.engine.drain_events() {
            match event {
                GameEvent::FoodEaten(_) => self.shake = FOOD_SHAKE,
                GameEvent::BonusEaten(_) => self.shake = BONUS_SHAKE,
                GameEvent::GameOver(record) => self.on_game_over(record),
                GameEvent::BonusSpawned(_) | GameEvent::BonusExpired(_) => {}
            }
        }
    }

    fn on_game_over(&mut self, record: GameOverRecord) {
        self.quip = QUIPS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(QUIPS[0]);
        if record.is_new_high_score {
            info!("New high score {}", record.score);
            self.high_score = record.score;
        }
        self.shake = 0;
    }

    pub fn render(&self, frame: &mut Frame) {
        let snapshot = self.engine.snapshot();

        let layout = Layout::default()
            .direction(layout::Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title + stats
                Constraint::Min(0),    // Game area
            ])
            .split(frame.area());

        frame.render_widget(
            Paragraph::new(self.status_line(&snapshot))
                .alignment(Alignment::Left)
                .block(Block::default().title(" Q_SNAKE ").borders(Borders::ALL)),
            layout[0],
        );

        match snapshot.phase {
            Phase::Menu => self.render_menu(frame, layout[1]),
            Phase::Running | Phase::Paused => {
                let title = if snapshot.paused {
                    "Paused. Press SPACE to continue"
                } else {
                    "Playing"
                };
                let block = Block::default().title(title).borders(Borders::ALL);
                let inner_area = block.inner(layout[1]);
                frame.render_widget(block, layout[1]);

                let offset = if self.shake > 0 {
                    rand::thread_rng().gen_range(0..=1)
                } else {
                    0
                };
                frame.render_widget(&Board { snapshot, offset }, inner_area);
            }
            Phase::GameOver(record) => {
                let block = Block::default().borders(Borders::ALL);
                let inner_area = block.inner(layout[1]);
                frame.render_widget(block, layout[1]);
                frame.render_widget(&Board { snapshot, offset: 0 }, inner_area);
                frame.render_widget(
                    Paragraph::new(self.game_over_text(&record)).alignment(Alignment::Center),
                    inner_area,
                );
            }
        }
    }

    fn status_line(&self, snapshot: &Snapshot<'_>) -> Line<'static> {
        let mut spans = vec![
            Span::raw(format!("Score: {}", snapshot.score)).yellow(),
            Span::raw(format!("    High: {}", self.high_score.max(snapshot.score))),
        ];
        if snapshot.phase != Phase::Menu {
            spans.push(Span::raw(format!("    Length: {}", snapshot.length)).cyan());
        }
        if let Some(bonus) = snapshot.bonus {
            spans.push(
                Span::raw(format!(
                    "    BONUS ACTIVE! {:.1}s",
                    bonus.remaining.as_secs_f32()
                ))
                .yellow()
                .bold(),
            );
        }
        Line::from(spans)
    }

    fn game_over_text(&self, record: &GameOverRecord) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from("GAME OVER").red().bold(),
            Line::from(self.quip),
            Line::from(""),
        ];
        if record.is_new_high_score {
            lines.push(Line::from("NEW HIGH SCORE!").yellow().bold());
        }
        lines.push(Line::from(format!("Final Score: {}", record.score)));
        lines.push(Line::from(format!("High Score: {}", self.high_score)));
        lines.push(Line::from(format!("Snake Length: {}", record.length)));
        lines.push(Line::from(""));
        lines.push(Line::from("SPACE to try again, ESC for menu"));
        lines
    }

    fn render_menu(&self, frame: &mut Frame, area: Rect) {
        let mut lines = vec![
            Line::from("SELECT DIFFICULTY").bold(),
            Line::from(""),
        ];
        for difficulty in Difficulty::ALL {
            let text = format!("{:<8} speed {:>2}", difficulty.name(), difficulty.speed());
            if difficulty == self.selected {
                lines.push(Line::from(format!("> {} <", text)).yellow().bold());
            } else {
                lines.push(Line::from(format!("  {}  ", text)));
            }
        }
        lines.push(Line::from(""));
        lines.push(Line::from("UP/DOWN to choose, SPACE to start, q to quit"));

        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL)),
            area,
        );
    }
}

/// The playfield, two terminal columns per cell.
struct Board<'a> {
    snapshot: Snapshot<'a>,
    offset: u16,
}

impl Board<'_> {
    /// Terminal position of the left half of `cell`, or `None` if any part of
    /// it falls outside `area`.
    fn position(&self, area: Rect, cell: Cell) -> Option<(u16, u16)> {
        let column = u16::try_from(cell.x).ok()?.checked_mul(2)?;
        let row = u16::try_from(cell.y).ok()?;
        let x = area.x.checked_add(self.offset)?.checked_add(column)?;
        let y = area.y.checked_add(row)?;
        if x.checked_add(1)? >= area.right() || y >= area.bottom() {
            return None;
        }
        Some((x, y))
    }

    /// Draws one lattice cell as two terminal columns. Cells outside `area`
    /// are clipped.
    fn put(&self, area: Rect, buf: &mut Buffer, cell: Cell, symbols: [&str; 2], style: Style) {
        let Some((x, y)) = self.position(area, cell) else {
            return;
        };
        buf[(x, y)].set_symbol(symbols[0]).set_style(style);
        buf[(x + 1, y)].set_symbol(symbols[1]).set_style(style);
    }
}

impl Widget for &Board<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let grid = self.snapshot.grid;

        let wall = Style::default().fg(Color::Rgb(184, 134, 11));
        for y in 0..grid.height {
            for x in 0..grid.width {
                let cell = Cell::new(x, y);
                if !grid.contains(cell) {
                    self.put(area, buf, cell, ["▓", "▓"], wall);
                }
            }
        }

        self.put(
            area,
            buf,
            self.snapshot.food,
            ["●", " "],
            Style::default().fg(Color::LightRed),
        );
        if let Some(bonus) = self.snapshot.bonus {
            self.put(
                area,
                buf,
                bonus.cell,
                ["★", " "],
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            );
        }

        for pos in self.snapshot.segments.iter().skip(1) {
            self.put(area, buf, *pos, [" ", " "], Style::default().bg(Color::Green));
        }

        // Add snake head (different symbol/color)
        let head = match self.snapshot.direction {
            Direction::North => "▲",
            Direction::South => "▼",
            Direction::East => "▶",
            Direction::West => "◀",
        };
        if let Some(&pos) = self.snapshot.segments.front() {
            self.put(
                area,
                buf,
                pos,
                [head, " "],
                Style::default().fg(Color::LightGreen).bg(Color::Green),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsnek::{GameConfig, GameOverReason, MemoryStore};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use ratatui::backend::TestBackend;

    fn app() -> App<StdRng, MemoryStore> {
        let engine = Engine::new(
            GameConfig::default(),
            StdRng::seed_from_u64(9),
            MemoryStore::with_high_score(70),
        );
        App::new(engine, Difficulty::Normal)
    }

    fn press(app: &mut App<StdRng, MemoryStore>, code: KeyCode) {
        app.handle_input(KeyEvent::from(code));
    }

    #[test]
    fn test_menu_keys() {
        let selected = Difficulty::Hard;
        assert_eq!(
            action_for(Phase::Menu, selected, KeyCode::Char(' ')),
            Some(Action::Engine(Command::Start(Difficulty::Hard)))
        );
        assert_eq!(
            action_for(Phase::Menu, selected, KeyCode::Down),
            Some(Action::SelectNext)
        );
        assert_eq!(
            action_for(Phase::Menu, selected, KeyCode::Esc),
            Some(Action::Exit)
        );
        assert_eq!(action_for(Phase::Menu, selected, KeyCode::Left), None);
    }

    #[test]
    fn test_turns_only_while_running() {
        assert_eq!(
            action_for(Phase::Running, Difficulty::Normal, KeyCode::Char('a')),
            Some(Action::Engine(Command::Turn(Direction::West)))
        );
        assert_eq!(
            action_for(Phase::Paused, Difficulty::Normal, KeyCode::Left),
            None
        );
        assert_eq!(
            action_for(Phase::Paused, Difficulty::Normal, KeyCode::Char(' ')),
            Some(Action::Engine(Command::TogglePause))
        );
    }

    #[test]
    fn test_game_over_keys() {
        let record = GameOverRecord {
            score: 0,
            length: 1,
            is_new_high_score: false,
            reason: GameOverReason::WallCollision,
        };
        let phase = Phase::GameOver(record);
        assert_eq!(
            action_for(phase, Difficulty::Normal, KeyCode::Char(' ')),
            Some(Action::Engine(Command::Restart))
        );
        assert_eq!(
            action_for(phase, Difficulty::Normal, KeyCode::Esc),
            Some(Action::Engine(Command::OpenMenu))
        );
        assert_eq!(
            action_for(phase, Difficulty::Normal, KeyCode::Up),
            None
        );
    }

    #[test]
    fn test_menu_selection_starts_game() {
        let mut app = app();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char(' '));

        assert_eq!(app.engine.phase(), Phase::Running);
        assert_eq!(app.engine.session().difficulty(), Difficulty::Insane);
        assert_eq!(app.high_score, 70);
    }

    #[test]
    fn test_board_clips_cells_it_cannot_address() {
        let app = app();
        let board = Board {
            snapshot: app.engine.snapshot(),
            offset: 0,
        };
        let area = Rect::new(0, 0, 80, 24);

        assert_eq!(board.position(area, Cell::new(3, 2)), Some((6, 2)));
        assert_eq!(board.position(area, Cell::new(-1, 2)), None);
        assert_eq!(board.position(area, Cell::new(40, 2)), None);
        // Would wrap to column 0 with a plain cast.
        assert_eq!(board.position(area, Cell::new(32_768, 2)), None);
        assert_eq!(board.position(area, Cell::new(3, 65_536)), None);
        assert_eq!(board.position(area, Cell::new(i32::MAX, i32::MAX)), None);
    }

    #[test]
    fn test_renders_every_phase() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        terminal.draw(|f| app.render(f)).unwrap();
        press(&mut app, KeyCode::Char(' '));
        app.update(Duration::from_millis(125));
        terminal.draw(|f| app.render(f)).unwrap();

        // Run into the east wall.
        for _ in 0..30 {
            app.update(Duration::from_millis(125));
        }
        assert!(matches!(app.engine.phase(), Phase::GameOver(_)));
        terminal.draw(|f| app.render(f)).unwrap();

        // A tiny terminal must not panic either.
        let mut small = Terminal::new(TestBackend::new(10, 5)).unwrap();
        small.draw(|f| app.render(f)).unwrap();
    }
}
