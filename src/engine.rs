//! The tick engine: owns the snake, the food and the session, and is the only
//! thing that mutates them.
//!
//! A tick runs in a fixed order: an expired bonus is dropped, then collision
//! check against the body as it was before the move, then the move itself,
//! then food resolution, then bonus bookkeeping. Collisions end the game
//! without touching the board.

use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::Rng;

use crate::config::{Difficulty, GameConfig};
use crate::food::{Food, Spawner};
use crate::grid::{Cell, Direction, Grid};
use crate::highscore::{HighScoreStore, JsonFileStore};
use crate::session::{GameOverReason, GameOverRecord, Phase, Session};
use crate::snake::Snake;

/// Inputs the engine understands. Anything not valid for the current phase is
/// ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Menu only: begin a game at the given speed.
    Start(Difficulty),
    /// Running only.
    Turn(Direction),
    TogglePause,
    /// Game over only: new game at the same difficulty.
    Restart,
    /// Game over only.
    OpenMenu,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Moved,
    AteFood,
    AteBonus,
    GameOver(GameOverRecord),
}

/// Things the front-end may want to celebrate. Queued until drained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    FoodEaten(Cell),
    BonusSpawned(Cell),
    BonusEaten(Cell),
    BonusExpired(Cell),
    GameOver(GameOverRecord),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BonusView {
    pub cell: Cell,
    pub remaining: Duration,
}

/// Read-only view of one frame's worth of state.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    pub phase: Phase,
    pub grid: Grid,
    pub difficulty: Difficulty,
    pub segments: &'a VecDeque<Cell>,
    pub direction: Direction,
    pub food: Cell,
    pub bonus: Option<BonusView>,
    pub score: u32,
    pub length: usize,
    pub paused: bool,
    pub game_over: Option<GameOverRecord>,
}

pub struct Engine<R = StdRng, S = JsonFileStore> {
    config: GameConfig,
    rng: R,
    store: S,
    food_spawner: Spawner,
    bonus_spawner: Spawner,
    snake: Snake,
    session: Session,
    food: Food,
    bonus: Option<Food>,
    events: Vec<GameEvent>,
}

impl<R: Rng, S: HighScoreStore> Engine<R, S> {
    /// Sets up a board and waits in the menu for [`Command::Start`].
    pub fn new(config: GameConfig, rng: R, store: S) -> Self {
        let grid = config.grid();
        let snake = Snake::new(grid.center(), Direction::East);
        let mut engine = Engine {
            food_spawner: Spawner::new(config.food_spawn_attempts),
            bonus_spawner: Spawner::new(config.bonus_spawn_attempts),
            food: Food::regular(grid.center()),
            session: Session::new(Difficulty::default(), Duration::ZERO),
            bonus: None,
            events: Vec::new(),
            snake,
            config,
            rng,
            store,
        };
        engine.reset(Difficulty::default());
        engine.session.open_menu();
        engine
    }

    /// Like [`Engine::new`] followed by [`Command::Start`].
    pub fn started(config: GameConfig, rng: R, store: S, difficulty: Difficulty) -> Self {
        let mut engine = Self::new(config, rng, store);
        engine.apply(Command::Start(difficulty));
        engine
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn food(&self) -> Food {
        self.food
    }

    pub fn bonus(&self) -> Option<Food> {
        self.bonus
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    /// Replaces the snake. Meant for scripted scenarios.
    pub fn set_snake(&mut self, snake: Snake) {
        self.snake = snake;
    }

    /// Moves the regular food. Meant for scripted scenarios.
    pub fn set_food(&mut self, cell: Cell) {
        self.food = Food::regular(cell);
    }

    /// Places a fresh bonus at `cell`. Meant for scripted scenarios.
    pub fn set_bonus(&mut self, cell: Cell) {
        let now = self.session.bonus_clock;
        self.bonus = Some(Food::bonus(cell, now, self.config.bonus_lifetime));
    }

    /// The single transition function. Returns whether the command was
    /// accepted in the current phase.
    pub fn apply(&mut self, command: Command) -> bool {
        match (self.session.phase(), command) {
            (Phase::Menu, Command::Start(difficulty)) => {
                self.reset(difficulty);
                true
            }
            (Phase::Running, Command::Turn(direction)) => {
                self.snake.set_direction(direction);
                true
            }
            (Phase::Running | Phase::Paused, Command::TogglePause) => {
                self.session.toggle_pause();
                debug!("Paused: {}", self.session.is_paused());
                true
            }
            (Phase::GameOver(_), Command::Restart) => {
                self.reset(self.session.difficulty());
                true
            }
            (Phase::GameOver(_), Command::OpenMenu) => {
                self.session.open_menu();
                true
            }
            _ => false,
        }
    }

    /// Feeds frame time into the engine. Moves the snake when the movement
    /// interval has elapsed and keeps the bonus timer going either way.
    pub fn update(&mut self, dt: Duration) -> Option<TickOutcome> {
        if self.session.elapse(dt) {
            return self.tick();
        }
        if self.session.is_running() {
            self.update_bonus();
        }
        None
    }

    /// One movement step. Does nothing unless the game is running.
    pub fn tick(&mut self) -> Option<TickOutcome> {
        if !self.session.is_running() {
            return None;
        }

        // A bonus whose window closed during this frame is gone before the move.
        self.expire_bonus();

        let candidate = self.snake.next_head();
        if let Some(reason) = self.collision(candidate) {
            let record = self
                .session
                .finish(reason, self.snake.len(), &mut self.store);
            self.events.push(GameEvent::GameOver(record));
            return Some(TickOutcome::GameOver(record));
        }

        self.snake.advance();
        self.session.ticks += 1;

        let outcome = if candidate == self.food.cell {
            self.snake.grow();
            self.session.add_points(self.config.food_points);
            self.events.push(GameEvent::FoodEaten(candidate));
            TickOutcome::AteFood
        } else if self.bonus.is_some_and(|bonus| bonus.cell == candidate) {
            for _ in 0..self.config.bonus_growth {
                self.snake.grow();
            }
            self.session.add_points(self.config.bonus_points);
            self.bonus = None;
            self.restart_bonus_cooldown();
            self.events.push(GameEvent::BonusEaten(candidate));
            info!("Bonus eaten at {:?}, score {}", candidate, self.session.score());
            TickOutcome::AteBonus
        } else {
            TickOutcome::Moved
        };
        self.snake.shrink();

        if outcome == TickOutcome::AteFood {
            self.respawn_food();
            debug!(
                "Food eaten at {:?}, new food at {:?}, score {}",
                candidate,
                self.food.cell,
                self.session.score()
            );
        }

        self.update_bonus();
        Some(outcome)
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        let now = self.session.bonus_clock;
        Snapshot {
            phase: self.session.phase(),
            grid: self.config.grid(),
            difficulty: self.session.difficulty(),
            segments: self.snake.segments(),
            direction: self.snake.current_direction(),
            food: self.food.cell,
            bonus: self.bonus.map(|bonus| BonusView {
                cell: bonus.cell,
                remaining: bonus.remaining(now).unwrap_or_default(),
            }),
            score: self.session.score(),
            length: self.snake.len(),
            paused: self.session.is_paused(),
            game_over: self.session.record().copied(),
        }
    }

    /// Takes every event queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn collision(&self, candidate: Cell) -> Option<GameOverReason> {
        if !self.config.grid().contains(candidate) {
            Some(GameOverReason::WallCollision)
        } else if self.snake.contains(candidate) {
            Some(GameOverReason::SelfCollision)
        } else {
            None
        }
    }

    fn reset(&mut self, difficulty: Difficulty) {
        let first_bonus_at = self.rng.gen_range(self.config.first_bonus_delay.clone());
        self.snake = Snake::new(self.config.grid().center(), Direction::East);
        self.session = Session::new(difficulty, first_bonus_at);
        self.bonus = None;
        self.events.clear();
        self.respawn_food();
        info!(
            "New game at {} speed, first bonus after {:.1}s",
            difficulty.name(),
            first_bonus_at.as_secs_f32()
        );
    }

    fn occupied(&self) -> HashSet<Cell> {
        self.snake.segments().iter().copied().collect()
    }

    fn respawn_food(&mut self) {
        let mut excluded = self.occupied();
        if let Some(bonus) = self.bonus {
            excluded.insert(bonus.cell);
        }
        let cell = self
            .food_spawner
            .spawn(&mut self.rng, &excluded, self.config.food_area());
        self.food = Food::regular(cell);
    }

    fn restart_bonus_cooldown(&mut self) {
        let cooldown = self.rng.gen_range(self.config.bonus_cooldown.clone());
        self.session.next_bonus_at = self.session.bonus_clock + cooldown;
    }

    fn expire_bonus(&mut self) {
        let now = self.session.bonus_clock;
        if let Some(bonus) = self.bonus.filter(|bonus| bonus.is_expired(now)) {
            self.bonus = None;
            self.restart_bonus_cooldown();
            self.events.push(GameEvent::BonusExpired(bonus.cell));
            info!("Bonus at {:?} expired", bonus.cell);
        }
    }

    fn update_bonus(&mut self) {
        self.expire_bonus();
        let now = self.session.bonus_clock;
        if self.bonus.is_some() || now < self.session.next_bonus_at {
            return;
        }

        let mut excluded = self.occupied();
        excluded.insert(self.food.cell);
        match self
            .bonus_spawner
            .try_spawn(&mut self.rng, &excluded, self.config.food_area())
        {
            Ok(cell) => {
                self.bonus = Some(Food::bonus(cell, now, self.config.bonus_lifetime));
                self.events.push(GameEvent::BonusSpawned(cell));
                info!("Bonus spawned at {:?}", cell);
            }
            Err(e) => debug!("Bonus spawn deferred: {}", e),
        }
    }
}
