//! Rules and state for a grid snake game.
//!
//! [`Engine`] owns everything that changes during play and is driven by two
//! inputs: [`Command`]s from the player and elapsed frame time through
//! [`Engine::update`]. Front-ends read a [`Snapshot`] every frame and drain
//! [`GameEvent`]s for effects; the engine never calls back into them.
//!
//! ```
//! use std::time::Duration;
//! use qsnek::{Cell, Command, Difficulty, Direction, Engine, GameConfig, MemoryStore};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut engine = Engine::new(
//!     GameConfig::default(),
//!     StdRng::seed_from_u64(1),
//!     MemoryStore::default(),
//! );
//! engine.apply(Command::Start(Difficulty::Normal));
//! engine.apply(Command::Turn(Direction::North));
//! engine.update(Duration::from_millis(125));
//!
//! assert_eq!(engine.snake().head(), Cell::new(14, 7));
//! ```

pub mod config;
pub mod engine;
pub mod food;
pub mod grid;
pub mod highscore;
pub mod session;
pub mod snake;

pub use config::{Difficulty, GameConfig};
pub use engine::{BonusView, Command, Engine, GameEvent, Snapshot, TickOutcome};
pub use food::{Food, FoodKind, SpawnExhausted, Spawner};
pub use grid::{Cell, Direction, Grid};
pub use highscore::{HighScoreStore, JsonFileStore, MemoryStore, PersistenceError};
pub use session::{GameOverReason, GameOverRecord, Phase, Session};
pub use snake::Snake;
