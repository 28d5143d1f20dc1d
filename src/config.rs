//! Tunables for a game. Everything here has a sensible default.

use std::ops::RangeInclusive;
use std::time::Duration;

use clap::ValueEnum;

use crate::grid::Grid;

/// Menu speed presets, in moves per second.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Insane,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Insane,
    ];

    pub fn speed(&self) -> u32 {
        match self {
            Difficulty::Easy => 5,
            Difficulty::Normal => 8,
            Difficulty::Hard => 12,
            Difficulty::Insane => 16,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Normal => "NORMAL",
            Difficulty::Hard => "HARD",
            Difficulty::Insane => "INSANE",
        }
    }

    /// Time between two moves of the snake.
    pub fn move_interval(&self) -> Duration {
        Duration::from_secs(1) / self.speed()
    }

    pub fn next(&self) -> Difficulty {
        let i = Self::ALL.iter().position(|d| d == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn previous(&self) -> Difficulty {
        let i = Self::ALL.iter().position(|d| d == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub width: i32,
    pub height: i32,
    /// Margin the head may not enter.
    pub wall_inset: i32,
    /// Margin food never spawns in.
    pub food_inset: i32,
    pub food_points: u32,
    pub bonus_points: u32,
    /// Segments gained per bonus eaten.
    pub bonus_growth: usize,
    pub food_spawn_attempts: usize,
    pub bonus_spawn_attempts: usize,
    /// Cooldown before the first bonus of a game.
    pub first_bonus_delay: RangeInclusive<Duration>,
    /// Cooldown after a bonus is eaten or expires.
    pub bonus_cooldown: RangeInclusive<Duration>,
    pub bonus_lifetime: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            width: 29,
            height: 17,
            wall_inset: 1,
            food_inset: 2,
            food_points: 10,
            bonus_points: 50,
            bonus_growth: 2,
            food_spawn_attempts: 100,
            bonus_spawn_attempts: 50,
            first_bonus_delay: Duration::from_secs(10)..=Duration::from_secs(20),
            bonus_cooldown: Duration::from_secs(15)..=Duration::from_secs(25),
            bonus_lifetime: Duration::from_secs(8),
        }
    }
}

impl GameConfig {
    /// The board with the wall margin applied.
    pub fn grid(&self) -> Grid {
        Grid::new(self.width, self.height, self.wall_inset)
    }

    /// The board with the food margin applied.
    pub fn food_area(&self) -> Grid {
        Grid::new(self.width, self.height, self.food_inset)
    }
}
