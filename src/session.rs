//! Per-game bookkeeping: score, clocks and the phase machine.

use std::fmt;
use std::time::Duration;

use log::info;

use crate::config::Difficulty;
use crate::highscore::HighScoreStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOverReason {
    WallCollision,
    SelfCollision,
}

impl fmt::Display for GameOverReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOverReason::WallCollision => write!(f, "hit the wall"),
            GameOverReason::SelfCollision => write!(f, "bit itself"),
        }
    }
}

/// Final result of a game. Built once, at the transition into
/// [`Phase::GameOver`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameOverRecord {
    pub score: u32,
    pub length: usize,
    pub is_new_high_score: bool,
    pub reason: GameOverReason,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Menu,
    Running,
    Paused,
    GameOver(GameOverRecord),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub(crate) phase: Phase,
    pub(crate) difficulty: Difficulty,
    pub(crate) score: u32,
    pub(crate) ticks: u64,
    /// Unpaused time since the last move.
    pub(crate) move_clock: Duration,
    /// Unpaused time since the game started.
    pub(crate) bonus_clock: Duration,
    /// `bonus_clock` value at which the next bonus may appear.
    pub(crate) next_bonus_at: Duration,
}

impl Session {
    pub fn new(difficulty: Difficulty, first_bonus_at: Duration) -> Self {
        Session {
            phase: Phase::Running,
            difficulty,
            score: 0,
            ticks: 0,
            move_clock: Duration::ZERO,
            bonus_clock: Duration::ZERO,
            next_bonus_at: first_bonus_at,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn bonus_clock(&self) -> Duration {
        self.bonus_clock
    }

    pub fn next_bonus_at(&self) -> Duration {
        self.next_bonus_at
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    pub fn record(&self) -> Option<&GameOverRecord> {
        match &self.phase {
            Phase::GameOver(record) => Some(record),
            _ => None,
        }
    }

    pub(crate) fn open_menu(&mut self) {
        self.phase = Phase::Menu;
    }

    pub(crate) fn add_points(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Flips between running and paused. Other phases are left alone.
    pub(crate) fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            Phase::Running => Phase::Paused,
            Phase::Paused => Phase::Running,
            other => other,
        };
    }

    /// Moves the clocks forward and reports whether a move is due. At most one
    /// move is owed per call; any further backlog is dropped.
    pub(crate) fn elapse(&mut self, dt: Duration) -> bool {
        if !self.is_running() {
            return false;
        }
        self.bonus_clock += dt;
        self.move_clock += dt;

        let interval = self.difficulty.move_interval();
        if self.move_clock < interval {
            return false;
        }
        self.move_clock -= interval;
        if self.move_clock >= interval {
            self.move_clock = Duration::ZERO;
        }
        true
    }

    /// Ends the game. The high score is compared and, if beaten, written back
    /// exactly once; later calls return the existing record untouched.
    pub(crate) fn finish(
        &mut self,
        reason: GameOverReason,
        length: usize,
        store: &mut impl HighScoreStore,
    ) -> GameOverRecord {
        if let Phase::GameOver(record) = self.phase {
            return record;
        }

        let high_score = store.read_high_score();
        let is_new_high_score = self.score > high_score;
        if is_new_high_score {
            store.write_high_score(self.score);
        }

        let record = GameOverRecord {
            score: self.score,
            length,
            is_new_high_score,
            reason,
        };
        info!(
            "Game over: snake {} with score {} and length {}{}",
            reason,
            record.score,
            record.length,
            if is_new_high_score {
                " (new high score)"
            } else {
                ""
            }
        );
        self.phase = Phase::GameOver(record);
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscore::MemoryStore;

    fn session() -> Session {
        Session::new(Difficulty::Normal, Duration::from_secs(10))
    }

    #[test]
    fn test_pause_toggles() {
        let mut session = session();
        session.toggle_pause();
        assert!(session.is_paused());
        session.toggle_pause();
        assert!(session.is_running());
    }

    #[test]
    fn test_no_time_passes_while_paused() {
        let mut session = session();
        session.toggle_pause();

        assert!(!session.elapse(Duration::from_secs(5)));
        assert_eq!(session.bonus_clock(), Duration::ZERO);
    }

    #[test]
    fn test_move_due_after_interval() {
        let mut session = session();
        assert!(!session.elapse(Duration::from_millis(100)));
        assert!(session.elapse(Duration::from_millis(30)));
        assert_eq!(session.move_clock, Duration::from_millis(5));
        assert_eq!(session.bonus_clock(), Duration::from_millis(130));
    }

    #[test]
    fn test_backlog_is_dropped() {
        let mut session = session();
        assert!(session.elapse(Duration::from_secs(2)));
        assert_eq!(session.move_clock, Duration::ZERO);
        assert!(!session.elapse(Duration::from_millis(1)));
    }

    #[test]
    fn test_finish_with_new_high_score() {
        let mut session = session();
        let mut store = MemoryStore::with_high_score(20);
        session.add_points(30);

        let record = session.finish(GameOverReason::WallCollision, 4, &mut store);
        assert_eq!(
            record,
            GameOverRecord {
                score: 30,
                length: 4,
                is_new_high_score: true,
                reason: GameOverReason::WallCollision,
            }
        );
        assert_eq!(store.high_score, 30);
        assert_eq!(session.record(), Some(&record));
    }

    #[test]
    fn test_equal_score_is_not_a_new_high_score() {
        let mut session = session();
        let mut store = MemoryStore::with_high_score(30);
        session.add_points(30);

        let record = session.finish(GameOverReason::SelfCollision, 4, &mut store);
        assert!(!record.is_new_high_score);
        assert_eq!(store.writes, 0);
    }

    #[test]
    fn test_finish_happens_once() {
        let mut session = session();
        let mut store = MemoryStore::default();
        session.add_points(10);

        let first = session.finish(GameOverReason::SelfCollision, 2, &mut store);
        session.add_points(10);
        let second = session.finish(GameOverReason::WallCollision, 9, &mut store);

        assert_eq!(first, second);
        assert_eq!(store.writes, 1);
    }

    #[test]
    fn test_pause_ignored_after_game_over() {
        let mut session = session();
        session.finish(GameOverReason::WallCollision, 1, &mut MemoryStore::default());
        session.toggle_pause();
        assert!(session.record().is_some());
    }
}
