//! Food items and the spawner that places them.

use std::collections::HashSet;
use std::time::Duration;

use log::warn;
use rand::Rng;
use thiserror::Error;

use crate::grid::{Cell, Grid};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FoodKind {
    Regular,
    /// Time-limited food. Times are read off the session's bonus clock.
    Bonus {
        spawned_at: Duration,
        lifetime: Duration,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Food {
    pub cell: Cell,
    pub kind: FoodKind,
}

impl Food {
    pub fn regular(cell: Cell) -> Self {
        Food {
            cell,
            kind: FoodKind::Regular,
        }
    }

    pub fn bonus(cell: Cell, spawned_at: Duration, lifetime: Duration) -> Self {
        Food {
            cell,
            kind: FoodKind::Bonus {
                spawned_at,
                lifetime,
            },
        }
    }

    pub fn is_bonus(&self) -> bool {
        matches!(self.kind, FoodKind::Bonus { .. })
    }

    /// Time left before a bonus disappears. Regular food never expires.
    pub fn remaining(&self, now: Duration) -> Option<Duration> {
        match self.kind {
            FoodKind::Regular => None,
            FoodKind::Bonus {
                spawned_at,
                lifetime,
            } => Some((spawned_at + lifetime).saturating_sub(now)),
        }
    }

    pub fn is_expired(&self, now: Duration) -> bool {
        self.remaining(now) == Some(Duration::ZERO)
    }
}

/// Random sampling ran out of attempts.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("no free cell found after {attempts} random attempts")]
pub struct SpawnExhausted {
    pub attempts: usize,
}

/// Finds free cells for food. Holds only the retry budget, so it is a pure
/// function of the occupancy it is handed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Spawner {
    pub attempts: usize,
}

impl Default for Spawner {
    fn default() -> Self {
        Spawner { attempts: 100 }
    }
}

impl Spawner {
    pub fn new(attempts: usize) -> Self {
        Spawner { attempts }
    }

    /// Uniform sampling over `area`, bounded by the retry budget.
    pub fn try_spawn<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        excluded: &HashSet<Cell>,
        area: Grid,
    ) -> Result<Cell, SpawnExhausted> {
        let (min, max) = area.bounds();
        if min.x > max.x || min.y > max.y {
            return Err(SpawnExhausted { attempts: 0 });
        }

        for _ in 0..self.attempts {
            let cell = Cell::new(rng.gen_range(min.x..=max.x), rng.gen_range(min.y..=max.y));
            if !excluded.contains(&cell) {
                return Ok(cell);
            }
        }
        Err(SpawnExhausted {
            attempts: self.attempts,
        })
    }

    /// First free cell of `area` in row-major order.
    pub fn scan(excluded: &HashSet<Cell>, area: Grid) -> Option<Cell> {
        area.cells().find(|cell| !excluded.contains(cell))
    }

    /// Sampling first, then a full scan. A completely full board yields the
    /// top-left cell of `area`.
    pub fn spawn<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        excluded: &HashSet<Cell>,
        area: Grid,
    ) -> Cell {
        match self.try_spawn(rng, excluded, area) {
            Ok(cell) => cell,
            Err(exhausted) => Self::scan(excluded, area).unwrap_or_else(|| {
                warn!("{}; board is full, using fallback cell", exhausted);
                Self::fallback(area)
            }),
        }
    }

    pub fn fallback(area: Grid) -> Cell {
        Cell::new(area.inset, area.inset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_spawn_avoids_excluded_cells() {
        let mut rng = StdRng::seed_from_u64(7);
        let area = Grid::new(12, 10, 2);
        let spawner = Spawner::default();

        for trial in 0..10_000 {
            let mut excluded = HashSet::new();
            for _ in 0..(trial % area.area()) {
                excluded.insert(Cell::new(rng.gen_range(2..=9), rng.gen_range(2..=7)));
            }
            if excluded.len() == area.area() {
                continue;
            }

            let cell = spawner.spawn(&mut rng, &excluded, area);
            assert!(!excluded.contains(&cell), "trial {trial} spawned on {cell:?}");
            assert!(area.contains(cell));
        }
    }

    #[test]
    fn test_scan_finds_last_free_cell() {
        let area = Grid::new(6, 6, 1);
        let mut excluded: HashSet<Cell> = area.cells().collect();
        let free = Cell::new(3, 4);
        excluded.remove(&free);

        assert_eq!(Spawner::scan(&excluded, area), Some(free));

        // Zero attempts forces the scan path.
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(Spawner::new(0).spawn(&mut rng, &excluded, area), free);
    }

    #[test]
    fn test_try_spawn_exhausts_on_full_board() {
        let area = Grid::new(5, 5, 1);
        let excluded: HashSet<Cell> = area.cells().collect();
        let mut rng = StdRng::seed_from_u64(3);

        assert_eq!(
            Spawner::new(50).try_spawn(&mut rng, &excluded, area),
            Err(SpawnExhausted { attempts: 50 })
        );
        assert_eq!(Spawner::scan(&excluded, area), None);
    }

    #[test]
    fn test_full_board_uses_fallback() {
        let area = Grid::new(5, 5, 1);
        let excluded: HashSet<Cell> = area.cells().collect();
        let mut rng = StdRng::seed_from_u64(3);

        assert_eq!(
            Spawner::default().spawn(&mut rng, &excluded, area),
            Cell::new(1, 1)
        );
    }

    #[test]
    fn test_bonus_remaining_and_expiry() {
        let food = Food::bonus(
            Cell::new(3, 3),
            Duration::from_secs(12),
            Duration::from_secs(8),
        );

        assert!(food.is_bonus());
        assert_eq!(
            food.remaining(Duration::from_secs(15)),
            Some(Duration::from_secs(5))
        );
        assert!(!food.is_expired(Duration::from_millis(19_999)));
        assert!(food.is_expired(Duration::from_secs(20)));
        assert!(food.is_expired(Duration::from_secs(30)));
    }

    #[test]
    fn test_regular_food_never_expires() {
        let food = Food::regular(Cell::new(3, 3));
        assert!(!food.is_bonus());
        assert_eq!(food.remaining(Duration::from_secs(1_000)), None);
        assert!(!food.is_expired(Duration::from_secs(1_000)));
    }
}
