//! Statistics tracking for the simulation.

use crate::grid::Grid;
use crate::occupant::Species;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Event counters shared by all occupant tasks
#[derive(Debug, Default)]
pub struct Census {
    fox_births: AtomicU64,
    hound_births: AtomicU64,
    foxes_eaten: AtomicU64,
    hounds_starved: AtomicU64,
    interrupted: AtomicU64,
    aborted: AtomicU64,
    ticks: AtomicU64,
}

impl Census {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_birth(&self, species: Species) {
        match species {
            Species::Fox => self.fox_births.fetch_add(1, Ordering::Relaxed),
            Species::Hound => self.hound_births.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn record_fox_eaten(&self) {
        self.foxes_eaten.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_starved(&self) {
        self.hounds_starved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_interrupted(&self) {
        self.interrupted.fetch_add(1, Ordering::Relaxed);
    }

    /// A validated-under-lock action found stale data and backed off
    pub fn record_abort(&self) {
        self.aborted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot the counters together with live population counts
    pub fn snapshot(&self, grid: &Grid, elapsed_secs: f64) -> Stats {
        let (foxes, hounds) = grid.census();
        Stats {
            elapsed_secs,
            foxes,
            hounds,
            fox_births: self.fox_births.load(Ordering::Relaxed),
            hound_births: self.hound_births.load(Ordering::Relaxed),
            foxes_eaten: self.foxes_eaten.load(Ordering::Relaxed),
            hounds_starved: self.hounds_starved.load(Ordering::Relaxed),
            interrupted: self.interrupted.load(Ordering::Relaxed),
            aborted: self.aborted.load(Ordering::Relaxed),
            ticks: self.ticks.load(Ordering::Relaxed),
        }
    }
}

/// Statistics snapshot of a running world
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Seconds since the start barrier was released
    pub elapsed_secs: f64,
    /// Live foxes on the grid
    pub foxes: usize,
    /// Live hounds on the grid
    pub hounds: usize,
    /// Foxes born since start
    pub fox_births: u64,
    /// Hounds born since start
    pub hound_births: u64,
    /// Foxes removed by hounds
    pub foxes_eaten: u64,
    /// Hounds that starved
    pub hounds_starved: u64,
    /// Occupants stopped by shutdown
    pub interrupted: u64,
    /// Actions abandoned after re-validation under lock
    pub aborted: u64,
    /// Occupant iterations completed
    pub ticks: u64,
}

impl Stats {
    pub fn population(&self) -> usize {
        self.foxes + self.hounds
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "T:{:7.1}s | Foxes:{:5} | Hounds:{:5} | Born F/H:{}/{} | Eaten:{} | Starved:{} | Aborted:{}",
            self.elapsed_secs,
            self.foxes,
            self.hounds,
            self.fox_births,
            self.hound_births,
            self.foxes_eaten,
            self.hounds_starved,
            self.aborted,
        )
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Position;
    use crate::occupant::Occupant;

    #[test]
    fn test_snapshot_counts() {
        let grid = Grid::new(4, 4);
        grid.set_occupant(0, 0, Some(Occupant::fox(1, Position::new(0, 0))));
        grid.set_occupant(1, 1, Some(Occupant::hound(2, Position::new(1, 1), 10)));

        let census = Census::new();
        census.record_birth(Species::Fox);
        census.record_birth(Species::Fox);
        census.record_birth(Species::Hound);
        census.record_fox_eaten();
        census.record_abort();

        let stats = census.snapshot(&grid, 1.5);
        assert_eq!(stats.foxes, 1);
        assert_eq!(stats.hounds, 1);
        assert_eq!(stats.population(), 2);
        assert_eq!(stats.fox_births, 2);
        assert_eq!(stats.hound_births, 1);
        assert_eq!(stats.foxes_eaten, 1);
        assert_eq!(stats.aborted, 1);
    }

    #[test]
    fn test_summary_and_json() {
        let stats = Stats {
            foxes: 3,
            hounds: 2,
            ..Stats::default()
        };
        assert!(stats.summary().contains("Foxes:    3"));

        let json = stats.to_json().unwrap();
        let back: Stats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }
}
