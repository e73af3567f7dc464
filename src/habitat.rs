//! Shared context handed to every occupant task.

use crate::barrier::StartBarrier;
use crate::behavior;
use crate::config::Config;
use crate::grid::{Grid, Position};
use crate::occupant::{Occupant, OccupantId, Species};
use crate::stats::Census;
use parking_lot::Mutex;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Behavior parameters shared by all occupants
#[derive(Debug, Clone)]
pub struct Rules {
    /// Hunger units a hound survives without eating
    pub starve_time: i64,
    /// Minimum sleep per tick
    pub nap_base: Duration,
    /// Uniform random extra sleep per tick
    pub nap_jitter: Duration,
}

impl Rules {
    pub fn from_config(config: &Config) -> Self {
        Self {
            starve_time: config.hounds.starve_time,
            nap_base: Duration::from_millis(config.timing.nap_base_ms),
            nap_jitter: Duration::from_millis(config.timing.nap_jitter_ms),
        }
    }

    /// Draw the next reaction latency
    pub fn nap<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let jitter = self.nap_jitter.as_millis() as u64;
        let extra = if jitter == 0 { 0 } else { rng.gen_range(0..jitter) };
        self.nap_base + Duration::from_millis(extra)
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Everything an occupant acts on: the grid, the barrier, the rules and the
/// bookkeeping of running tasks.
pub struct Habitat {
    pub grid: Grid,
    pub barrier: StartBarrier,
    pub rules: Rules,
    pub census: Census,
    next_id: AtomicU64,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Habitat {
    pub fn new(grid: Grid, rules: Rules) -> Self {
        Self {
            grid,
            barrier: StartBarrier::new(),
            rules,
            census: Census::new(),
            next_id: AtomicU64::new(0),
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn next_id(&self) -> OccupantId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// A new occupant with a fresh id; not yet on the grid
    pub fn create(&self, species: Species, position: Position) -> Arc<Occupant> {
        Occupant::of(species, self.next_id(), position, self.rules.starve_time)
    }

    pub fn is_halted(&self) -> bool {
        self.barrier.is_halted()
    }

    /// Start the task of an occupant that already sits on the grid
    pub fn spawn(self: &Arc<Self>, occupant: Arc<Occupant>) -> std::io::Result<()> {
        let habitat = Arc::clone(self);
        let name = occupant.to_string();
        let handle = thread::Builder::new()
            .name(name)
            .spawn(move || behavior::live(&habitat, occupant))?;

        let mut tasks = self.tasks.lock();
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
        Ok(())
    }

    /// Tasks started and not yet joined
    pub fn task_count(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Join every task, including offspring started while joining
    pub fn join_all(&self) -> usize {
        let mut joined = 0;
        loop {
            let batch = std::mem::take(&mut *self.tasks.lock());
            if batch.is_empty() {
                return joined;
            }
            for task in batch {
                if task.join().is_err() {
                    log::error!("Occupant task panicked");
                }
                joined += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_nap_within_bounds() {
        let rules = Rules {
            starve_time: 10,
            nap_base: Duration::from_millis(500),
            nap_jitter: Duration::from_millis(750),
        };
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let nap = rules.nap(&mut rng);
            assert!(nap >= Duration::from_millis(500));
            assert!(nap < Duration::from_millis(1250));
        }
    }

    #[test]
    fn test_nap_without_jitter() {
        let rules = Rules {
            starve_time: 10,
            nap_base: Duration::from_millis(3),
            nap_jitter: Duration::ZERO,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(rules.nap(&mut rng), Duration::from_millis(3));
    }

    #[test]
    fn test_ids_unique() {
        let habitat = Habitat::new(Grid::new(2, 2), Rules::default());
        let a = habitat.create(Species::Fox, Position::new(0, 0));
        let b = habitat.create(Species::Hound, Position::new(0, 1));
        assert_ne!(a.id(), b.id());
        assert_eq!(b.hunger().map(|h| h.remaining()), Some(3000));
    }
}
