//! World driver: seeding, release and shutdown of the occupant tasks.

use crate::behavior;
use crate::config::Config;
use crate::error::SimError;
use crate::grid::{Grid, Position};
use crate::habitat::{Habitat, Rules};
use crate::occupant::{Occupant, Species};
use crate::protocol::atomically;
use crate::stats::Stats;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::time::Instant;

/// The simulation world
pub struct World {
    habitat: Arc<Habitat>,
    pub config: Config,
    seed: u64,
    started: Option<Instant>,
    stopped: bool,
}

impl World {
    /// Create an empty world; the configuration is validated first
    pub fn new(config: Config) -> Result<Self, SimError> {
        let seed = config
            .seeding
            .seed
            .unwrap_or_else(|| rand::thread_rng().gen());
        Self::new_with_seed(config, seed)
    }

    /// Create an empty world with a specific placement seed
    pub fn new_with_seed(config: Config, seed: u64) -> Result<Self, SimError> {
        config.validate()?;
        let grid = Grid::new(config.grid.width, config.grid.height);
        let habitat = Arc::new(Habitat::new(grid, Rules::from_config(&config)));

        Ok(Self {
            habitat,
            config,
            seed,
            started: None,
            stopped: false,
        })
    }

    /// Visit every cell: a fox draw first, a hound draw only when the fox
    /// draw fails. Every placed occupant waits at the start barrier.
    pub fn populate(&mut self) -> Result<(usize, usize), SimError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let fox_p = self.config.seeding.fox_probability;
        let hound_p = self.config.seeding.hound_probability;
        let (mut foxes, mut hounds) = (0, 0);

        for row in 0..self.grid().height() {
            for col in 0..self.grid().width() {
                let species = if rng.gen_bool(fox_p) {
                    Species::Fox
                } else if rng.gen_bool(hound_p) {
                    Species::Hound
                } else {
                    continue;
                };

                if self.grid().cell(Position::new(row, col)).is_occupied() {
                    continue;
                }
                self.place(Position::new(row, col), species)?;
                match species {
                    Species::Fox => foxes += 1,
                    Species::Hound => hounds += 1,
                }
            }
        }

        log::info!(
            "Seeded {}x{} grid: {} foxes, {} hounds (seed {})",
            self.grid().width(),
            self.grid().height(),
            foxes,
            hounds,
            self.seed
        );
        Ok((foxes, hounds))
    }

    /// Put a new occupant on an empty cell and start its task
    pub fn place(&self, position: Position, species: Species) -> Result<Arc<Occupant>, SimError> {
        let position = self.grid().wrap(position.row as i64, position.col as i64);
        let occupant = self.habitat.create(species, position);
        self.insert(Arc::clone(&occupant))?;
        Ok(occupant)
    }

    /// Put a prepared occupant on its (empty) cell and start its task
    pub fn insert(&self, occupant: Arc<Occupant>) -> Result<(), SimError> {
        let at = occupant.position();
        atomically(self.grid(), &[at], |tx| {
            tx.expect_empty(at)?;
            tx.put(at, Arc::clone(&occupant))
        })
        .map_err(|_| SimError::Occupied {
            row: at.row,
            col: at.col,
        })?;

        if let Err(e) = self.habitat.spawn(Arc::clone(&occupant)) {
            behavior::vacate_self(&self.habitat, &occupant);
            return Err(e.into());
        }
        Ok(())
    }

    /// Open the start barrier
    pub fn release(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
            log::info!("Releasing {} occupants", self.habitat.barrier.waiting());
        }
        self.habitat.barrier.release();
    }

    /// Halt every occupant and wait for all tasks to end
    pub fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.habitat.barrier.halt();
        let joined = self.habitat.join_all();
        log::info!("Shutdown complete: {} occupant tasks joined", joined);
    }

    pub fn grid(&self) -> &Grid {
        &self.habitat.grid
    }

    pub fn habitat(&self) -> &Arc<Habitat> {
        &self.habitat
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some() && !self.stopped
    }

    pub fn stats(&self) -> Stats {
        let elapsed = self.started.map_or(0.0, |t| t.elapsed().as_secs_f64());
        self.habitat.census.snapshot(self.grid(), elapsed)
    }

    pub fn population(&self) -> usize {
        let (foxes, hounds) = self.grid().census();
        foxes + hounds
    }

    pub fn is_extinct(&self) -> bool {
        self.population() == 0
    }
}

impl Drop for World {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(width: usize, height: usize) -> Config {
        let mut config = Config::default();
        config.grid.width = width;
        config.grid.height = height;
        config.timing.nap_base_ms = 1;
        config.timing.nap_jitter_ms = 2;
        config
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = small_config(3, 3);
        config.grid.height = 0;
        assert!(matches!(World::new(config), Err(SimError::Config(_))));
    }

    #[test]
    fn test_fox_draw_wins() {
        let mut config = small_config(4, 4);
        config.seeding.fox_probability = 1.0;
        config.seeding.hound_probability = 1.0;

        let mut world = World::new_with_seed(config, 1).unwrap();
        assert_eq!(world.populate().unwrap(), (16, 0));
        assert_eq!(world.grid().census(), (16, 0));
        world.shutdown();
    }

    #[test]
    fn test_hounds_fill_remaining_cells() {
        let mut config = small_config(4, 4);
        config.seeding.fox_probability = 0.0;
        config.seeding.hound_probability = 1.0;

        let mut world = World::new_with_seed(config, 1).unwrap();
        assert_eq!(world.populate().unwrap(), (0, 16));
        world.shutdown();
    }

    #[test]
    fn test_seed_reproducible_placement() {
        let config = small_config(8, 8);
        let mut a = World::new_with_seed(config.clone(), 42).unwrap();
        let mut b = World::new_with_seed(config, 42).unwrap();

        assert_eq!(a.populate().unwrap(), b.populate().unwrap());
        let layout = |w: &World| crate::render::text(w.grid());
        assert_eq!(layout(&a), layout(&b));
    }

    #[test]
    fn test_nothing_moves_before_release() {
        let mut config = small_config(6, 6);
        config.hounds.starve_time = 1;
        let mut world = World::new_with_seed(config, 3).unwrap();
        world.populate().unwrap();
        let before = crate::render::text(world.grid());

        std::thread::sleep(std::time::Duration::from_millis(30));
        assert_eq!(crate::render::text(world.grid()), before);
        assert!(!world.is_running());
        world.shutdown();
    }

    #[test]
    fn test_place_rejects_occupied_cell() {
        let world = World::new_with_seed(small_config(3, 3), 0).unwrap();
        world.place(Position::new(1, 1), Species::Fox).unwrap();
        assert!(matches!(
            world.place(Position::new(1, 1), Species::Hound),
            Err(SimError::Occupied { row: 1, col: 1 })
        ));
    }

    #[test]
    fn test_shutdown_empties_grid() {
        let mut world = World::new_with_seed(small_config(6, 6), 5).unwrap();
        world.populate().unwrap();
        world.release();
        std::thread::sleep(std::time::Duration::from_millis(30));

        world.shutdown();
        assert!(world.is_extinct());
        assert_eq!(world.habitat().task_count(), 0);
    }
}
