//! Fox behavior: breed into an empty neighboring cell next to another fox.
//!
//! Foxes have no internal death condition. A fox dies when a hound clears
//! its cell, which it notices at its next liveness check.

use super::{backed_off, start_offspring, Step};
use crate::grid::{Grid, Occupancy, Position};
use crate::habitat::Habitat;
use crate::occupant::{Occupant, Species};
use crate::protocol::{atomically, Stale};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

/// A birth decided from unlocked reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Litter {
    /// Empty cell that receives the kit
    pub den: Position,
    /// Fox neighboring the den
    pub mate: Position,
}

/// Pick a random empty neighbor, then a random fox next to it.
///
/// The acting fox never counts as its own mate, even when a tiny grid wraps
/// it into the den's neighborhood.
pub fn plan<R: Rng + ?Sized>(grid: &Grid, me: &Occupant, rng: &mut R) -> Option<Litter> {
    let empties: Vec<Position> = grid
        .neighbors(me.position())
        .iter()
        .filter(|cell| cell.occupancy().is_empty())
        .map(|cell| cell.position())
        .collect();
    let den = *empties.choose(rng)?;

    let mates: Vec<Position> = grid
        .neighbors(den)
        .iter()
        .filter_map(|cell| match cell.occupancy() {
            Occupancy::Fox(fox) if fox.id() != me.id() => Some(cell.position()),
            _ => None,
        })
        .collect();
    let mate = *mates.choose(rng)?;

    Some(Litter { den, mate })
}

/// Commit a litter: with the actor, mate and den locked, the actor must still
/// hold its cell, a fox must still sit at the mate cell and the den must
/// still be empty.
pub fn breed(habitat: &Habitat, me: &Occupant, litter: &Litter) -> Result<Arc<Occupant>, Stale> {
    let home = me.position();
    atomically(&habitat.grid, &[home, litter.mate, litter.den], |tx| {
        if habitat.is_halted() {
            return Err(Stale::Interrupted);
        }
        tx.expect_holder(home, me.id())?;
        tx.expect_species(litter.mate, Species::Fox)?;
        tx.expect_empty(litter.den)?;

        let kit = habitat.create(Species::Fox, litter.den);
        tx.put(litter.den, Arc::clone(&kit))?;
        Ok(kit)
    })
}

pub(crate) fn tick<R: Rng + ?Sized>(habitat: &Arc<Habitat>, me: &Arc<Occupant>, rng: &mut R) -> Step {
    let Some(litter) = plan(&habitat.grid, me, rng) else {
        return Step::Continue;
    };

    match breed(habitat, me, &litter) {
        Ok(kit) => {
            start_offspring(habitat, kit);
            Step::Continue
        }
        Err(stale) => backed_off(habitat, me, stale),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habitat::Rules;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn setup(width: usize, height: usize) -> Habitat {
        Habitat::new(Grid::new(width, height), Rules::default())
    }

    fn put(habitat: &Habitat, species: Species, row: usize, col: usize) -> Arc<Occupant> {
        let occupant = habitat.create(species, Position::new(row, col));
        habitat
            .grid
            .set_occupant(row as i64, col as i64, Some(Arc::clone(&occupant)));
        occupant
    }

    #[test]
    fn test_plan_requires_mate() {
        let habitat = setup(3, 3);
        let fox = put(&habitat, Species::Fox, 1, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        assert_eq!(plan(&habitat.grid, &fox, &mut rng), None);
    }

    #[test]
    fn test_plan_requires_empty_cell() {
        let habitat = setup(3, 3);
        let mut fox = None;
        for row in 0..3 {
            for col in 0..3 {
                let species = if (row, col) == (0, 0) { Species::Hound } else { Species::Fox };
                let occupant = put(&habitat, species, row, col);
                if (row, col) == (1, 1) {
                    fox = Some(occupant);
                }
            }
        }
        let fox = fox.unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert_eq!(plan(&habitat.grid, &fox, &mut rng), None);
    }

    #[test]
    fn test_plan_picks_empty_den_next_to_mate() {
        let habitat = setup(5, 5);
        let fox = put(&habitat, Species::Fox, 2, 2);
        let mate = put(&habitat, Species::Fox, 2, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        for _ in 0..20 {
            if let Some(litter) = plan(&habitat.grid, &fox, &mut rng) {
                assert_eq!(litter.mate, mate.position());
                assert!(!habitat.grid.cell(litter.den).is_occupied());
                let near_mate = habitat
                    .grid
                    .neighbors(litter.den)
                    .iter()
                    .any(|cell| cell.position() == mate.position());
                assert!(near_mate);
            }
        }
    }

    #[test]
    fn test_never_mates_with_itself_on_wrapped_grid() {
        let habitat = setup(1, 3);
        let fox = put(&habitat, Species::Fox, 0, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        for _ in 0..20 {
            assert_eq!(plan(&habitat.grid, &fox, &mut rng), None);
        }
    }

    #[test]
    fn test_breed_rejects_occupied_den() {
        let habitat = setup(3, 3);
        let fox = put(&habitat, Species::Fox, 1, 1);
        put(&habitat, Species::Fox, 1, 2);
        let squatter = put(&habitat, Species::Hound, 0, 1);

        let litter = Litter {
            den: Position::new(0, 1),
            mate: Position::new(1, 2),
        };
        let result = breed(&habitat, &fox, &litter);
        assert_eq!(result.unwrap_err(), Stale::NotEmpty(Position::new(0, 1)));
        assert!(habitat.grid.cell(Position::new(0, 1)).holds(squatter.id()));
    }

    #[test]
    fn test_breed_aborts_when_halted() {
        let habitat = setup(3, 3);
        let fox = put(&habitat, Species::Fox, 1, 1);
        put(&habitat, Species::Fox, 1, 2);
        habitat.barrier.halt();

        let litter = Litter {
            den: Position::new(0, 1),
            mate: Position::new(1, 2),
        };
        assert_eq!(breed(&habitat, &fox, &litter).unwrap_err(), Stale::Interrupted);
        assert!(!habitat.grid.is_occupied(0, 1));
    }
}
