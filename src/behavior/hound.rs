//! Hound behavior: eat a neighboring fox, and breed into its cell when
//! another hound is nearby. Hounds starve once their hunger runs out.

use super::{backed_off, retire, start_offspring, Fate, Step};
use crate::grid::{Grid, Occupancy, Position};
use crate::habitat::Habitat;
use crate::occupant::{Hunger, Occupant, Species};
use crate::protocol::{atomically, Stale};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

/// A hunt decided from unlocked reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hunt {
    /// Eat the fox, no mate around
    Feed { prey: Position },
    /// Eat the fox and, if the mate is still there, put a pup in its cell
    FeedAndBreed { prey: Position, mate: Position },
}

impl Hunt {
    pub fn prey(&self) -> Position {
        match *self {
            Hunt::Feed { prey } | Hunt::FeedAndBreed { prey, .. } => prey,
        }
    }

    pub fn mate(&self) -> Option<Position> {
        match *self {
            Hunt::Feed { .. } => None,
            Hunt::FeedAndBreed { mate, .. } => Some(mate),
        }
    }
}

/// Classify the neighborhood and pick a random prey (and mate, if any)
pub fn plan<R: Rng + ?Sized>(grid: &Grid, me: &Occupant, rng: &mut R) -> Option<Hunt> {
    let mut foxes = Vec::new();
    let mut hounds = Vec::new();
    for cell in grid.neighbors(me.position()) {
        match cell.occupancy() {
            Occupancy::Empty => {}
            Occupancy::Fox(_) => foxes.push(cell.position()),
            Occupancy::Hound(hound) if hound.id() != me.id() => hounds.push(cell.position()),
            Occupancy::Hound(_) => {}
        }
    }

    let prey = *foxes.choose(rng)?;
    Some(match hounds.choose(rng) {
        Some(&mate) => Hunt::FeedAndBreed { prey, mate },
        None => Hunt::Feed { prey },
    })
}

/// Commit a hunt over {actor, prey, mate}.
///
/// The actor must still hold its cell and the prey cell must still hold a
/// fox, otherwise nothing changes. On success the fox is removed, hunger is
/// reset and, only if the mate is still a hound, a pup takes the prey's cell.
pub fn hunt(
    habitat: &Habitat,
    me: &Occupant,
    hunger: &Hunger,
    plan: &Hunt,
) -> Result<Option<Arc<Occupant>>, Stale> {
    let home = me.position();
    let prey = plan.prey();
    let mut cells = vec![home, prey];
    cells.extend(plan.mate());

    atomically(&habitat.grid, &cells, |tx| {
        if habitat.is_halted() {
            return Err(Stale::Interrupted);
        }
        tx.expect_holder(home, me.id())?;
        tx.expect_species(prey, Species::Fox)?;

        let mated = match plan.mate() {
            Some(mate) => tx.still(mate, Species::Hound)?,
            None => false,
        };

        tx.vacate(prey)?;
        let pup = if mated {
            let pup = habitat.create(Species::Hound, prey);
            tx.put(prey, Arc::clone(&pup))?;
            Some(pup)
        } else {
            None
        };
        hunger.feed();
        Ok(pup)
    })
}

pub(crate) fn tick<R: Rng + ?Sized>(
    habitat: &Arc<Habitat>,
    me: &Arc<Occupant>,
    hunger: &Hunger,
    nap: Duration,
    rng: &mut R,
) -> Step {
    if hunger.grow(nap.as_millis() as i64) {
        return retire(habitat, me, Fate::Starved);
    }

    let Some(plan) = plan(&habitat.grid, me, rng) else {
        return Step::Continue;
    };

    match hunt(habitat, me, hunger, &plan) {
        Ok(pup) => {
            habitat.census.record_fox_eaten();
            log::debug!("{} ate the fox at {}", me, plan.prey());
            if let Some(pup) = pup {
                start_offspring(habitat, pup);
            }
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
        let rules = Rules {
            starve_time: 50,
            ..Rules::default()
        };
        Habitat::new(Grid::new(width, height), rules)
    }

    fn put(habitat: &Habitat, species: Species, row: usize, col: usize) -> Arc<Occupant> {
        let occupant = habitat.create(species, Position::new(row, col));
        habitat
            .grid
            .set_occupant(row as i64, col as i64, Some(Arc::clone(&occupant)));
        occupant
    }

    #[test]
    fn test_plan_without_prey() {
        let habitat = setup(3, 3);
        let hound = put(&habitat, Species::Hound, 1, 1);
        put(&habitat, Species::Hound, 0, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        assert_eq!(plan(&habitat.grid, &hound, &mut rng), None);
    }

    #[test]
    fn test_plan_feed_only() {
        let habitat = setup(3, 3);
        let hound = put(&habitat, Species::Hound, 1, 1);
        put(&habitat, Species::Fox, 2, 2);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        assert_eq!(
            plan(&habitat.grid, &hound, &mut rng),
            Some(Hunt::Feed {
                prey: Position::new(2, 2)
            })
        );
    }

    #[test]
    fn test_plan_ignores_self_on_small_grid() {
        let habitat = setup(1, 1);
        let hound = put(&habitat, Species::Hound, 0, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        assert_eq!(plan(&habitat.grid, &hound, &mut rng), None);
    }

    #[test]
    fn test_feed_resets_hunger() {
        let habitat = setup(3, 3);
        let hound = put(&habitat, Species::Hound, 1, 1);
        put(&habitat, Species::Fox, 0, 1);
        let hunger = hound.hunger().unwrap();
        hunger.grow(30);

        let plan = Hunt::Feed {
            prey: Position::new(0, 1),
        };
        let pup = hunt(&habitat, &hound, hunger, &plan).unwrap();

        assert!(pup.is_none());
        assert!(!habitat.grid.is_occupied(0, 1));
        assert_eq!(hunger.remaining(), 50);
    }

    #[test]
    fn test_missed_prey_changes_nothing() {
        let habitat = setup(3, 3);
        let hound = put(&habitat, Species::Hound, 1, 1);
        put(&habitat, Species::Hound, 0, 1);
        let hunger = hound.hunger().unwrap();
        hunger.grow(30);

        let plan = Hunt::Feed {
            prey: Position::new(0, 1),
        };
        let result = hunt(&habitat, &hound, hunger, &plan);

        assert!(matches!(result, Err(Stale::WrongOccupant { .. })));
        assert!(habitat.grid.is_occupied(0, 1));
        assert_eq!(hunger.remaining(), 20);
    }

    #[test]
    fn test_gone_mate_still_feeds_without_pup() {
        let habitat = setup(3, 3);
        let hound = put(&habitat, Species::Hound, 1, 1);
        put(&habitat, Species::Fox, 0, 1);

        let plan = Hunt::FeedAndBreed {
            prey: Position::new(0, 1),
            mate: Position::new(2, 2),
        };
        let pup = hunt(&habitat, &hound, hound.hunger().unwrap(), &plan).unwrap();

        assert!(pup.is_none());
        assert_eq!(habitat.grid.census(), (0, 1));
    }

    #[test]
    fn test_no_action_lets_hunger_run_down() {
        let habitat = Arc::new(setup(3, 3));
        let hound = put(&habitat, Species::Hound, 1, 1);
        let hunger = hound.hunger().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        let nap = Duration::from_millis(20);
        assert_eq!(tick(&habitat, &hound, hunger, nap, &mut rng), Step::Continue);
        assert_eq!(tick(&habitat, &hound, hunger, nap, &mut rng), Step::Continue);
        assert_eq!(
            tick(&habitat, &hound, hunger, nap, &mut rng),
            Step::Retire(Fate::Starved)
        );
        assert!(!habitat.grid.is_occupied(1, 1));
    }
}
