//! Occupant life-cycle: wait at the barrier, then sleep, check liveness,
//! decide and commit until the occupant retires.

pub mod fox;
pub mod hound;

use crate::habitat::Habitat;
use crate::occupant::{Kind, Occupant};
use crate::protocol::{atomically, Stale};
use rand::Rng;
use std::sync::Arc;

/// Why an occupant stopped acting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fate {
    /// Its cell no longer holds it (eaten)
    Removed,
    /// Hunger reached zero
    Starved,
    /// Shutdown was requested
    Interrupted,
}

/// Result of one iteration of the life loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Retire(Fate),
}

/// Task body of every occupant
pub fn live(habitat: &Arc<Habitat>, me: Arc<Occupant>) {
    if habitat.barrier.wait().is_err() {
        retire(habitat, &me, Fate::Interrupted);
        return;
    }

    let mut rng = rand::thread_rng();
    loop {
        if let Step::Retire(fate) = step(habitat, &me, &mut rng) {
            log::debug!("{} at {} retired: {:?}", me, me.position(), fate);
            break;
        }
    }
}

/// One iteration: sleep, liveness check, then the kind's own behavior
pub fn step<R: Rng + ?Sized>(habitat: &Arc<Habitat>, me: &Arc<Occupant>, rng: &mut R) -> Step {
    let nap = habitat.rules.nap(rng);
    if habitat.barrier.sleep(nap).is_err() {
        return retire(habitat, me, Fate::Interrupted);
    }
    habitat.census.record_tick();

    if !habitat.grid.cell(me.position()).holds(me.id()) {
        return Step::Retire(Fate::Removed);
    }

    match me.kind() {
        Kind::Fox => fox::tick(habitat, me, rng),
        Kind::Hound(hunger) => hound::tick(habitat, me, hunger, nap, rng),
    }
}

/// Clear the occupant's own cell if it still lives there
pub fn vacate_self(habitat: &Habitat, me: &Occupant) -> bool {
    let home = me.position();
    atomically(&habitat.grid, &[home], |tx| {
        tx.expect_holder(home, me.id())?;
        tx.vacate(home)
    })
    .is_ok()
}

/// Self-administered termination
pub fn retire(habitat: &Habitat, me: &Occupant, fate: Fate) -> Step {
    match fate {
        Fate::Removed => {}
        Fate::Starved => {
            if vacate_self(habitat, me) {
                habitat.census.record_starved();
                log::debug!("{} starved at {}", me, me.position());
            }
        }
        Fate::Interrupted => {
            // eaten before the halt reached it
            if !vacate_self(habitat, me) {
                return Step::Retire(Fate::Removed);
            }
            habitat.census.record_interrupted();
        }
    }
    Step::Retire(fate)
}

/// Handle an action the protocol refused to commit
pub(crate) fn backed_off(habitat: &Habitat, me: &Occupant, stale: Stale) -> Step {
    match stale {
        Stale::Interrupted => retire(habitat, me, Fate::Interrupted),
        stale => {
            log::trace!("{} backed off: {}", me, stale);
            habitat.census.record_abort();
            Step::Continue
        }
    }
}

/// Start the task of a newborn already placed on the grid
pub(crate) fn start_offspring(habitat: &Arc<Habitat>, child: Arc<Occupant>) {
    habitat.census.record_birth(child.species());
    log::debug!("{} born at {}", child, child.position());
    if let Err(e) = habitat.spawn(Arc::clone(&child)) {
        log::error!("Failed to start {}: {}", child, e);
        vacate_self(habitat, &child);
    }
}
