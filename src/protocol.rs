//! Lock-ordering protocol for actions that span several cells.
//!
//! An action declares up front the cells it will read and write. The cells
//! are sorted by position, deduplicated and locked in that order, so no two
//! actions can ever wait on each other in a cycle. Preconditions are checked
//! again with every lock held; writes are staged and only applied once the
//! whole validation closure succeeded. Guards release every lock on all exit
//! paths, including unwinding.

use crate::grid::{Grid, Position, Slot};
use crate::occupant::{Occupant, OccupantId, Species};
use parking_lot::MutexGuard;
use std::sync::Arc;
use thiserror::Error;

/// Most cells any action in this simulation touches
pub const MAX_CELLS: usize = 3;

/// Why a transaction was abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Stale {
    #[error("actor no longer holds {0}")]
    ActorGone(Position),
    #[error("expected a {expected} at {at}")]
    WrongOccupant { at: Position, expected: Species },
    #[error("cell {0} is no longer empty")]
    NotEmpty(Position),
    #[error("cell {0} was not declared for this action")]
    Undeclared(Position),
    #[error("action declared {0} cells, at most {} allowed", MAX_CELLS)]
    TooManyCells(usize),
    #[error("interrupted by shutdown")]
    Interrupted,
}

/// Locked view over the declared cells of one action
pub struct Transaction<'g> {
    guards: Vec<(Position, MutexGuard<'g, Slot>)>,
    staged: Vec<(Position, Slot)>,
}

impl<'g> Transaction<'g> {
    fn slot(&self, at: Position) -> Result<&Slot, Stale> {
        self.guards
            .iter()
            .find(|(position, _)| *position == at)
            .map(|(_, guard)| &**guard)
            .ok_or(Stale::Undeclared(at))
    }

    /// Positions held, in acquisition order
    pub fn held(&self) -> Vec<Position> {
        self.guards.iter().map(|(position, _)| *position).collect()
    }

    /// Committed occupant of a declared cell. Staged writes are not visible.
    pub fn occupant(&self, at: Position) -> Result<Option<&Arc<Occupant>>, Stale> {
        Ok(self.slot(at)?.as_ref())
    }

    /// The actor with `id` must still live at `at`
    pub fn expect_holder(&self, at: Position, id: OccupantId) -> Result<(), Stale> {
        match self.occupant(at)? {
            Some(occupant) if occupant.id() == id => Ok(()),
            _ => Err(Stale::ActorGone(at)),
        }
    }

    /// A live `species` occupant must sit at `at`
    pub fn expect_species(&self, at: Position, species: Species) -> Result<Arc<Occupant>, Stale> {
        match self.occupant(at)? {
            Some(occupant) if occupant.is(species) => Ok(Arc::clone(occupant)),
            _ => Err(Stale::WrongOccupant { at, expected: species }),
        }
    }

    /// Non-failing variant of [`Transaction::expect_species`]
    pub fn still(&self, at: Position, species: Species) -> Result<bool, Stale> {
        Ok(matches!(self.occupant(at)?, Some(occupant) if occupant.is(species)))
    }

    pub fn expect_empty(&self, at: Position) -> Result<(), Stale> {
        match self.occupant(at)? {
            None => Ok(()),
            Some(_) => Err(Stale::NotEmpty(at)),
        }
    }

    /// Stage placing `occupant` at a declared cell
    pub fn put(&mut self, at: Position, occupant: Arc<Occupant>) -> Result<(), Stale> {
        self.slot(at)?;
        self.staged.push((at, Some(occupant)));
        Ok(())
    }

    /// Stage clearing a declared cell
    pub fn vacate(&mut self, at: Position) -> Result<(), Stale> {
        self.slot(at)?;
        self.staged.push((at, None));
        Ok(())
    }

    fn apply(&mut self) -> usize {
        let staged = std::mem::take(&mut self.staged);
        let writes = staged.len();
        for (at, value) in staged {
            if let Some((_, guard)) = self.guards.iter_mut().find(|(position, _)| *position == at) {
                **guard = value;
            }
        }
        writes
    }
}

/// Canonical acquisition order: sorted by position, duplicates dropped
pub fn lock_order(cells: &[Position]) -> Vec<Position> {
    let mut order = cells.to_vec();
    order.sort_unstable();
    order.dedup();
    order
}

/// Run `action` with every declared cell locked.
///
/// The closure validates through the [`Transaction`] and stages writes. When
/// it returns `Ok` all staged writes are applied before any lock is
/// released; when it returns `Err` nothing is written. More than
/// [`MAX_CELLS`] distinct cells are refused before any lock is taken.
pub fn atomically<T, F>(grid: &Grid, cells: &[Position], action: F) -> Result<T, Stale>
where
    F: FnOnce(&mut Transaction<'_>) -> Result<T, Stale>,
{
    let order = lock_order(cells);
    if order.len() > MAX_CELLS {
        return Err(Stale::TooManyCells(order.len()));
    }

    let mut tx = Transaction {
        guards: Vec::with_capacity(order.len()),
        staged: Vec::new(),
    };
    for position in order {
        let cell = grid.cell(position);
        tx.guards.push((cell.position(), cell.lock()));
    }

    let outcome = action(&mut tx)?;
    if tx.apply() > 0 {
        grid.mark_dirty();
    }
    Ok(outcome)
}
