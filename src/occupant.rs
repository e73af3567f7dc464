//! Occupant structure: one type for both species, tagged by kind.

use crate::grid::Position;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Unique occupant identifier
pub type OccupantId = u64;

/// The two species living on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    Fox,
    Hound,
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Species::Fox => write!(f, "fox"),
            Species::Hound => write!(f, "hound"),
        }
    }
}

/// Kind tag plus the kind-specific payload
#[derive(Debug)]
pub enum Kind {
    Fox,
    Hound(Hunger),
}

/// Remaining satiety of a hound, in hunger units.
///
/// Only the owning hound's task writes the counter. It is atomic so the
/// renderer can read it from another thread.
#[derive(Debug)]
pub struct Hunger {
    remaining: AtomicI64,
    threshold: i64,
}

impl Hunger {
    /// A freshly fed hound
    pub fn new(threshold: i64) -> Self {
        Self::with_remaining(threshold, threshold)
    }

    pub fn with_remaining(threshold: i64, remaining: i64) -> Self {
        Self {
            remaining: AtomicI64::new(remaining),
            threshold,
        }
    }

    #[inline]
    pub fn remaining(&self) -> i64 {
        self.remaining.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn threshold(&self) -> i64 {
        self.threshold
    }

    /// Consume `elapsed` units, returns true once starved
    pub fn grow(&self, elapsed: i64) -> bool {
        let left = self.remaining.fetch_sub(elapsed, Ordering::Relaxed) - elapsed;
        left <= 0
    }

    /// Reset to the full threshold
    pub fn feed(&self) {
        self.remaining.store(self.threshold, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_starved(&self) -> bool {
        self.remaining() <= 0
    }

    /// Remaining satiety as a fraction of the threshold, clamped to [0, 1]
    pub fn satiety(&self) -> f32 {
        if self.threshold <= 0 {
            return 0.0;
        }
        (self.remaining() as f32 / self.threshold as f32).clamp(0.0, 1.0)
    }
}

/// A living agent located at one cell.
///
/// Occupants never move: offspring are new occupants. The grid is not
/// referenced from here; it is handed to every behavior invocation instead.
#[derive(Debug)]
pub struct Occupant {
    id: OccupantId,
    position: Position,
    kind: Kind,
}

impl Occupant {
    pub fn fox(id: OccupantId, position: Position) -> Arc<Self> {
        Arc::new(Self {
            id,
            position,
            kind: Kind::Fox,
        })
    }

    /// A fully fed hound
    pub fn hound(id: OccupantId, position: Position, starve_time: i64) -> Arc<Self> {
        Self::hound_with(id, position, Hunger::new(starve_time))
    }

    pub fn hound_with(id: OccupantId, position: Position, hunger: Hunger) -> Arc<Self> {
        Arc::new(Self {
            id,
            position,
            kind: Kind::Hound(hunger),
        })
    }

    /// Construct a fresh occupant of the given species
    pub fn of(species: Species, id: OccupantId, position: Position, starve_time: i64) -> Arc<Self> {
        match species {
            Species::Fox => Self::fox(id, position),
            Species::Hound => Self::hound(id, position, starve_time),
        }
    }

    #[inline]
    pub fn id(&self) -> OccupantId {
        self.id
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    #[inline]
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn species(&self) -> Species {
        match self.kind {
            Kind::Fox => Species::Fox,
            Kind::Hound(_) => Species::Hound,
        }
    }

    pub fn hunger(&self) -> Option<&Hunger> {
        match &self.kind {
            Kind::Fox => None,
            Kind::Hound(hunger) => Some(hunger),
        }
    }

    #[inline]
    pub fn is(&self, species: Species) -> bool {
        self.species() == species
    }
}

impl fmt::Display for Occupant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.species(), self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hunger_grow_and_feed() {
        let hunger = Hunger::new(100);
        assert!(!hunger.grow(60));
        assert_eq!(hunger.remaining(), 40);
        assert!(hunger.grow(40));
        assert!(hunger.is_starved());

        hunger.feed();
        assert_eq!(hunger.remaining(), 100);
        assert!(!hunger.is_starved());
    }

    #[test]
    fn test_satiety_clamped() {
        let hunger = Hunger::with_remaining(100, 25);
        assert!((hunger.satiety() - 0.25).abs() < f32::EPSILON);

        hunger.grow(500);
        assert_eq!(hunger.satiety(), 0.0);
    }

    #[test]
    fn test_species_tag() {
        let fox = Occupant::fox(1, Position::new(0, 0));
        let hound = Occupant::hound(2, Position::new(0, 1), 10);

        assert_eq!(fox.species(), Species::Fox);
        assert!(fox.hunger().is_none());
        assert_eq!(hound.species(), Species::Hound);
        assert_eq!(hound.hunger().map(Hunger::remaining), Some(10));
        assert_eq!(hound.to_string(), "hound-2");
    }
}
