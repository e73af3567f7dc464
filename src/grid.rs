//! Toroidal grid of lockable cells and neighbor queries.

use crate::occupant::{Kind, Occupant, OccupantId};
use parking_lot::{Mutex, MutexGuard};
use std::cmp::Ordering as CmpOrdering;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Moore neighborhood offsets as (row, col), in fixed scan order
pub const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (0, 1),
    (1, 0),
    (0, -1),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Contents of one cell's slot
pub type Slot = Option<Arc<Occupant>>;

/// Grid coordinates. The derived ordering (row, then col) is the canonical
/// lock acquisition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Wrap an index into [0, bound)
#[inline]
pub fn normalize(index: i64, bound: usize) -> usize {
    debug_assert!(bound > 0);
    index.rem_euclid(bound as i64) as usize
}

/// One unlocked read of a cell, tagged by what lives there
#[derive(Debug, Clone)]
pub enum Occupancy {
    Empty,
    Fox(Arc<Occupant>),
    Hound(Arc<Occupant>),
}

impl Occupancy {
    pub fn from_slot(slot: &Slot) -> Self {
        match slot {
            None => Occupancy::Empty,
            Some(occupant) => match occupant.kind() {
                Kind::Fox => Occupancy::Fox(Arc::clone(occupant)),
                Kind::Hound(_) => Occupancy::Hound(Arc::clone(occupant)),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Occupancy::Empty)
    }
}

/// One addressable grid position guarding at most one occupant
pub struct Cell {
    position: Position,
    slot: Mutex<Slot>,
}

impl Cell {
    fn new(position: Position) -> Self {
        Self {
            position,
            slot: Mutex::new(None),
        }
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Current occupant, read under the cell lock
    pub fn occupant(&self) -> Slot {
        self.slot.lock().clone()
    }

    pub fn occupancy(&self) -> Occupancy {
        Occupancy::from_slot(&self.slot.lock())
    }

    pub fn is_occupied(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// True if the occupant with `id` still lives here
    pub fn holds(&self, id: OccupantId) -> bool {
        matches!(&*self.slot.lock(), Some(occupant) if occupant.id() == id)
    }

    /// Exclusive access to the slot. Multi-cell callers must go through
    /// [`crate::protocol::atomically`] to keep the global lock order.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock()
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("position", &self.position)
            .field("occupant", &self.slot.try_lock().map(|slot| slot.clone()))
            .finish()
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
    }
}

impl Eq for Cell {}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        self.position.cmp(&other.position)
    }
}

/// Toroidal 2-D array of cells stored row-major
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    dirty: AtomicBool,
}

impl Grid {
    /// Create an empty grid. Panics on a zero dimension; configuration
    /// validation rejects those before a grid is built.
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be positive");
        let cells = (0..height)
            .flat_map(|row| (0..width).map(move |col| Cell::new(Position::new(row, col))))
            .collect();
        Self {
            width,
            height,
            cells,
            dirty: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Wrap arbitrary coordinates onto the torus
    #[inline]
    pub fn wrap(&self, row: i64, col: i64) -> Position {
        Position::new(normalize(row, self.height), normalize(col, self.width))
    }

    /// Cell at normalized coordinates
    #[inline]
    pub fn cell_at(&self, row: i64, col: i64) -> &Cell {
        self.cell(self.wrap(row, col))
    }

    /// Cell at a position already inside the grid (wrapped otherwise)
    #[inline]
    pub fn cell(&self, position: Position) -> &Cell {
        let row = position.row % self.height;
        let col = position.col % self.width;
        &self.cells[row * self.width + col]
    }

    /// Replace the occupant of a cell under its own lock, returning the
    /// previous one
    pub fn set_occupant(&self, row: i64, col: i64, occupant: Slot) -> Slot {
        let previous = std::mem::replace(&mut *self.cell_at(row, col).lock(), occupant);
        self.mark_dirty();
        previous
    }

    pub fn occupant(&self, row: i64, col: i64) -> Slot {
        self.cell_at(row, col).occupant()
    }

    pub fn is_occupied(&self, row: i64, col: i64) -> bool {
        self.cell_at(row, col).is_occupied()
    }

    /// The 8 wrapped neighbors in [`NEIGHBOR_OFFSETS`] order.
    ///
    /// On grids narrower than 3 in either direction some neighbors repeat.
    pub fn neighbors_of(&self, row: i64, col: i64) -> [&Cell; 8] {
        NEIGHBOR_OFFSETS.map(|(dr, dc)| self.cell_at(row + dr, col + dc))
    }

    /// Neighbors of an in-grid position
    pub fn neighbors(&self, position: Position) -> [&Cell; 8] {
        self.neighbors_of(position.row as i64, position.col as i64)
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Count of (foxes, hounds), one unlocked-snapshot read per cell
    pub fn census(&self) -> (usize, usize) {
        self.cells
            .iter()
            .fold((0, 0), |(foxes, hounds), cell| match cell.occupancy() {
                Occupancy::Empty => (foxes, hounds),
                Occupancy::Fox(_) => (foxes + 1, hounds),
                Occupancy::Hound(_) => (foxes, hounds + 1),
            })
    }

    #[inline]
    pub(crate) fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Read and clear the display-dirty flag
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}
