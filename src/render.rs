//! Display markers and the bordered text view of the grid.
//!
//! Every cell is read on its own, so a render of a running world may mix
//! states from slightly different moments.

use crate::grid::{Grid, Occupancy};
use crate::occupant::Occupant;

/// What to draw for one cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Marker {
    Background,
    Fox,
    /// `satiety` is remaining hunger over the starvation threshold
    Hound { satiety: f32 },
}

impl Marker {
    pub fn from_occupancy(occupancy: &Occupancy) -> Self {
        match occupancy {
            Occupancy::Empty => Marker::Background,
            Occupancy::Fox(_) => Marker::Fox,
            Occupancy::Hound(hound) => Marker::Hound {
                satiety: hound_satiety(hound),
            },
        }
    }

    pub fn glyph(&self) -> char {
        match self {
            Marker::Background => ' ',
            Marker::Fox => 'F',
            Marker::Hound { .. } => 'H',
        }
    }

    /// RGB color; hounds darken as they get hungrier
    pub fn rgb(&self) -> [u8; 3] {
        match *self {
            Marker::Background => [255, 255, 255],
            Marker::Fox => [0, 200, 0],
            Marker::Hound { satiety } => {
                let red = 80.0 + 175.0 * satiety.clamp(0.0, 1.0);
                [red as u8, 0, 0]
            }
        }
    }
}

fn hound_satiety(hound: &Occupant) -> f32 {
    hound.hunger().map_or(0.0, |hunger| hunger.satiety())
}

/// Markers row by row
pub fn markers(grid: &Grid) -> Vec<Vec<Marker>> {
    (0..grid.height())
        .map(|row| {
            (0..grid.width())
                .map(|col| Marker::from_occupancy(&grid.cell_at(row as i64, col as i64).occupancy()))
                .collect()
        })
        .collect()
}

/// Bordered text view: `2*width+1` dashes above and below, each row framed
/// by `|` with one glyph per cell followed by `|`
pub fn text(grid: &Grid) -> String {
    let border = "-".repeat(grid.width() * 2 + 1);
    let mut out = String::with_capacity((border.len() + 1) * (grid.height() + 2));

    out.push_str(&border);
    out.push('\n');
    for row in markers(grid) {
        out.push('|');
        for marker in row {
            out.push(marker.glyph());
            out.push('|');
        }
        out.push('\n');
    }
    out.push_str(&border);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Position;
    use crate::occupant::Hunger;

    #[test]
    fn test_text_layout() {
        let grid = Grid::new(3, 2);
        grid.set_occupant(0, 0, Some(Occupant::fox(1, Position::new(0, 0))));
        grid.set_occupant(1, 2, Some(Occupant::hound(2, Position::new(1, 2), 10)));

        let expected = "-------\n|F| | |\n| | |H|\n-------\n";
        assert_eq!(text(&grid), expected);
    }

    #[test]
    fn test_hound_darkens_with_hunger() {
        let fed = Occupant::hound_with(1, Position::new(0, 0), Hunger::with_remaining(100, 100));
        let hungry = Occupant::hound_with(2, Position::new(0, 1), Hunger::with_remaining(100, 10));

        let fed = Marker::from_occupancy(&Occupancy::Hound(fed)).rgb();
        let hungry = Marker::from_occupancy(&Occupancy::Hound(hungry)).rgb();
        assert!(hungry[0] < fed[0]);
    }

    #[test]
    fn test_markers_shape() {
        let grid = Grid::new(4, 2);
        let markers = markers(&grid);
        assert_eq!(markers.len(), 2);
        assert!(markers.iter().all(|row| row.len() == 4));
        assert!(markers.iter().flatten().all(|m| *m == Marker::Background));
    }
}
