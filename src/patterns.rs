// --- File: patterns.rs ---
// Offsets are `(row, col)` from the pattern's top-left corner.

use crate::error::LifeError;
use crate::grid::{Grid, wrap};

#[derive(Debug, PartialEq, Eq)]
pub struct Pattern {
    pub name: &'static str,
    pub cells: &'static [(usize, usize)],
}

/// Period-2 oscillator, horizontal phase.
pub const BLINKER: Pattern = Pattern {
    name: "Blinker",
    cells: &[(0, 0), (0, 1), (0, 2)],
};

/// Moves one cell down and one cell right every 4 generations.
pub const GLIDER: Pattern = Pattern {
    name: "Glider",
    cells: &[(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)],
};

pub const TOAD: Pattern = Pattern {
    name: "Toad",
    cells: &[(0, 1), (0, 2), (0, 3), (1, 0), (1, 1), (1, 2)],
};

pub const BEACON: Pattern = Pattern {
    name: "Beacon",
    cells: &[(0, 0), (0, 1), (1, 0), (1, 1), (2, 2), (2, 3), (3, 2), (3, 3)],
};

pub const R_PENTOMINO: Pattern = Pattern {
    name: "R-pentomino",
    cells: &[(0, 1), (0, 2), (1, 0), (1, 1), (2, 1)],
};

pub const PATTERNS: &[&Pattern] = &[&BLINKER, &GLIDER, &TOAD, &BEACON, &R_PENTOMINO];

impl Pattern {
    /// Looks a pattern up by name, ignoring case and `-`/`_`.
    pub fn find(name: &str) -> Option<&'static Pattern> {
        let wanted = normalise(name);
        PATTERNS.iter().copied().find(|p| normalise(p.name) == wanted)
    }

    pub fn height(&self) -> usize {
        self.cells.iter().map(|&(r, _)| r + 1).max().unwrap_or(0)
    }

    pub fn width(&self) -> usize {
        self.cells.iter().map(|&(_, c)| c + 1).max().unwrap_or(0)
    }

    /// Sets the pattern's cells alive with its top-left corner at `(row, col)`.
    pub fn stamp(&self, grid: &mut Grid, row: usize, col: usize) {
        let size = grid.size();
        for &(dr, dc) in self.cells {
            let r = wrap(row % size, dr as isize, size);
            let c = wrap(col % size, dc as isize, size);
            grid.set(r, c, true);
        }
    }

    /// An otherwise empty `size`×`size` grid with the pattern in the middle.
    pub fn centred_grid(&self, size: usize) -> Result<Grid, LifeError> {
        let mut grid = Grid::new(size)?;
        let row = (size / 2).saturating_sub(self.height() / 2);
        let col = (size / 2).saturating_sub(self.width() / 2);
        self.stamp(&mut grid, row, col);
        Ok(grid)
    }
}

fn normalise(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// --- End of File: patterns.rs ---
