// --- File: rules.rs ---
use crate::grid::{Grid, wrap};

pub const NEIGHBOUR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Next state from a cell's own state and its live neighbour count (`0..=8`).
pub trait Rule: Send + Sync + 'static {
    fn next_state(&self, alive: bool, neighbours: u8) -> bool;
}

/// Conway's Game of Life, B3/S23.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Conway;

impl Rule for Conway {
    #[inline]
    fn next_state(&self, alive: bool, neighbours: u8) -> bool {
        matches!((alive, neighbours), (true, 2) | (true, 3) | (false, 3))
    }
}

/// Live cells among the 8 toroidal neighbours of `(row, col)`.
///
/// On grids smaller than 3 several offsets wrap onto the same cell and are
/// each counted; any offset that wraps back onto `(row, col)` itself is
/// skipped, so the cell never counts towards its own total.
pub fn alive_neighbours(grid: &Grid, row: usize, col: usize) -> u8 {
    let size = grid.size();
    NEIGHBOUR_OFFSETS
        .iter()
        .map(|&(dr, dc)| (wrap(row, dr, size), wrap(col, dc, size)))
        .filter(|&(r, c)| (r, c) != (row, col) && grid.get_wrapped(r, c))
        .count() as u8
}

#[inline]
pub fn next_state<R: Rule + ?Sized>(rule: &R, grid: &Grid, row: usize, col: usize) -> bool {
    rule.next_state(grid.get(row, col), alive_neighbours(grid, row, col))
}

// --- End of File: rules.rs ---
