// --- File: grid.rs ---
// Cells are one row-major run of `AtomicBool`s, so workers can write their own
// rows of `next` through a shared handle. Stores are `Relaxed`; the generation
// barrier orders them before the swap and every later read.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;

use crate::error::LifeError;
use crate::partition::Partition;

/// `coord + offset` wrapped onto `[0, size)`. `size` must be non-zero.
#[inline]
pub fn wrap(coord: usize, offset: isize, size: usize) -> usize {
    debug_assert!(size > 0);
    (coord as isize + offset).rem_euclid(size as isize) as usize
}

#[derive(Debug)]
struct Cells {
    size: usize,
    data: Box<[AtomicBool]>,
}

impl Cells {
    fn dead(size: usize) -> Self {
        let data = (0..size * size).map(|_| AtomicBool::new(false)).collect();
        Self { size, data }
    }

    // Checked: a bad column must not silently land on the next row.
    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.size && col < self.size,
            "cell ({row}, {col}) out of bounds for a {0}x{0} grid",
            self.size
        );
        row * self.size + col
    }

    // For coordinates already in range (wrapped, or inside a band).
    #[inline]
    fn index_in_bounds(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.size && col < self.size);
        row * self.size + col
    }

    #[inline]
    fn load(&self, row: usize, col: usize) -> bool {
        self.data[self.index(row, col)].load(Ordering::Relaxed)
    }

    #[inline]
    fn load_in_bounds(&self, row: usize, col: usize) -> bool {
        self.data[self.index_in_bounds(row, col)].load(Ordering::Relaxed)
    }

    #[inline]
    fn store(&self, row: usize, col: usize, alive: bool) {
        self.data[self.index(row, col)].store(alive, Ordering::Relaxed);
    }

    #[inline]
    fn store_in_bounds(&self, row: usize, col: usize, alive: bool) {
        self.data[self.index_in_bounds(row, col)].store(alive, Ordering::Relaxed);
    }

    fn clear(&self) {
        for cell in self.data.iter() {
            cell.store(false, Ordering::Relaxed);
        }
    }
}

/// Read-only N×N view addressed as `(row, col)`, `true` meaning alive.
#[derive(Debug)]
pub struct Grid {
    cells: Arc<Cells>,
}

impl Grid {
    pub fn new(size: usize) -> Result<Self, LifeError> {
        if size == 0 {
            return Err(LifeError::InvalidSize(size));
        }
        Ok(Self {
            cells: Arc::new(Cells::dead(size)),
        })
    }

    /// Each cell is independently alive with probability `density`.
    pub fn random<R: Rng + ?Sized>(size: usize, density: f64, rng: &mut R) -> Result<Self, LifeError> {
        if !(0.0..=1.0).contains(&density) {
            return Err(LifeError::InvalidDensity(density));
        }
        let grid = Self::new(size)?;
        for cell in grid.cells.data.iter() {
            cell.store(rng.gen_bool(density), Ordering::Relaxed);
        }
        Ok(grid)
    }

    /// Builds a grid from explicit rows; the row count fixes the size.
    pub fn from_rows<I, R>(rows: I) -> Result<Self, LifeError>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[bool]>,
    {
        let rows: Vec<R> = rows.into_iter().collect();
        let mut grid = Self::new(rows.len())?;
        for (r, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != rows.len() {
                return Err(LifeError::NotSquare {
                    rows: rows.len(),
                    columns: row.len(),
                });
            }
            for (c, &alive) in row.iter().enumerate() {
                grid.set(r, c, alive);
            }
        }
        Ok(grid)
    }

    /// Parses a text picture of the grid.
    ///
    /// `#`, `O`, `*` and `1` are alive; `.`, `_` and `0` are dead. Surrounding
    /// whitespace and blank lines are ignored.
    pub fn parse(text: &str) -> Result<Self, LifeError> {
        let mut rows = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let row = line
                .chars()
                .enumerate()
                .map(|(col, ch)| match ch {
                    '#' | 'O' | '*' | '1' => Ok(true),
                    '.' | '_' | '0' => Ok(false),
                    found => Err(LifeError::InvalidCell {
                        line: line_no + 1,
                        column: col + 1,
                        found,
                    }),
                })
                .collect::<Result<Vec<bool>, _>>()?;
            rows.push(row);
        }
        Self::from_rows(rows)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.cells.size
    }

    /// State of `(row, col)`.
    ///
    /// # Panics
    /// If either coordinate is outside `[0, size)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.cells.load(row, col)
    }

    // Hot path for neighbour counting; callers pass wrapped coordinates.
    #[inline]
    pub(crate) fn get_wrapped(&self, row: usize, col: usize) -> bool {
        self.cells.load_in_bounds(row, col)
    }

    /// Sets a cell while building an initial state.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, alive: bool) {
        self.cells.store(row, col, alive);
    }

    pub fn population(&self) -> usize {
        self.cells
            .data
            .iter()
            .filter(|cell| cell.load(Ordering::Relaxed))
            .count()
    }

    /// Coordinates of every live cell in row-major order.
    pub fn alive_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let size = self.size();
        self.cells
            .data
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.load(Ordering::Relaxed))
            .map(move |(i, _)| (i / size, i % size))
    }

    pub fn to_rows(&self) -> Vec<Vec<bool>> {
        let size = self.size();
        (0..size)
            .map(|r| (0..size).map(|c| self.get(r, c)).collect())
            .collect()
    }

    /// Second handle onto the same cells, for the worker pool.
    pub(crate) fn share(&self) -> Grid {
        Grid {
            cells: Arc::clone(&self.cells),
        }
    }
}

impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        self.size() == other.size()
            && self
                .cells
                .data
                .iter()
                .zip(other.cells.data.iter())
                .all(|(a, b)| a.load(Ordering::Relaxed) == b.load(Ordering::Relaxed))
    }
}

impl Eq for Grid {}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.size();
        for row in 0..size {
            for col in 0..size {
                f.write_str(if self.get(row, col) { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Write handle onto the *next* buffer. Never readable from outside the crate.
#[derive(Debug, Clone)]
pub(crate) struct NextBuffer {
    cells: Arc<Cells>,
}

impl NextBuffer {
    /// Narrows the handle to the rows a single worker owns.
    pub(crate) fn band(&self, band: Partition) -> BandWriter<'_> {
        BandWriter {
            cells: &self.cells,
            band,
        }
    }
}

/// Writes restricted to one worker's band.
pub(crate) struct BandWriter<'a> {
    cells: &'a Cells,
    band: Partition,
}

impl BandWriter<'_> {
    #[inline]
    pub(crate) fn write(&self, row: usize, col: usize, alive: bool) {
        debug_assert!(
            self.band.contains(row),
            "row {row} outside band {}..{}",
            self.band.begin,
            self.band.end
        );
        self.cells.store_in_bounds(row, col, alive);
    }
}

// `current` is only read and `next` only written, each worker in its own band.
#[derive(Debug)]
pub struct GridStore {
    current: Grid,
    next: NextBuffer,
    // Set when a generation was aborted with partial writes in `next`.
    dirty: bool,
}

impl GridStore {
    pub fn new(initial: Grid) -> Self {
        let next = NextBuffer {
            cells: Arc::new(Cells::dead(initial.size())),
        };
        Self {
            current: initial,
            next,
            dirty: false,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.current.size()
    }

    #[inline]
    pub fn current(&self) -> &Grid {
        &self.current
    }

    #[inline]
    pub fn read(&self, row: usize, col: usize) -> bool {
        self.current.get(row, col)
    }

    /// Makes `next` the new `current`. O(1).
    ///
    /// Only valid once every worker has finished writing `next`.
    pub fn swap(&mut self) {
        debug_assert_eq!(self.current.cells.size, self.next.cells.size);
        std::mem::swap(&mut self.current.cells, &mut self.next.cells);
    }

    /// Readies `next` for a generation, discarding stale writes from an
    /// aborted one.
    pub(crate) fn prepare_next(&mut self) {
        if self.dirty {
            self.next.cells.clear();
            self.dirty = false;
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn next_buffer(&self) -> NextBuffer {
        self.next.clone()
    }

    /// Replaces `current` wholesale, e.g. on restart. Sizes must match.
    pub(crate) fn replace_current(&mut self, grid: Grid) {
        debug_assert_eq!(grid.size(), self.size());
        self.current = grid;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn get_rejects_column_past_the_edge() {
        // (0, 3) would alias (1, 0) in the flat buffer.
        let grid = Grid::new(3).unwrap();
        grid.get(0, 3);
    }

    #[test]
    fn wrapped_reads_match_checked_reads() {
        let grid = Grid::parse("#..\n.#.\n..#").unwrap();
        for row in 0..3 {
            for col in 0..3 {
                assert_eq!(grid.get_wrapped(row, col), grid.get(row, col));
            }
        }
    }

    #[test]
    fn wrap_uses_mathematical_modulo() {
        assert_eq!(wrap(0, -1, 3), 2);
        assert_eq!(wrap(2, 1, 3), 0);
        assert_eq!(wrap(1, 0, 3), 1);
        assert_eq!(wrap(0, -1, 1), 0);
        assert_eq!(wrap(0, -7, 3), 2);
    }

    #[test]
    fn parse_and_display_agree() {
        let text = ".#.\n.#.\n.#.\n";
        let grid = Grid::parse(text).unwrap();
        assert_eq!(grid.size(), 3);
        assert_eq!(grid.population(), 3);
        assert!(grid.get(0, 1) && grid.get(2, 1));
        assert_eq!(grid.to_string(), text);
        assert_eq!(grid.alive_cells().collect::<Vec<_>>(), vec![(0, 1), (1, 1), (2, 1)]);
    }

    #[test]
    fn rejects_bad_shapes_and_cells() {
        assert_eq!(Grid::new(0).unwrap_err(), LifeError::InvalidSize(0));
        assert_eq!(Grid::parse("\n  \n").unwrap_err(), LifeError::InvalidSize(0));
        assert_eq!(
            Grid::parse("..\n...").unwrap_err(),
            LifeError::NotSquare { rows: 2, columns: 3 }
        );
        assert_eq!(
            Grid::parse("..\n.x").unwrap_err(),
            LifeError::InvalidCell { line: 2, column: 2, found: 'x' }
        );
    }

    #[test]
    fn random_respects_density_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(Grid::random(16, 0.0, &mut rng).unwrap().population(), 0);
        assert_eq!(Grid::random(16, 1.0, &mut rng).unwrap().population(), 256);
        assert_eq!(
            Grid::random(16, 1.5, &mut rng).unwrap_err(),
            LifeError::InvalidDensity(1.5)
        );
    }

    #[test]
    fn swap_exchanges_buffers_without_copying() {
        let mut store = GridStore::new(Grid::parse("#.\n..").unwrap());
        let before_current = Arc::as_ptr(&store.current.cells);
        let before_next = Arc::as_ptr(&store.next.cells);

        let next = store.next_buffer();
        next.band(Partition { begin: 1, end: 2 }).write(1, 1, true);
        store.swap();

        assert_eq!(Arc::as_ptr(&store.current.cells), before_next);
        assert_eq!(Arc::as_ptr(&store.next.cells), before_current);
        assert!(store.read(1, 1));
        assert!(!store.read(0, 0));
    }

    #[test]
    fn prepare_next_clears_only_after_abort() {
        let mut store = GridStore::new(Grid::new(2).unwrap());
        let next = store.next_buffer();
        next.band(Partition { begin: 0, end: 2 }).write(0, 0, true);

        store.prepare_next();
        assert!(next.cells.load(0, 0));

        store.mark_dirty();
        store.prepare_next();
        assert!(!next.cells.load(0, 0));
    }
}
// --- End of File: grid.rs ---
