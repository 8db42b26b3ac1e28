// --- File: partition.rs ---
use std::num::NonZeroUsize;
use std::ops::Range;

/// Half-open row range `[begin, end)` owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Partition {
    pub begin: usize,
    pub end: usize,
}

impl Partition {
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    /// Empty bands occur when there are more workers than rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    #[inline]
    pub fn contains(&self, row: usize) -> bool {
        self.begin <= row && row < self.end
    }

    #[inline]
    pub fn rows(&self) -> Range<usize> {
        self.begin..self.end
    }
}

/// Splits `size` rows into one band per worker.
///
/// Worker `i < workers - 1` gets `[i * base, (i + 1) * base)` with
/// `base = size / workers`; the final worker gets `[(workers - 1) * base, size)`.
/// When `workers > size`, `base` is zero and every band but the last is empty.
pub fn partition(size: usize, workers: NonZeroUsize) -> Vec<Partition> {
    let workers = workers.get();
    let base = size / workers;

    (0..workers)
        .map(|i| {
            let begin = i * base;
            let end = if i + 1 == workers { size } else { (i + 1) * base };
            Partition { begin, end }
        })
        .collect()
}

// --- End of File: partition.rs ---
