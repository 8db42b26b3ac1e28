// --- File: worker.rs ---
// Panics in a band are caught and reported through the barrier, so the
// barrier is always satisfied.

use std::panic::{self, AssertUnwindSafe};

use crate::barrier::GenerationBarrier;
use crate::error::WorkerFault;
use crate::grid::{BandWriter, Grid, NextBuffer};
use crate::partition::Partition;
use crate::rules::{Rule, next_state};
use crate::utils::panic_message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Worker {
    index: usize,
    band: Partition,
}

impl Worker {
    pub fn new(index: usize, band: Partition) -> Self {
        Self { index, band }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn band(&self) -> Partition {
        self.band
    }

    /// One generation: compute the band, then rendezvous.
    ///
    /// The barrier outcome is the coordinator's to report, so a worker only
    /// logs it.
    pub(crate) fn run<R: Rule + ?Sized>(
        &self,
        rule: &R,
        current: &Grid,
        next: &NextBuffer,
        barrier: &GenerationBarrier,
    ) {
        let writer = next.band(self.band);
        let computed = panic::catch_unwind(AssertUnwindSafe(|| {
            self.compute_band(rule, current, &writer, || barrier.is_faulted())
        }));

        match computed {
            Ok(rows) => {
                log::trace!("worker {} computed {} rows", self.index, rows);
                if let Err(e) = barrier.wait() {
                    log::trace!("worker {} released from aborted generation: {e}", self.index);
                }
            }
            Err(payload) => {
                let fault = WorkerFault {
                    worker: self.index,
                    band: self.band,
                    message: panic_message(payload.as_ref()),
                };
                log::error!("{fault}");
                barrier.abort(fault.into());
            }
        }
    }

    /// Writes `next_state` for every cell of the band. Stops between rows
    /// once `aborted` reports true. Returns the number of rows written.
    pub(crate) fn compute_band<R, F>(
        &self,
        rule: &R,
        current: &Grid,
        next: &BandWriter<'_>,
        aborted: F,
    ) -> usize
    where
        R: Rule + ?Sized,
        F: Fn() -> bool,
    {
        let size = current.size();
        let mut rows = 0;
        for row in self.band.rows() {
            if aborted() {
                break;
            }
            for col in 0..size {
                next.write(row, col, next_state(rule, current, row, col));
            }
            rows += 1;
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridStore;
    use crate::rules::Conway;

    #[test]
    fn band_writes_stay_inside_band() {
        // Vertical blinker; the middle row of the next generation is full.
        let mut store = GridStore::new(Grid::parse(".#...\n.#...\n.#...\n.....\n.....").unwrap());
        let worker = Worker::new(0, Partition { begin: 1, end: 2 });
        let next = store.next_buffer();

        let rows = worker.compute_band(&Conway, store.current(), &next.band(worker.band()), || false);
        assert_eq!(rows, 1);

        store.swap();
        assert_eq!(
            store.current().to_string(),
            ".....\n###..\n.....\n.....\n.....\n"
        );
    }

    #[test]
    fn stops_between_rows_when_aborted() {
        let store = GridStore::new(Grid::new(4).unwrap());
        let worker = Worker::new(1, Partition { begin: 0, end: 4 });
        let next = store.next_buffer();

        let rows = worker.compute_band(&Conway, store.current(), &next.band(worker.band()), || true);
        assert_eq!(rows, 0);
    }

    #[test]
    fn panicking_rule_aborts_the_barrier() {
        struct Exploding;
        impl Rule for Exploding {
            fn next_state(&self, _: bool, _: u8) -> bool {
                panic!("rule exploded")
            }
        }

        let store = GridStore::new(Grid::new(2).unwrap());
        let barrier = GenerationBarrier::new(2);
        let worker = Worker::new(3, Partition { begin: 0, end: 2 });

        worker.run(&Exploding, store.current(), &store.next_buffer(), &barrier);

        match barrier.wait() {
            Err(crate::SyncError::WorkerFault(fault)) => {
                assert_eq!(fault.worker, 3);
                assert_eq!(fault.band, Partition { begin: 0, end: 2 });
                assert_eq!(fault.message, "rule exploded");
            }
            other => panic!("expected a worker fault, got {other:?}"),
        }
    }
}
// --- End of File: worker.rs ---
