// --- File: barrier.rs ---
// Cyclic rendezvous for `workers + 1` parties. A faulted cycle is still a
// full rendezvous, so no worker of a failed generation is left writing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::error::SyncError;

#[derive(Debug, Default)]
struct BarrierState {
    arrived: usize,
    cycle: u64,
    // First fault reported during the cycle in progress.
    fault: Option<SyncError>,
    // Outcome of the most recently released cycle, read by woken waiters.
    released: Option<SyncError>,
}

#[derive(Debug)]
pub struct GenerationBarrier {
    parties: usize,
    state: Mutex<BarrierState>,
    release: Condvar,
    faulted: AtomicBool,
}

impl GenerationBarrier {
    /// # Panics
    /// If `parties` is zero.
    pub fn new(parties: usize) -> Self {
        assert!(parties > 0, "a barrier needs at least one party");
        Self {
            parties,
            state: Mutex::new(BarrierState::default()),
            release: Condvar::new(),
            faulted: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn parties(&self) -> usize {
        self.parties
    }

    /// Number of cycles released so far.
    pub fn cycle(&self) -> u64 {
        self.lock().cycle
    }

    /// `true` once any party aborted the cycle in progress.
    #[inline]
    pub fn is_faulted(&self) -> bool {
        self.faulted.load(Ordering::Acquire)
    }

    /// Arrives and blocks until every party of this cycle has arrived.
    ///
    /// Returns the index of the released cycle, or the fault that aborted it.
    pub fn wait(&self) -> Result<u64, SyncError> {
        let mut state = self.lock();
        let cycle = state.cycle;

        if let Some(outcome) = self.arrive(&mut state) {
            return outcome;
        }

        // No later cycle can complete before this waiter arrives again, so
        // `released` still describes `cycle` when we wake.
        while state.cycle == cycle {
            state = self
                .release
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        match &state.released {
            None => Ok(cycle),
            Some(fault) => Err(fault.clone()),
        }
    }

    /// Arrives with a fault, without blocking.
    ///
    /// Only the first fault of a cycle is kept.
    pub fn abort(&self, fault: SyncError) {
        let mut state = self.lock();
        if state.fault.is_none() {
            state.fault = Some(fault);
            self.faulted.store(true, Ordering::Release);
        }
        let _ = self.arrive(&mut state);
    }

    // Counts an arrival; releases and resets the cycle if it was the last one.
    fn arrive(&self, state: &mut BarrierState) -> Option<Result<u64, SyncError>> {
        state.arrived += 1;
        if state.arrived < self.parties {
            return None;
        }

        let cycle = state.cycle;
        state.arrived = 0;
        state.cycle += 1;
        state.released = state.fault.take();
        self.faulted.store(false, Ordering::Release);
        self.release.notify_all();

        Some(match &state.released {
            None => Ok(cycle),
            Some(fault) => Err(fault.clone()),
        })
    }

    fn lock(&self) -> MutexGuard<'_, BarrierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// --- End of File: barrier.rs ---
