use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};

use lifegrid::{Automaton, Conway, Grid, LifeConfig, LifeError, Rule, SyncError};

/// Conway, except that the first `failures` evaluations of a live cell with
/// exactly two neighbours panic.
struct Flaky {
    failures: AtomicUsize,
}

impl Flaky {
    fn failing(failures: usize) -> Self {
        Self {
            failures: AtomicUsize::new(failures),
        }
    }
}

impl Rule for Flaky {
    fn next_state(&self, alive: bool, neighbours: u8) -> bool {
        if alive && neighbours == 2 {
            let armed = self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if armed {
                panic!("injected fault");
            }
        }
        Conway.next_state(alive, neighbours)
    }
}

struct AlwaysPanics;

impl Rule for AlwaysPanics {
    fn next_state(&self, _: bool, _: u8) -> bool {
        panic!("never works")
    }
}

fn blinker() -> Grid {
    Grid::parse(".....\n.....\n.###.\n.....\n.....").unwrap()
}

#[test]
fn worker_fault_is_reported_and_grid_untouched() {
    let mut life =
        Automaton::from_grid_with_rule(blinker(), NonZeroUsize::new(2), Flaky::failing(1))
            .unwrap();
    let before = life.current_grid().to_rows();

    match life.advance_generation() {
        Err(SyncError::WorkerFault(fault)) => {
            assert_eq!(fault.message, "injected fault");
            // Only the blinker's middle cell has two neighbours; row 2 is
            // in the second band.
            assert_eq!(fault.worker, 1);
            assert!(fault.band.contains(2));
        }
        other => panic!("expected a worker fault, got {other:?}"),
    }

    assert_eq!(life.generation(), 0);
    assert_eq!(life.current_grid().to_rows(), before);
}

#[test]
fn retry_after_fault_computes_the_same_generation() {
    let mut life =
        Automaton::from_grid_with_rule(blinker(), NonZeroUsize::new(3), Flaky::failing(2))
            .unwrap();

    assert!(life.advance_generation().is_err());
    assert!(life.advance_generation().is_err());
    assert_eq!(life.advance_generation().unwrap(), 1);
    assert_eq!(
        life.current_grid().to_string(),
        ".....\n..#..\n..#..\n..#..\n.....\n"
    );
}

#[test]
fn every_worker_failing_still_returns() {
    let grid = Grid::new(16).unwrap();
    let mut life =
        Automaton::from_grid_with_rule(grid, NonZeroUsize::new(4), AlwaysPanics).unwrap();

    for _ in 0..3 {
        assert!(matches!(
            life.advance_generation(),
            Err(SyncError::WorkerFault(_))
        ));
    }
    assert_eq!(life.generation(), 0);
}

#[test]
fn advance_stops_at_first_failure() {
    let config = LifeConfig::new(8).with_workers(NonZeroUsize::new(2).unwrap());
    let mut life = Automaton::with_rule(&config, AlwaysPanics).unwrap();

    let err = life.advance(5).unwrap_err();
    assert!(matches!(err, SyncError::WorkerFault(_)));

    // Sync failures convert into the crate-wide error for `?` chains.
    let wrapped: LifeError = err.into();
    assert!(matches!(wrapped, LifeError::Sync(_)));
}
