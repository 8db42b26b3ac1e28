// --- File: simulation.rs ---
// Generation coordinator. Pool, bands and barrier are built once; each
// generation broadcasts one job per pool thread (thread `i` runs worker `i`),
// waits at the barrier with the workers, then swaps only if all succeeded.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::barrier::GenerationBarrier;
use crate::config::LifeConfig;
use crate::constants::WORKER_THREAD_PREFIX;
use crate::error::{LifeError, SyncError};
use crate::grid::{Grid, GridStore, NextBuffer};
use crate::partition::{Partition, partition};
use crate::rules::{Conway, Rule};
use crate::worker::Worker;

pub type SimRng = StdRng;

pub struct Automaton<R: Rule = Conway> {
    store: GridStore,
    workers: Arc<[Worker]>,
    barrier: Arc<GenerationBarrier>,
    rule: Arc<R>,
    pool: rayon::ThreadPool,
    config: LifeConfig,
    generation: u64,
}

impl Automaton<Conway> {
    /// A `size`×`size` Life grid, 10% alive, one worker per hardware thread.
    pub fn new(size: usize) -> Result<Self, LifeError> {
        Self::with_config(&LifeConfig::new(size))
    }

    pub fn with_config(config: &LifeConfig) -> Result<Self, LifeError> {
        Self::with_rule(config, Conway)
    }

    /// Starts from an explicit grid.
    pub fn from_grid(grid: Grid, workers: Option<NonZeroUsize>) -> Result<Self, LifeError> {
        Self::from_grid_with_rule(grid, workers, Conway)
    }
}

impl<R: Rule> Automaton<R> {
    pub fn with_rule(config: &LifeConfig, rule: R) -> Result<Self, LifeError> {
        config.validate()?;
        let grid = initial_grid(config)?;
        Self::assemble(grid, config.clone(), rule)
    }

    pub fn from_grid_with_rule(
        grid: Grid,
        workers: Option<NonZeroUsize>,
        rule: R,
    ) -> Result<Self, LifeError> {
        let config = LifeConfig {
            workers,
            ..LifeConfig::new(grid.size())
        };
        Self::assemble(grid, config, rule)
    }

    fn assemble(grid: Grid, config: LifeConfig, rule: R) -> Result<Self, LifeError> {
        let size = grid.size();
        let worker_count = config.worker_count();

        let workers: Arc<[Worker]> = partition(size, worker_count)
            .into_iter()
            .enumerate()
            .map(|(index, band)| Worker::new(index, band))
            .collect();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(worker_count.get())
            .thread_name(|i| format!("{WORKER_THREAD_PREFIX}-{i}"))
            .build()?;
        if pool.current_num_threads() != workers.len() {
            return Err(LifeError::Pool(format!(
                "expected {} threads, pool started {}",
                workers.len(),
                pool.current_num_threads()
            )));
        }

        // Every worker plus the coordinator.
        let barrier = Arc::new(GenerationBarrier::new(workers.len() + 1));

        log::debug!(
            "automaton {size}x{size}: {} workers, bands {:?}",
            workers.len(),
            workers.iter().map(Worker::band).collect::<Vec<_>>()
        );

        Ok(Self {
            store: GridStore::new(grid),
            workers,
            barrier,
            rule: Arc::new(rule),
            pool,
            config,
            generation: 0,
        })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.store.size()
    }

    #[inline]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    pub fn partitions(&self) -> impl Iterator<Item = Partition> + '_ {
        self.workers.iter().map(Worker::band)
    }

    /// Generations completed since construction or the last restart.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn config(&self) -> &LifeConfig {
        &self.config
    }

    pub fn population(&self) -> usize {
        self.store.current().population()
    }

    /// The latest completed generation.
    #[inline]
    pub fn current_grid(&self) -> &Grid {
        self.store.current()
    }

    /// Computes one generation on the worker pool and makes it current.
    ///
    /// Blocks until every worker has reached the barrier. Returns the new
    /// generation number. On `Err` nothing is swapped: the grid and the
    /// generation counter are exactly as before the call.
    pub fn advance_generation(&mut self) -> Result<u64, SyncError> {
        let started = Instant::now();
        self.store.prepare_next();

        let current = self.store.current().share();
        let next = self.store.next_buffer();
        let workers = Arc::clone(&self.workers);
        let barrier = Arc::clone(&self.barrier);
        let rule = Arc::clone(&self.rule);

        self.pool.spawn_broadcast(move |ctx| {
            run_on_thread(ctx.index(), &workers, rule.as_ref(), &current, &next, &barrier)
        });

        match self.barrier.wait() {
            Ok(_) => {
                self.store.swap();
                self.generation += 1;
                log::trace!(
                    "generation {} computed in {:?}",
                    self.generation,
                    started.elapsed()
                );
                Ok(self.generation)
            }
            Err(e) => {
                self.store.mark_dirty();
                log::error!("generation {} aborted: {e}", self.generation + 1);
                Err(e)
            }
        }
    }

    /// Runs `generations` steps, stopping at the first failure.
    pub fn advance(&mut self, generations: usize) -> Result<u64, SyncError> {
        for _ in 0..generations {
            self.advance_generation()?;
        }
        Ok(self.generation)
    }

    /// Replaces the grid with a fresh random state drawn from entropy and
    /// resets the generation counter.
    pub fn restart(&mut self) -> Result<(), LifeError> {
        let mut rng = SimRng::from_entropy();
        let grid = Grid::random(self.size(), self.config.density, &mut rng)?;
        self.store.replace_current(grid);
        self.generation = 0;
        log::info!(
            "restarted {0}x{0} grid, population {1}",
            self.size(),
            self.population()
        );
        Ok(())
    }
}

impl<R: Rule> fmt::Debug for Automaton<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Automaton")
            .field("size", &self.size())
            .field("workers", &self.workers)
            .field("generation", &self.generation)
            .field("population", &self.population())
            .finish_non_exhaustive()
    }
}

// Pool thread `thread` runs the worker with the same index. A thread with no
// worker still has to arrive, or the coordinator would wait forever.
fn run_on_thread<R: Rule + ?Sized>(
    thread: usize,
    workers: &[Worker],
    rule: &R,
    current: &Grid,
    next: &NextBuffer,
    barrier: &GenerationBarrier,
) {
    match workers.get(thread) {
        Some(worker) => worker.run(rule, current, next, barrier),
        None => barrier.abort(SyncError::MissingWorker { thread }),
    }
}

fn initial_grid(config: &LifeConfig) -> Result<Grid, LifeError> {
    if let Some(pattern) = config.pattern {
        return pattern.centred_grid(config.size);
    }
    let mut rng = match config.seed {
        Some(seed) => SimRng::seed_from_u64(seed),
        None => SimRng::from_entropy(),
    };
    Grid::random(config.size, config.density, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::BLINKER;

    #[test]
    fn barrier_counts_workers_and_coordinator() {
        let config = LifeConfig::new(10)
            .with_workers(NonZeroUsize::new(3).unwrap())
            .with_seed(1);
        let life = Automaton::with_config(&config).unwrap();

        assert_eq!(life.worker_count(), 3);
        assert_eq!(life.barrier.parties(), 4);
        assert_eq!(
            life.workers().iter().map(Worker::index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(
            life.partitions().collect::<Vec<_>>(),
            partition(10, NonZeroUsize::new(3).unwrap())
        );
    }

    #[test]
    fn barrier_cycles_once_per_generation() {
        let config = LifeConfig::new(6)
            .with_workers(NonZeroUsize::new(2).unwrap())
            .with_pattern(&BLINKER);
        let mut life = Automaton::with_config(&config).unwrap();

        assert_eq!(life.advance(5).unwrap(), 5);
        assert_eq!(life.barrier.cycle(), 5);
        assert_eq!(life.population(), 3);
    }

    #[test]
    fn thread_without_worker_aborts_the_generation() {
        let store = GridStore::new(Grid::new(4).unwrap());
        let workers = [Worker::new(0, Partition { begin: 0, end: 4 })];
        let barrier = GenerationBarrier::new(2);

        run_on_thread(5, &workers, &Conway, store.current(), &store.next_buffer(), &barrier);

        assert_eq!(barrier.wait(), Err(SyncError::MissingWorker { thread: 5 }));
    }

    #[test]
    fn thread_with_worker_runs_its_band() {
        let mut store = GridStore::new(Grid::parse("...\n###\n...").unwrap());
        let workers = partition(3, NonZeroUsize::new(2).unwrap())
            .into_iter()
            .enumerate()
            .map(|(i, band)| Worker::new(i, band))
            .collect::<Vec<_>>();
        let barrier = GenerationBarrier::new(3);

        let next = store.next_buffer();
        std::thread::scope(|s| {
            for thread in 0..2 {
                let (workers, current, next, barrier) = (&workers, store.current(), &next, &barrier);
                s.spawn(move || run_on_thread(thread, workers, &Conway, current, next, barrier));
            }
            assert_eq!(barrier.wait(), Ok(0));
        });
        store.swap();
        assert_eq!(store.current().population(), 9);
    }

    #[test]
    fn same_seed_same_start() {
        let config = LifeConfig::new(32).with_seed(42);
        let a = Automaton::with_config(&config).unwrap();
        let b = Automaton::with_config(&config).unwrap();
        assert_eq!(a.current_grid(), b.current_grid());
    }

    #[test]
    fn restart_resets_generation() {
        let config = LifeConfig::new(8)
            .with_workers(NonZeroUsize::new(2).unwrap())
            .with_density(1.0);
        let mut life = Automaton::with_config(&config).unwrap();
        life.advance(2).unwrap();

        life.restart().unwrap();
        assert_eq!(life.generation(), 0);
        assert_eq!(life.population(), 64);
    }
}
// --- End of File: simulation.rs ---
