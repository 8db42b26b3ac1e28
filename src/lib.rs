// --- File: lib.rs ---
//! Parallel toroidal Game of Life on a fixed worker pool.

pub mod barrier;
pub mod config;
pub mod constants;
pub mod error;
pub mod grid;
pub mod partition;
pub mod patterns;
pub mod rules;
pub mod simulation;
pub mod utils;
pub mod worker;

pub use barrier::GenerationBarrier;
pub use config::LifeConfig;
pub use error::{LifeError, SyncError, WorkerFault};
pub use grid::{Grid, GridStore, wrap};
pub use partition::{Partition, partition};
pub use patterns::Pattern;
pub use rules::{Conway, Rule, alive_neighbours, next_state};
pub use simulation::{Automaton, SimRng};
pub use worker::Worker;
// --- End of File: lib.rs ---
