// --- File: error.rs ---
use std::fmt;

use crate::partition::Partition;

/// A worker panicked while computing its band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerFault {
    pub worker: usize,
    pub band: Partition,
    pub message: String,
}

impl fmt::Display for WorkerFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "worker {} faulted on rows {}..{}: {}",
            self.worker, self.band.begin, self.band.end, self.message
        )
    }
}

impl std::error::Error for WorkerFault {}

// Calling `advance_generation` again recomputes the same generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    WorkerFault(WorkerFault),

    MissingWorker {
        thread: usize,
    },
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::WorkerFault(e) => write!(f, "generation aborted: {e}"),
            SyncError::MissingWorker { thread } => {
                write!(f, "generation aborted: pool thread {thread} has no worker")
            }
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::WorkerFault(e) => Some(e),
            SyncError::MissingWorker { .. } => None,
        }
    }
}

impl From<WorkerFault> for SyncError {
    fn from(e: WorkerFault) -> Self {
        SyncError::WorkerFault(e)
    }
}

/// Construction and configuration errors.
///
/// ### Display
/// Messages are short and single-line, suitable for logs.
#[derive(Debug, Clone, PartialEq)]
pub enum LifeError {
    InvalidSize(usize),

    InvalidDensity(f64),

    /// Grid text or rows did not describe a square matrix.
    NotSquare {
        rows: usize,
        columns: usize,
    },

    /// Grid text contained a character that is neither alive nor dead.
    InvalidCell {
        line: usize,
        column: usize,
        found: char,
    },

    Pool(String),

    Sync(SyncError),
}

impl fmt::Display for LifeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifeError::InvalidSize(size) => {
                write!(f, "invalid grid size {size}; must be at least 1")
            }
            LifeError::InvalidDensity(density) => {
                write!(f, "invalid density {density}; must be within [0, 1]")
            }
            LifeError::NotSquare { rows, columns } => {
                write!(f, "grid is not square ({rows} rows, found a row of {columns} cells)")
            }
            LifeError::InvalidCell {
                line,
                column,
                found,
            } => write!(f, "unexpected cell {found:?} at line {line}, column {column}"),
            LifeError::Pool(reason) => write!(f, "failed to start worker pool: {reason}"),
            LifeError::Sync(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for LifeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LifeError::Sync(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SyncError> for LifeError {
    fn from(e: SyncError) -> Self {
        LifeError::Sync(e)
    }
}

impl From<rayon::ThreadPoolBuildError> for LifeError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        LifeError::Pool(e.to_string())
    }
}

// --- End of File: error.rs ---
