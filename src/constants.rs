// --- File: constants.rs ---
// --- Engine Defaults ---

/// Probability of a cell starting alive in a random initial state.
pub const DEFAULT_DENSITY: f64 = 0.1;

/// Prefix for the worker pool thread names.
pub const WORKER_THREAD_PREFIX: &str = "lifegrid-worker";

// --- Environment Overrides ---
pub const ENV_WORKERS: &str = "LIFEGRID_WORKERS";
pub const ENV_SEED: &str = "LIFEGRID_SEED";
pub const ENV_DENSITY: &str = "LIFEGRID_DENSITY";
pub const ENV_PATTERN: &str = "LIFEGRID_PATTERN";

// --- Viewer ---
// The window covers this fraction of the primary monitor.
pub const WINDOW_WIDTH_FRACTION: f32 = 0.9;
pub const WINDOW_HEIGHT_FRACTION: f32 = 0.7;
// Used when the platform reports no monitor.
pub const WINDOW_WIDTH: u32 = 1280;
pub const WINDOW_HEIGHT: u32 = 720;
pub const FPS_UPDATE_INTERVAL_SECS: f64 = 0.5;
// --- End of File: constants.rs ---
