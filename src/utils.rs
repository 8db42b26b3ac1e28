// --- File: utils.rs ---
use std::any::Any;
use std::num::NonZeroUsize;
use std::str::FromStr;

// --- Helper Functions ---

/// Parallel execution contexts available to this process, at least 1.
pub fn hardware_concurrency() -> NonZeroUsize {
    std::thread::available_parallelism().unwrap_or_else(|e| {
        log::warn!("could not query available parallelism ({e}); using a single worker");
        NonZeroUsize::MIN
    })
}

/// Parses the raw value of setting `var`. Malformed values are logged and
/// ignored.
pub fn parse_setting<T: FromStr>(var: &str, raw: &str) -> Option<T> {
    let parsed = raw.trim().parse::<T>().ok();
    if parsed.is_none() {
        log::warn!("ignoring {var}={raw:?}: not a valid value");
    }
    parsed
}

/// Like [`parse_setting`], rejecting zero.
pub fn parse_positive_setting(var: &str, raw: &str) -> Option<NonZeroUsize> {
    parse_setting::<usize>(var, raw).and_then(|n| {
        let positive = NonZeroUsize::new(n);
        if positive.is_none() {
            log::warn!("ignoring {var}=0: must be positive");
        }
        positive
    })
}

/// Like [`parse_setting`], keeping only probabilities in `[0, 1]`.
pub fn parse_probability_setting(var: &str, raw: &str) -> Option<f64> {
    parse_setting::<f64>(var, raw).and_then(|p| {
        if (0.0..=1.0).contains(&p) {
            Some(p)
        } else {
            log::warn!("ignoring {var}={raw:?}: must be within [0, 1]");
            None
        }
    })
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

// --- End of File: utils.rs ---
