// --- File: config.rs ---
use std::num::NonZeroUsize;

use crate::constants::{DEFAULT_DENSITY, ENV_DENSITY, ENV_PATTERN, ENV_SEED, ENV_WORKERS};
use crate::error::LifeError;
use crate::patterns::Pattern;
use crate::utils::{
    hardware_concurrency, parse_positive_setting, parse_probability_setting, parse_setting,
};

// --- Automaton Configuration ---

/// With no `pattern`, cells start alive with probability `density`, drawn
/// from `seed` when given and from entropy otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct LifeConfig {
    pub size: usize,
    /// `None` means one worker per available hardware thread.
    pub workers: Option<NonZeroUsize>,
    pub density: f64,
    pub seed: Option<u64>,
    pub pattern: Option<&'static Pattern>,
}

impl LifeConfig {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            workers: None,
            density: DEFAULT_DENSITY,
            seed: None,
            pattern: None,
        }
    }

    /// Defaults overridden by `LIFEGRID_WORKERS`, `LIFEGRID_SEED`,
    /// `LIFEGRID_DENSITY` and `LIFEGRID_PATTERN` when set.
    pub fn from_env(size: usize) -> Self {
        Self::from_lookup(size, |var| std::env::var(var).ok())
    }

    // Bad values are logged and leave the default in place.
    fn from_lookup(size: usize, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::new(size);

        if let Some(raw) = lookup(ENV_WORKERS) {
            config.workers = parse_positive_setting(ENV_WORKERS, &raw).or(config.workers);
        }
        if let Some(raw) = lookup(ENV_SEED) {
            config.seed = parse_setting::<u64>(ENV_SEED, &raw).or(config.seed);
        }
        if let Some(raw) = lookup(ENV_DENSITY) {
            config.density = parse_probability_setting(ENV_DENSITY, &raw).unwrap_or(config.density);
        }
        if let Some(name) = lookup(ENV_PATTERN) {
            match Pattern::find(&name) {
                Some(pattern) => config.pattern = Some(pattern),
                None => log::warn!("ignoring {ENV_PATTERN}={name:?}: unknown pattern"),
            }
        }
        config
    }

    pub fn with_workers(mut self, workers: NonZeroUsize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    pub fn with_pattern(mut self, pattern: &'static Pattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn validate(&self) -> Result<(), LifeError> {
        if self.size == 0 {
            return Err(LifeError::InvalidSize(self.size));
        }
        if !(0.0..=1.0).contains(&self.density) {
            return Err(LifeError::InvalidDensity(self.density));
        }
        Ok(())
    }

    pub fn worker_count(&self) -> NonZeroUsize {
        self.workers.unwrap_or_else(hardware_concurrency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{GLIDER, R_PENTOMINO};
    use std::collections::HashMap;

    fn from_vars(size: usize, vars: &[(&str, &str)]) -> LifeConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|&(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        LifeConfig::from_lookup(size, |var| vars.get(var).cloned())
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert_eq!(LifeConfig::new(0).validate(), Err(LifeError::InvalidSize(0)));
        assert_eq!(
            LifeConfig::new(8).with_density(-0.1).validate(),
            Err(LifeError::InvalidDensity(-0.1))
        );
        assert!(LifeConfig::new(8).with_density(f64::NAN).validate().is_err());
        assert!(LifeConfig::new(1).validate().is_ok());
    }

    #[test]
    fn builders_set_fields() {
        let config = LifeConfig::new(16)
            .with_workers(NonZeroUsize::new(3).unwrap())
            .with_seed(9)
            .with_pattern(&GLIDER);
        assert_eq!(config.worker_count().get(), 3);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.pattern.map(|p| p.name), Some("Glider"));
        assert_eq!(config.density, DEFAULT_DENSITY);
    }

    #[test]
    fn no_overrides_means_defaults() {
        assert_eq!(from_vars(32, &[]), LifeConfig::new(32));
    }

    #[test]
    fn valid_overrides_are_applied() {
        let config = from_vars(
            32,
            &[
                (ENV_WORKERS, "3"),
                (ENV_SEED, "77"),
                (ENV_DENSITY, "0.4"),
                (ENV_PATTERN, "r_pentomino"),
            ],
        );
        assert_eq!(config.workers, NonZeroUsize::new(3));
        assert_eq!(config.seed, Some(77));
        assert_eq!(config.density, 0.4);
        assert_eq!(config.pattern, Some(&R_PENTOMINO));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn bad_overrides_are_ignored() {
        let config = from_vars(
            32,
            &[
                (ENV_WORKERS, "0"),
                (ENV_SEED, "soon"),
                (ENV_DENSITY, "1.5"),
                (ENV_PATTERN, "gosper gun"),
            ],
        );
        assert_eq!(config, LifeConfig::new(32));

        assert_eq!(from_vars(8, &[(ENV_DENSITY, "NaN")]).density, DEFAULT_DENSITY);
        assert_eq!(from_vars(8, &[(ENV_WORKERS, "lots")]).workers, None);
    }

    #[test]
    fn ignored_density_still_builds() {
        let config = from_vars(16, &[(ENV_DENSITY, "1.5"), (ENV_WORKERS, "0")]);
        assert!(crate::Automaton::with_config(&config).is_ok());
    }
}
// --- End of File: config.rs ---
