//! Sweep configuration and its up-front validation.

use permpower_stats::{align::AlignError, p_value::Alternative, seed::Seed, window::Window};
use permpower_synth::{SynthError, synthesize};
use serde::{Deserialize, Serialize};

/// Parameters of a power sweep.
///
/// Missing fields take the defaults of the reference study: cohort sizes
/// 500 to 4000 in steps of 500, treatment factors 0.60 to 0.90 in steps of
/// 0.05, 99 permutations, 100 runs per configuration and a 24/24 month window.
///
/// # Examples
///
/// ```
/// use permpower_sweep::config::SweepConfig;
///
/// let config: SweepConfig =
///     serde_json::from_str(r#"{"cohort_sizes": [500, 1000], "runs": 3}"#).unwrap();
/// assert_eq!(config.cohort_sizes, vec![500, 1000]);
/// assert_eq!(config.permutations, 99);
/// assert_eq!(config.treatment_factors.len(), 7);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Cohort sizes to simulate, in sweep order.
    pub cohort_sizes: Vec<usize>,
    /// Treatment factors to simulate, in sweep order.
    pub treatment_factors: Vec<f64>,
    /// Null samples per permutation test.
    pub permutations: usize,
    /// Independent runs per (cohort size, treatment factor) configuration.
    pub runs: usize,
    /// Relative months to test around entry.
    pub window: Window,
    /// Direction of the permutation test.
    pub alternative: Alternative,
    /// Root seed; a random one is drawn when absent.
    pub seed: Option<Seed>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            cohort_sizes: (1..=8).map(|i| i * 500).collect(),
            treatment_factors: linspace(0.6, 0.9, 7),
            permutations: 99,
            runs: 100,
            window: Window::default(),
            alternative: Alternative::default(),
            seed: None,
        }
    }
}

/// `count` evenly spaced values from `start` to `end`, both included.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count).map(|i| start + step * i as f64).collect()
        }
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("{_0}")]
    Window(#[error(not(source))] AlignError),
    #[display("{_0}")]
    TreatmentFactor(#[error(not(source))] SynthError),
    #[display("no cohort sizes to sweep")]
    NoCohortSizes,
    #[display("no treatment factors to sweep")]
    NoTreatmentFactors,
    #[display("cohort size must be positive")]
    ZeroCohortSize,
    #[display("at least one run per configuration is required")]
    NoRuns,
    #[display("at least one permutation per test is required")]
    NoPermutations,
    #[display("entry offset {offset} lies outside the {months}-month rate profile")]
    EntryOutsideProfile { offset: usize, months: usize },
}

impl SweepConfig {
    /// Number of rows the sweep produces.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.cohort_sizes.len() * self.treatment_factors.len() * self.runs
    }

    /// Rejects configurations that cannot run against histories of `months` months.
    ///
    /// Runs before any simulation, so a bad window or empty sweep never
    /// surfaces halfway through a long sweep.
    pub fn validate(&self, months: usize) -> Result<(), ConfigError> {
        self.window.validate(months).map_err(ConfigError::Window)?;
        if self.cohort_sizes.is_empty() {
            return Err(ConfigError::NoCohortSizes);
        }
        if self.cohort_sizes.contains(&0) {
            return Err(ConfigError::ZeroCohortSize);
        }
        if self.treatment_factors.is_empty() {
            return Err(ConfigError::NoTreatmentFactors);
        }
        for &factor in &self.treatment_factors {
            synthesize::check_treatment_factor(factor).map_err(ConfigError::TreatmentFactor)?;
        }
        if self.runs == 0 {
            return Err(ConfigError::NoRuns);
        }
        if self.permutations == 0 {
            return Err(ConfigError::NoPermutations);
        }
        Ok(())
    }
}
