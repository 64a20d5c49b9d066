//! Power sweeps: repeated synthetic cohorts tested across cohort sizes and
//! treatment factors.
//!
//! A sweep runs, for every (cohort size, treatment factor) configuration,
//! `runs` independent trials. Each trial samples entry offsets, simulates a
//! cohort with [`permpower_synth`] and tests it with the permutation test of
//! [`permpower_stats`]. The resulting [`table::SweepTable`] holds one row of
//! per-month p-values per trial; [`summary::PowerSummary`] turns it into
//! estimated power.
//!
//! # Example
//!
//! ```
//! use permpower_stats::{seed::Seed, window::Window};
//! use permpower_sweep::{config::SweepConfig, driver::PowerSweep, summary::PowerSummary};
//! use permpower_synth::profile::{EntryPool, RateProfile};
//!
//! let config = SweepConfig {
//!     cohort_sizes: vec![100, 200],
//!     treatment_factors: vec![0.5],
//!     permutations: 19,
//!     runs: 2,
//!     window: Window::new(6, 6),
//!     seed: Some(Seed::from_u64(3)),
//!     ..SweepConfig::default()
//! };
//! let profile = RateProfile::new(vec![0.1; 60]).unwrap();
//! let pool = EntryPool::new((12..48).collect()).unwrap();
//!
//! let table = PowerSweep::new(config, profile, pool).unwrap().run().unwrap();
//! assert_eq!(table.len(), 4);
//!
//! let summary = PowerSummary::new(&table, 0.05);
//! assert_eq!(summary.cells.len(), 2);
//! ```

use permpower_stats::permutation::PermutationError;
use permpower_synth::SynthError;

use crate::config::ConfigError;

pub mod config;
pub mod driver;
pub mod summary;
pub mod table;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum SweepError {
    #[display("invalid sweep configuration")]
    Config(ConfigError),
    #[display("synthesis failed")]
    Synth(SynthError),
    #[display("permutation test failed")]
    Permutation(PermutationError),
}
