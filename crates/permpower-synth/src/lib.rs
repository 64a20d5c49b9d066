//! Synthetic cohorts of binary event histories under a hypothesized treatment.
//!
//! This crate turns an observed per-month event-rate profile and a pool of
//! observed entry offsets into simulated cohorts for power analysis.
//!
//! # Workflow
//!
//! 1. **Inputs** ([`profile::RateProfile`], [`profile::EntryPool`]): built
//!    directly from cleaned vectors, or derived from observed histories with
//!    [`observed::ObservedCohort`]
//! 2. **Entries** ([`synthesize::sample_entries`]): draw one entry offset per
//!    synthetic individual, with replacement
//! 3. **Histories** ([`synthesize::simulate`]): draw Poisson counts from the
//!    profile, scaled by the treatment factor from each entry month onward,
//!    and keep whether each count is positive
//!
//! The resulting [`HistoryMatrix`](permpower_stats::matrix::HistoryMatrix) is
//! what the permutation test in `permpower-stats` consumes.
//!
//! # Example
//!
//! ```
//! use permpower_stats::seed::Seed;
//! use permpower_synth::{
//!     profile::{EntryPool, RateProfile},
//!     synthesize,
//! };
//!
//! let profile = RateProfile::new(vec![0.05; 96]).unwrap();
//! let pool = EntryPool::new(vec![30, 36, 42, 48, 60]).unwrap();
//!
//! let mut rng = Seed::from_u64(7).rng();
//! let entries = synthesize::sample_entries(&pool, 100, &mut rng).unwrap();
//! let histories = synthesize::simulate(&profile, 0.8, &entries, &mut rng).unwrap();
//! assert_eq!(histories.months(), 96);
//! assert_eq!(histories.individuals(), 100);
//! ```

pub mod observed;
pub mod profile;
pub mod synthesize;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum SynthError {
    #[display("entry-offset pool is empty")]
    EmptyPool,
    #[display("rate profile is empty")]
    EmptyProfile,
    #[display("invalid event rate {rate} at month {month}")]
    InvalidRate { month: usize, rate: f64 },
    #[display("treatment factor must be finite and non-negative, got {factor}")]
    InvalidTreatmentFactor { factor: f64 },
    #[display("cohort has no individuals")]
    EmptyCohort,
    #[display("history of individual {individual} extends beyond month {max_months}")]
    HistoryOutOfRange {
        individual: usize,
        max_months: usize,
    },
}
