//! Synthetic cohorts: sampled entry offsets and simulated event histories.
//!
//! # Generative Model
//!
//! Every individual shares the baseline rate profile. From the individual's
//! entry month onward the rate is multiplied by the treatment factor:
//!
//! ```text
//! rate(month, j) = profile[month] * (treatment_factor if month >= entries[j] else 1)
//! count(month, j) ~ Poisson(rate(month, j))
//! event(month, j) = count(month, j) > 0
//! ```
//!
//! An entry at or beyond the end of the profile means the treatment never
//! applies within the observed window; that is not an error.

use permpower_stats::matrix::HistoryMatrix;
use rand::Rng;
use rand_distr::{Distribution as _, Poisson};

use crate::{
    SynthError,
    profile::{EntryPool, RateProfile},
};

/// Draws `n` entry offsets with replacement, uniformly over the pool entries.
///
/// # Errors
///
/// Returns [`SynthError::EmptyCohort`] if `n` is zero.
///
/// # Examples
///
/// ```
/// use permpower_synth::{profile::EntryPool, synthesize};
///
/// let pool = EntryPool::new(vec![12, 30, 48]).unwrap();
/// let entries = synthesize::sample_entries(&pool, 5, &mut rand::rng()).unwrap();
/// assert_eq!(entries.len(), 5);
/// assert!(entries.iter().all(|e| pool.offsets().contains(e)));
/// ```
pub fn sample_entries<R>(pool: &EntryPool, n: usize, rng: &mut R) -> Result<Vec<usize>, SynthError>
where
    R: Rng + ?Sized,
{
    if n == 0 {
        return Err(SynthError::EmptyCohort);
    }
    let offsets = pool.offsets();
    Ok((0..n)
        .map(|_| offsets[rng.random_range(0..offsets.len())])
        .collect())
}

/// Checks that `treatment_factor` is a usable rate multiplier.
///
/// # Errors
///
/// Returns [`SynthError::InvalidTreatmentFactor`] for negative or non-finite factors.
pub fn check_treatment_factor(treatment_factor: f64) -> Result<(), SynthError> {
    if treatment_factor.is_finite() && treatment_factor >= 0.0 {
        Ok(())
    } else {
        Err(SynthError::InvalidTreatmentFactor {
            factor: treatment_factor,
        })
    }
}

/// Poisson distribution with mean `rate`, or `None` when the count is always zero.
fn poisson(month: usize, rate: f64) -> Result<Option<Poisson<f64>>, SynthError> {
    if rate == 0.0 {
        return Ok(None);
    }
    Poisson::new(rate)
        .map(Some)
        .map_err(|_| SynthError::InvalidRate { month, rate })
}

/// Simulates one binary history per entry offset.
///
/// Returns a `profile.months() x entries.len()` matrix. Cells are drawn in
/// month-major order, so a seeded `rng` gives identical matrices for
/// identical inputs.
///
/// # Errors
///
/// Returns [`SynthError::EmptyCohort`] for empty `entries`,
/// [`SynthError::InvalidTreatmentFactor`] for negative or non-finite factors,
/// and [`SynthError::InvalidRate`] if an adjusted rate is too large for the
/// Poisson sampler.
pub fn simulate<R>(
    profile: &RateProfile,
    treatment_factor: f64,
    entries: &[usize],
    rng: &mut R,
) -> Result<HistoryMatrix, SynthError>
where
    R: Rng + ?Sized,
{
    check_treatment_factor(treatment_factor)?;
    if entries.is_empty() {
        return Err(SynthError::EmptyCohort);
    }

    let baseline = profile
        .rates()
        .iter()
        .enumerate()
        .map(|(month, &rate)| poisson(month, rate))
        .collect::<Result<Vec<_>, _>>()?;
    let treated = profile
        .rates()
        .iter()
        .enumerate()
        .map(|(month, &rate)| poisson(month, rate * treatment_factor))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(HistoryMatrix::from_fn(
        profile.months(),
        entries.len(),
        |month, individual| {
            let dist = if month >= entries[individual] {
                &treated[month]
            } else {
                &baseline[month]
            };
            dist.as_ref().is_some_and(|d| d.sample(&mut *rng) > 0.0)
        },
    ))
}
