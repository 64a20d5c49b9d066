//! Permutation test on aligned event rates.
//!
//! The null hypothesis is that the timing of events is unrelated to each
//! individual's entry month. Under the null, reassigning the observed entry
//! offsets among individuals leaves the distribution of the aligned rate curve
//! unchanged, so shuffled offsets produce draws from the null distribution.
//!
//! # Procedure
//!
//! 1. Align the histories on the true offsets and average per relative month
//!    (the observed rate curve)
//! 2. Repeat `permutations` times: shuffle the offsets across individuals,
//!    align, and average (one null rate curve)
//! 3. For each relative month independently, rank the observed rate among the
//!    null rates and convert the rank into an empirical p-value
//!    (see [`p_value`](crate::p_value))

use rand::{Rng, seq::SliceRandom as _};

use crate::{
    align::{self, AlignError},
    matrix::HistoryMatrix,
    p_value::{self, Alternative},
    window::{MonthSeries, Window},
};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PermutationError {
    #[display("{_0}")]
    Align(#[error(not(source))] AlignError),
    #[display("permutation test needs at least one permutation")]
    NoPermutations,
}

impl From<AlignError> for PermutationError {
    fn from(err: AlignError) -> Self {
        Self::Align(err)
    }
}

/// Configuration of a permutation test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermutationTest {
    /// Relative months to test.
    pub window: Window,
    /// Number of null samples drawn per test.
    pub permutations: usize,
    /// Direction of the test.
    pub alternative: Alternative,
}

/// Result of a single permutation test.
#[derive(Debug, Clone, PartialEq)]
pub struct PermutationOutcome {
    /// Event rate per relative month with the true offsets.
    pub observed: MonthSeries<f64>,
    /// Empirical p-value per relative month.
    pub p_values: MonthSeries<f64>,
}

impl PermutationTest {
    #[must_use]
    pub const fn new(window: Window, permutations: usize) -> Self {
        Self {
            window,
            permutations,
            alternative: Alternative::Less,
        }
    }

    #[must_use]
    pub const fn with_alternative(self, alternative: Alternative) -> Self {
        Self {
            alternative,
            ..self
        }
    }

    /// Event rate per relative month with the true offsets.
    pub fn observed_rates(
        &self,
        matrix: &HistoryMatrix,
        offsets: &[usize],
    ) -> Result<MonthSeries<f64>, AlignError> {
        align::align_window(matrix, offsets, self.window)?.event_rates()
    }

    /// Draws one rate curve from the permutation null distribution.
    ///
    /// The offsets are reassigned among individuals by a uniform random
    /// permutation; their values are not regenerated.
    pub fn null_sample<R>(
        &self,
        matrix: &HistoryMatrix,
        offsets: &[usize],
        rng: &mut R,
    ) -> Result<MonthSeries<f64>, AlignError>
    where
        R: Rng + ?Sized,
    {
        let mut shuffled = offsets.to_vec();
        shuffled.shuffle(rng);
        self.observed_rates(matrix, &shuffled)
    }

    /// Runs the full test: observed rates, `permutations` null samples and
    /// a p-value per relative month.
    ///
    /// # Errors
    ///
    /// Returns [`PermutationError::NoPermutations`] if `permutations` is zero,
    /// and propagates alignment errors for invalid offsets or windows.
    pub fn run<R>(
        &self,
        matrix: &HistoryMatrix,
        offsets: &[usize],
        rng: &mut R,
    ) -> Result<PermutationOutcome, PermutationError>
    where
        R: Rng + ?Sized,
    {
        if self.permutations == 0 {
            return Err(PermutationError::NoPermutations);
        }
        let observed = self.observed_rates(matrix, offsets)?;

        let nulls = (0..self.permutations)
            .map(|_| self.null_sample(matrix, offsets, &mut *rng))
            .collect::<Result<Vec<_>, _>>()?;

        let p_values = observed
            .values()
            .iter()
            .enumerate()
            .map(|(month_index, &rate)| {
                p_value::empirical_p_value(
                    rate,
                    nulls.iter().map(|null| null.values()[month_index]),
                    self.alternative,
                )
            })
            .collect();

        Ok(PermutationOutcome {
            p_values: MonthSeries::new(self.window, p_values),
            observed,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    /// Every individual has events only from its entry month onward.
    fn step_cohort(months: usize, offsets: &[usize]) -> HistoryMatrix {
        HistoryMatrix::from_fn(months, offsets.len(), |month, i| month >= offsets[i])
    }

    fn spread_offsets(individuals: usize, months: usize) -> Vec<usize> {
        (0..individuals).map(|i| 4 + (i * 7) % (months - 8)).collect()
    }

    #[test]
    fn test_p_values_within_bounds() {
        let offsets = spread_offsets(40, 30);
        let matrix = step_cohort(30, &offsets);
        let test = PermutationTest::new(Window::new(4, 4), 19);
        let mut rng = Pcg32::seed_from_u64(1);
        let outcome = test.run(&matrix, &offsets, &mut rng).unwrap();
        assert_eq!(outcome.p_values.len(), 8);
        for &p in outcome.p_values.values() {
            assert!((0.05..=1.0).contains(&p), "p-value {p} out of bounds");
        }
    }

    #[test]
    fn test_detects_suppression_after_entry() {
        // events everywhere except at and after entry
        let months = 30;
        let offsets = spread_offsets(60, months);
        let matrix = HistoryMatrix::from_fn(months, offsets.len(), |month, i| month < offsets[i]);
        let test = PermutationTest::new(Window::new(3, 3), 99);
        let mut rng = Pcg32::seed_from_u64(5);
        let outcome = test.run(&matrix, &offsets, &mut rng).unwrap();

        for month in 0..3 {
            assert_eq!(outcome.observed.get(month), Some(&0.0));
            assert!(*outcome.p_values.get(month).unwrap() <= 0.05);
        }
        for month in -3..0 {
            assert_eq!(outcome.observed.get(month), Some(&1.0));
            assert_eq!(outcome.p_values.get(month), Some(&1.0));
        }
    }

    #[test]
    fn test_greater_alternative_detects_increase() {
        let months = 30;
        let offsets = spread_offsets(60, months);
        let matrix = step_cohort(months, &offsets);
        let test = PermutationTest::new(Window::new(3, 3), 99).with_alternative(Alternative::Greater);
        let mut rng = Pcg32::seed_from_u64(9);
        let outcome = test.run(&matrix, &offsets, &mut rng).unwrap();
        for month in 0..3 {
            assert!(*outcome.p_values.get(month).unwrap() <= 0.05);
        }
    }

    #[test]
    fn test_null_sample_keeps_offset_values() {
        // with identical offsets, shuffling cannot change the aligned rates
        let offsets = vec![5; 10];
        let matrix = HistoryMatrix::from_fn(12, 10, |month, i| (month + i) % 3 == 0);
        let test = PermutationTest::new(Window::new(2, 2), 1);
        let mut rng = Pcg32::seed_from_u64(2);
        let observed = test.observed_rates(&matrix, &offsets).unwrap();
        let null = test.null_sample(&matrix, &offsets, &mut rng).unwrap();
        assert_eq!(observed, null);
    }

    #[test]
    fn test_run_ranks_against_null_samples() {
        let offsets = spread_offsets(30, 24);
        let matrix = HistoryMatrix::from_fn(24, 30, |month, i| (month * 7 + i * 3) % 4 == 0);
        let test = PermutationTest::new(Window::new(3, 3), 29);

        let outcome = test
            .run(&matrix, &offsets, &mut Pcg32::seed_from_u64(8))
            .unwrap();

        let mut rng = Pcg32::seed_from_u64(8);
        let nulls = (0..29)
            .map(|_| test.null_sample(&matrix, &offsets, &mut rng).unwrap())
            .collect::<Vec<_>>();
        for (index, (month, &observed)) in outcome.observed.iter().enumerate() {
            let expected = p_value::empirical_p_value(
                observed,
                nulls.iter().map(|null| null.values()[index]),
                Alternative::Less,
            );
            assert_eq!(outcome.p_values.get(month), Some(&expected));
        }
    }

    #[test]
    fn test_reproducible_with_seed() {
        let offsets = spread_offsets(25, 20);
        let matrix = HistoryMatrix::from_fn(20, 25, |month, i| (month * 31 + i * 17) % 5 == 0);
        let test = PermutationTest::new(Window::new(3, 5), 49);
        let first = test
            .run(&matrix, &offsets, &mut Pcg32::seed_from_u64(42))
            .unwrap();
        let second = test
            .run(&matrix, &offsets, &mut Pcg32::seed_from_u64(42))
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rejects_zero_permutations() {
        let matrix = step_cohort(10, &[1, 2]);
        let test = PermutationTest::new(Window::new(2, 2), 0);
        let result = test.run(&matrix, &[1, 2], &mut Pcg32::seed_from_u64(0));
        assert_eq!(result, Err(PermutationError::NoPermutations));
    }

    #[test]
    fn test_propagates_invalid_offset() {
        let matrix = step_cohort(10, &[1, 2]);
        let test = PermutationTest::new(Window::new(2, 2), 5);
        let result = test.run(&matrix, &[1, 10], &mut Pcg32::seed_from_u64(0));
        assert_eq!(
            result,
            Err(PermutationError::Align(AlignError::InvalidOffset {
                individual: 1,
                offset: 10,
                months: 10,
            }))
        );
    }
}
