//! Power sweep over cohort sizes, treatment factors and repeated runs.
//!
//! # Seeding
//!
//! Cells are numbered in sweep order. Cell `k` uses `seed.child(k)`, and the
//! three randomness sources inside a cell (entry sampling, Poisson draws and
//! offset shuffles) use the grandchildren `0`, `1` and `2`. Any cell can be
//! recomputed in isolation with [`PowerSweep::run_cell`] and gives the same
//! row as in the full sweep.

use permpower_stats::{permutation::PermutationTest, seed::Seed};
use permpower_synth::{
    profile::{EntryPool, RateProfile},
    synthesize,
};

use crate::{
    SweepError,
    config::{ConfigError, SweepConfig},
    table::{SweepRow, SweepTable},
};

const ENTRY_STREAM: u64 = 0;
const POISSON_STREAM: u64 = 1;
const SHUFFLE_STREAM: u64 = 2;

/// One (cohort size, treatment factor, run) combination of a sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepCell {
    /// Position in sweep order.
    pub index: usize,
    pub cohort_size: usize,
    pub treatment_factor: f64,
    pub run: usize,
}

/// A validated sweep, ready to run.
#[derive(Debug, Clone)]
pub struct PowerSweep {
    config: SweepConfig,
    profile: RateProfile,
    pool: EntryPool,
    seed: Seed,
    test: PermutationTest,
}

impl PowerSweep {
    /// Validates `config` against the inputs and fixes the root seed.
    ///
    /// Cohort sizes and treatment factors are swept in ascending order;
    /// duplicates are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SweepError::Config`] if the configuration is rejected by
    /// [`SweepConfig::validate`] or the pool holds an entry offset outside
    /// the rate profile.
    pub fn new(
        mut config: SweepConfig,
        profile: RateProfile,
        pool: EntryPool,
    ) -> Result<Self, SweepError> {
        config.validate(profile.months())?;
        if let Some(&offset) = pool.offsets().iter().find(|&&o| o >= profile.months()) {
            return Err(ConfigError::EntryOutsideProfile {
                offset,
                months: profile.months(),
            }
            .into());
        }

        config.cohort_sizes.sort_unstable();
        config.cohort_sizes.dedup();
        config.treatment_factors.sort_by(f64::total_cmp);
        config.treatment_factors.dedup();

        let seed = config.seed.unwrap_or_else(Seed::random);
        config.seed = Some(seed);
        let test = PermutationTest::new(config.window, config.permutations)
            .with_alternative(config.alternative);

        Ok(Self {
            config,
            profile,
            pool,
            seed,
            test,
        })
    }

    /// The normalized configuration, with the root seed filled in.
    #[must_use]
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    #[must_use]
    pub fn seed(&self) -> Seed {
        self.seed
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.config.row_count()
    }

    /// Cells in sweep order: cohort sizes, then treatment factors, then runs.
    pub fn cells(&self) -> impl Iterator<Item = SweepCell> + '_ {
        let runs = self.config.runs;
        self.config
            .cohort_sizes
            .iter()
            .flat_map(move |&cohort_size| {
                self.config
                    .treatment_factors
                    .iter()
                    .flat_map(move |&treatment_factor| {
                        (0..runs).map(move |run| (cohort_size, treatment_factor, run))
                    })
            })
            .enumerate()
            .map(|(index, (cohort_size, treatment_factor, run))| SweepCell {
                index,
                cohort_size,
                treatment_factor,
                run,
            })
    }

    /// Simulates one cohort and tests it.
    ///
    /// # Errors
    ///
    /// Propagates synthesis and permutation-test errors.
    pub fn run_cell(&self, cell: SweepCell) -> Result<SweepRow, SweepError> {
        let seed = self.seed.child(cell.index as u64);

        let entries = synthesize::sample_entries(
            &self.pool,
            cell.cohort_size,
            &mut seed.child(ENTRY_STREAM).rng(),
        )?;
        let histories = synthesize::simulate(
            &self.profile,
            cell.treatment_factor,
            &entries,
            &mut seed.child(POISSON_STREAM).rng(),
        )?;
        let outcome = self
            .test
            .run(&histories, &entries, &mut seed.child(SHUFFLE_STREAM).rng())?;

        Ok(SweepRow {
            cohort_size: cell.cohort_size,
            treatment_factor: cell.treatment_factor,
            permutations: self.config.permutations,
            run: cell.run,
            p_values: outcome.p_values,
        })
    }

    /// Runs every cell in sweep order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing cell and returns its error.
    pub fn run(&self) -> Result<SweepTable, SweepError> {
        log::info!(
            "sweep: {} cohort sizes x {} treatment factors x {} runs, {} permutations, seed {}",
            self.config.cohort_sizes.len(),
            self.config.treatment_factors.len(),
            self.config.runs,
            self.config.permutations,
            self.seed,
        );

        let mut table = SweepTable::new(self.config.window);
        for cell in self.cells() {
            if cell.run == 0 {
                log::info!(
                    "n_people: {} - treatment_factor: {:.3}",
                    cell.cohort_size,
                    cell.treatment_factor
                );
            }
            log::debug!("  run {}/{}", cell.run + 1, self.config.runs);
            table.push(self.run_cell(cell)?);
        }
        Ok(table)
    }
}
