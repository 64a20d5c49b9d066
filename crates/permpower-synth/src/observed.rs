//! Derivation of simulation inputs from observed, already cleaned histories.
//!
//! Each observed individual contributes a run of consecutive valid monthly
//! indicators starting at `start_month` (months since the reference
//! birthday) and an entry month. The rate profile is the mean indicator per
//! absolute month over the individuals observed in that month; the entry pool
//! is the list of entry months.

use serde::{Deserialize, Serialize};

use crate::{
    SynthError,
    profile::{EntryPool, RateProfile},
};

/// Latest absolute month an observed history may reach (200 years).
pub const MAX_MONTHS: usize = 12 * 200;

/// Valid monthly event indicators of one observed individual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedHistory {
    /// First valid month, counted from the reference birthday.
    pub start_month: usize,
    /// Month at which the treatment period begins.
    pub entry_month: usize,
    /// Indicators for the consecutive months from `start_month`; non-zero means an event.
    pub events: Vec<u8>,
}

impl ObservedHistory {
    /// One past the last valid month, or `None` if that overflows `usize`.
    #[must_use]
    pub fn end_month(&self) -> Option<usize> {
        self.start_month.checked_add(self.events.len())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedCohort {
    histories: Vec<ObservedHistory>,
}

impl ObservedCohort {
    /// # Errors
    ///
    /// Returns [`SynthError::EmptyCohort`] if `histories` is empty, and
    /// [`SynthError::HistoryOutOfRange`] if a history ends after [`MAX_MONTHS`].
    pub fn new(histories: Vec<ObservedHistory>) -> Result<Self, SynthError> {
        if histories.is_empty() {
            return Err(SynthError::EmptyCohort);
        }
        if let Some(individual) = histories
            .iter()
            .position(|h| h.end_month().is_none_or(|end| end > MAX_MONTHS))
        {
            return Err(SynthError::HistoryOutOfRange {
                individual,
                max_months: MAX_MONTHS,
            });
        }
        Ok(Self { histories })
    }

    #[must_use]
    pub fn histories(&self) -> &[ObservedHistory] {
        &self.histories
    }

    /// Entry months of all observed individuals.
    pub fn entry_pool(&self) -> Result<EntryPool, SynthError> {
        EntryPool::new(self.histories.iter().map(|h| h.entry_month).collect())
    }

    /// Mean event indicator per absolute month, from month `0` to the last
    /// observed month.
    ///
    /// Months in which no individual was observed get rate `0` and are
    /// reported with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`SynthError::EmptyProfile`] if no history has any valid month.
    #[expect(clippy::cast_precision_loss)]
    pub fn rate_profile(&self) -> Result<RateProfile, SynthError> {
        let months = self
            .histories
            .iter()
            .filter_map(ObservedHistory::end_month)
            .max()
            .unwrap_or(0);
        let mut events = vec![0_usize; months];
        let mut observed = vec![0_usize; months];
        for history in &self.histories {
            for (offset, &value) in history.events.iter().enumerate() {
                let month = history.start_month + offset;
                observed[month] += 1;
                events[month] += usize::from(value != 0);
            }
        }

        let unobserved = observed.iter().filter(|&&n| n == 0).count();
        if unobserved > 0 {
            log::warn!("{unobserved} of {months} months have no observations; using rate 0");
        }

        let rates = events
            .iter()
            .zip(&observed)
            .map(|(&e, &n)| if n == 0 { 0.0 } else { e as f64 / n as f64 })
            .collect();
        RateProfile::new(rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(start_month: usize, entry_month: usize, events: &[u8]) -> ObservedHistory {
        ObservedHistory {
            start_month,
            entry_month,
            events: events.to_vec(),
        }
    }

    #[test]
    fn test_rate_profile_averages_overlapping_months() {
        let cohort = ObservedCohort::new(vec![
            history(0, 2, &[1, 0, 1, 1]),
            history(2, 3, &[0, 1, 1]),
        ])
        .unwrap();
        let profile = cohort.rate_profile().unwrap();
        assert_eq!(profile.rates(), &[1.0, 0.0, 0.5, 1.0, 1.0]);
    }

    #[test]
    fn test_rate_profile_fills_unobserved_months_with_zero() {
        let cohort = ObservedCohort::new(vec![history(3, 4, &[1, 1])]).unwrap();
        let profile = cohort.rate_profile().unwrap();
        assert_eq!(profile.rates(), &[0.0, 0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_entry_pool_lists_entry_months() {
        let cohort =
            ObservedCohort::new(vec![history(0, 7, &[0]), history(1, 9, &[1])]).unwrap();
        assert_eq!(cohort.entry_pool().unwrap().offsets(), &[7, 9]);
    }

    #[test]
    fn test_errors() {
        assert_eq!(ObservedCohort::new(vec![]), Err(SynthError::EmptyCohort));
        let cohort = ObservedCohort::new(vec![history(0, 0, &[])]).unwrap();
        assert_eq!(cohort.rate_profile(), Err(SynthError::EmptyProfile));
    }

    #[test]
    fn test_deserialize_history() {
        let json = r#"{"start_month": 2, "entry_month": 5, "events": [0, 1, 0]}"#;
        let history: ObservedHistory = serde_json::from_str(json).unwrap();
        assert_eq!(history.end_month(), Some(5));
    }

    #[test]
    fn test_rejects_histories_out_of_range() {
        let overflowing = history(usize::MAX, 0, &[1]);
        assert_eq!(overflowing.end_month(), None);
        assert_eq!(
            ObservedCohort::new(vec![history(0, 1, &[0]), overflowing]),
            Err(SynthError::HistoryOutOfRange {
                individual: 1,
                max_months: MAX_MONTHS,
            })
        );
        assert_eq!(
            ObservedCohort::new(vec![history(1_000_000_000_000, 0, &[1])]),
            Err(SynthError::HistoryOutOfRange {
                individual: 0,
                max_months: MAX_MONTHS,
            })
        );
        assert!(ObservedCohort::new(vec![history(MAX_MONTHS - 2, 0, &[1, 0])]).is_ok());
    }
}
