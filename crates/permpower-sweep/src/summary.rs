//! Estimated power per configuration and relative month.

use permpower_stats::{
    descriptive::DescriptiveStats,
    window::{MonthSeries, Window},
};

use crate::table::{SweepRow, SweepTable};

/// Power estimate of one (cohort size, treatment factor) configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerCell {
    pub cohort_size: usize,
    pub treatment_factor: f64,
    /// Number of runs the estimate is based on.
    pub runs: usize,
    /// Fraction of runs with a p-value at or below alpha.
    pub power: MonthSeries<f64>,
    pub p_values: MonthSeries<DescriptiveStats>,
}

impl PowerCell {
    #[expect(clippy::cast_precision_loss)]
    fn from_rows(window: Window, rows: &[&SweepRow], alpha: f64) -> Self {
        let mut power = Vec::with_capacity(window.len());
        let mut p_values = Vec::with_capacity(window.len());
        for month_index in 0..window.len() {
            let values = rows
                .iter()
                .map(|row| row.p_values.values()[month_index])
                .collect::<Vec<_>>();
            let significant = values.iter().filter(|&&p| p <= alpha).count();
            power.push(significant as f64 / values.len() as f64);
            p_values.push(DescriptiveStats::new(values).expect("cell has at least one run"));
        }
        Self {
            cohort_size: rows[0].cohort_size,
            treatment_factor: rows[0].treatment_factor,
            runs: rows.len(),
            power: MonthSeries::new(window, power),
            p_values: MonthSeries::new(window, p_values),
        }
    }

    /// Mean power over the months from entry onward.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean_power_after_entry(&self) -> f64 {
        let post = self
            .power
            .iter()
            .filter(|(month, _)| *month >= 0)
            .map(|(_, p)| *p)
            .collect::<Vec<_>>();
        if post.is_empty() {
            return 0.0;
        }
        post.iter().sum::<f64>() / post.len() as f64
    }
}

/// Power estimates of every configuration of a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerSummary {
    pub alpha: f64,
    /// Configurations in the order they first appear in the table.
    pub cells: Vec<PowerCell>,
}

impl PowerSummary {
    /// Groups `table` rows by configuration and estimates power at level `alpha`.
    #[must_use]
    pub fn new(table: &SweepTable, alpha: f64) -> Self {
        let mut groups: Vec<Vec<&SweepRow>> = vec![];
        for row in table.rows() {
            let key = (row.cohort_size, row.treatment_factor.to_bits());
            match groups
                .iter_mut()
                .find(|g| (g[0].cohort_size, g[0].treatment_factor.to_bits()) == key)
            {
                Some(group) => group.push(row),
                None => groups.push(vec![row]),
            }
        }
        let cells = groups
            .iter()
            .map(|rows| PowerCell::from_rows(table.window(), rows, alpha))
            .collect();
        Self { alpha, cells }
    }

    /// Smallest cohort size whose mean post-entry power for `treatment_factor`
    /// reaches `target`.
    #[must_use]
    pub fn smallest_cohort_size(&self, treatment_factor: f64, target: f64) -> Option<usize> {
        self.cells
            .iter()
            .filter(|c| c.treatment_factor.to_bits() == treatment_factor.to_bits())
            .filter(|c| c.mean_power_after_entry() >= target)
            .map(|c| c.cohort_size)
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cohort_size: usize, treatment_factor: f64, run: usize, p: [f64; 4]) -> SweepRow {
        SweepRow {
            cohort_size,
            treatment_factor,
            permutations: 19,
            run,
            p_values: MonthSeries::new(Window::new(2, 2), p.to_vec()),
        }
    }

    fn table() -> SweepTable {
        let mut table = SweepTable::new(Window::new(2, 2));
        table.push(row(100, 0.6, 0, [0.5, 0.9, 0.05, 0.2]));
        table.push(row(100, 0.6, 1, [0.3, 0.7, 0.05, 0.05]));
        table.push(row(100, 0.9, 0, [0.6, 0.4, 0.5, 0.8]));
        table.push(row(200, 0.6, 0, [0.6, 0.8, 0.05, 0.05]));
        table
    }

    #[test]
    fn test_groups_rows_by_configuration() {
        let summary = PowerSummary::new(&table(), 0.05);
        let keys = summary
            .cells
            .iter()
            .map(|c| (c.cohort_size, c.treatment_factor, c.runs))
            .collect::<Vec<_>>();
        assert_eq!(keys, vec![(100, 0.6, 2), (100, 0.9, 1), (200, 0.6, 1)]);
    }

    #[test]
    fn test_power_is_fraction_of_significant_runs() {
        let summary = PowerSummary::new(&table(), 0.05);
        let cell = &summary.cells[0];
        assert_eq!(cell.power.values(), &[0.0, 0.0, 1.0, 0.5]);
        assert!((cell.mean_power_after_entry() - 0.75).abs() < 1e-12);

        let stats = cell.p_values.get(-2).unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.min, 0.3);
        assert_eq!(stats.max, 0.5);
        assert!((stats.mean - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_smallest_cohort_size() {
        let summary = PowerSummary::new(&table(), 0.05);
        assert_eq!(summary.smallest_cohort_size(0.6, 0.7), Some(100));
        assert_eq!(summary.smallest_cohort_size(0.6, 0.9), Some(200));
        assert_eq!(summary.smallest_cohort_size(0.9, 0.1), None);
        assert_eq!(summary.smallest_cohort_size(0.75, 0.0), None);
    }
}
