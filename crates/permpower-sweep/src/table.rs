//! Long-format p-value table produced by a sweep.

use permpower_stats::window::{MonthSeries, Window};

/// P-values of one run of one (cohort size, treatment factor) configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepRow {
    pub cohort_size: usize,
    pub treatment_factor: f64,
    pub permutations: usize,
    /// Run index within the configuration, starting at `0`.
    pub run: usize,
    pub p_values: MonthSeries<f64>,
}

/// Rows of a sweep in sweep order, all sharing one window.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepTable {
    window: Window,
    rows: Vec<SweepRow>,
}

/// Names of the tag columns following the month columns.
pub const TAG_COLUMNS: [&str; 4] = ["n_people", "treatment_factor", "n_perm", "run"];

impl SweepTable {
    #[must_use]
    pub fn new(window: Window) -> Self {
        Self {
            window,
            rows: vec![],
        }
    }

    /// Appends a row.
    ///
    /// # Panics
    ///
    /// Panics if the row's p-values use a different window than the table.
    pub fn push(&mut self, row: SweepRow) {
        assert_eq!(
            row.p_values.window(),
            self.window,
            "row window must match the table"
        );
        self.rows.push(row);
    }

    #[must_use]
    pub fn window(&self) -> Window {
        self.window
    }

    #[must_use]
    pub fn rows(&self) -> &[SweepRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names: one per relative month, then the tag columns.
    #[must_use]
    pub fn header(&self) -> Vec<String> {
        self.window
            .months()
            .map(|m| m.to_string())
            .chain(TAG_COLUMNS.iter().map(|s| (*s).to_owned()))
            .collect()
    }

    /// Rows rendered as text fields in [`header`](Self::header) order.
    pub fn records(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.rows.iter().map(|row| {
            row.p_values
                .values()
                .iter()
                .map(f64::to_string)
                .chain([
                    row.cohort_size.to_string(),
                    row.treatment_factor.to_string(),
                    row.permutations.to_string(),
                    row.run.to_string(),
                ])
                .collect()
        })
    }
}
