//! Binary event histories, by absolute month and by relative month.

use ndarray::{Array2, ArrayView1, Axis};

use crate::{
    align::AlignError,
    window::{MonthSeries, Window},
};

/// Month-by-individual matrix of binary event indicators.
///
/// Rows are absolute months `0..months()`, columns are individuals. A cell is
/// `1` iff at least one event was recorded for that individual in that month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryMatrix {
    data: Array2<u8>,
}

impl HistoryMatrix {
    /// Wraps a month-by-individual array. Any non-zero cell counts as an event.
    #[must_use]
    pub fn from_array(data: Array2<u8>) -> Self {
        Self {
            data: data.mapv(|v| u8::from(v != 0)),
        }
    }

    /// Builds a matrix by evaluating `f(month, individual)` for every cell.
    ///
    /// # Examples
    ///
    /// ```
    /// use permpower_stats::matrix::HistoryMatrix;
    ///
    /// let matrix = HistoryMatrix::from_fn(4, 2, |month, individual| month == individual);
    /// assert!(matrix.has_event(1, 1));
    /// assert!(!matrix.has_event(2, 1));
    /// ```
    pub fn from_fn<F>(months: usize, individuals: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> bool,
    {
        Self {
            data: Array2::from_shape_fn((months, individuals), |(m, i)| u8::from(f(m, i))),
        }
    }

    /// Builds a matrix from per-individual columns of equal length.
    ///
    /// # Panics
    ///
    /// Panics if the columns have different lengths.
    #[must_use]
    pub fn from_columns(columns: &[Vec<u8>]) -> Self {
        let months = columns.first().map_or(0, Vec::len);
        assert!(
            columns.iter().all(|c| c.len() == months),
            "all columns must span the same months"
        );
        Self::from_fn(months, columns.len(), |m, i| columns[i][m] != 0)
    }

    /// Number of absolute months (rows).
    #[must_use]
    pub fn months(&self) -> usize {
        self.data.nrows()
    }

    /// Number of individuals (columns).
    #[must_use]
    pub fn individuals(&self) -> usize {
        self.data.ncols()
    }

    #[must_use]
    pub fn has_event(&self, month: usize, individual: usize) -> bool {
        self.data[[month, individual]] != 0
    }

    /// The history of one individual, indexed by absolute month.
    #[must_use]
    pub fn column(&self, individual: usize) -> ArrayView1<'_, u8> {
        self.data.column(individual)
    }

    #[must_use]
    pub fn as_array(&self) -> &Array2<u8> {
        &self.data
    }
}

/// Histories re-indexed on each individual's entry month.
///
/// Rows are the relative months of [`window`](Self::window); row `0` holds
/// every individual's own entry month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedMatrix {
    window: Window,
    data: Array2<u8>,
}

impl AlignedMatrix {
    pub(crate) fn new(window: Window, data: Array2<u8>) -> Self {
        debug_assert_eq!(data.nrows(), window.len());
        Self { window, data }
    }

    #[must_use]
    pub fn window(&self) -> Window {
        self.window
    }

    #[must_use]
    pub fn individuals(&self) -> usize {
        self.data.ncols()
    }

    /// The indicators of all individuals at relative month `month`.
    #[must_use]
    pub fn row(&self, month: i64) -> Option<ArrayView1<'_, u8>> {
        let index = usize::try_from(month - self.window.first_month()).ok()?;
        (index < self.data.nrows()).then(|| self.data.row(index))
    }

    #[must_use]
    pub fn as_array(&self) -> &Array2<u8> {
        &self.data
    }

    /// Fraction of individuals with an event, per relative month.
    #[expect(clippy::cast_precision_loss)]
    pub fn event_rates(&self) -> Result<MonthSeries<f64>, AlignError> {
        let individuals = self.individuals();
        if individuals == 0 {
            return Err(AlignError::EmptyCohort);
        }
        let n = individuals as f64;
        let rates = self
            .data
            .axis_iter(Axis(0))
            .map(|row| row.iter().filter(|&&v| v != 0).count() as f64 / n)
            .collect();
        Ok(MonthSeries::new(self.window, rates))
    }
}
