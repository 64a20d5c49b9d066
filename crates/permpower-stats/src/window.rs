//! Relative-time windows around each individual's entry month.

use serde::{Deserialize, Serialize};

use crate::align::AlignError;

/// A fixed window of relative months around the alignment point.
///
/// Relative month `0` is the entry month of every individual. The window
/// covers `-pre_steps..post_steps`, i.e. `pre_steps` months before entry and
/// `post_steps` months at and after entry.
///
/// # Examples
///
/// ```
/// use permpower_stats::window::Window;
///
/// let window = Window::new(2, 3);
/// assert_eq!(window.len(), 5);
/// assert_eq!(window.months().collect::<Vec<_>>(), vec![-2, -1, 0, 1, 2]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Window {
    /// Number of months before the entry month.
    pub pre_steps: usize,
    /// Number of months from the entry month onward.
    pub post_steps: usize,
}

impl Default for Window {
    fn default() -> Self {
        Self::new(24, 24)
    }
}

impl Window {
    #[must_use]
    pub const fn new(pre_steps: usize, post_steps: usize) -> Self {
        Self {
            pre_steps,
            post_steps,
        }
    }

    /// Number of relative months covered by the window.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.pre_steps + self.post_steps
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The first relative month of the window (`-pre_steps`).
    #[expect(clippy::cast_possible_wrap)]
    #[must_use]
    pub const fn first_month(&self) -> i64 {
        -(self.pre_steps as i64)
    }

    /// Iterates the relative months `-pre_steps..post_steps` in order.
    #[expect(clippy::cast_possible_wrap)]
    pub fn months(&self) -> impl Iterator<Item = i64> + use<> {
        let first = self.first_month();
        (0..self.len()).map(move |i| first + i as i64)
    }

    /// Checks that the window fits into histories spanning `months` months.
    ///
    /// The pre and post slices of a rotated history overlap once the window
    /// is wider than the history, so that case is rejected rather than
    /// truncated.
    pub fn validate(&self, months: usize) -> Result<(), AlignError> {
        if self.is_empty() {
            return Err(AlignError::EmptyWindow);
        }
        if self.len() > months {
            return Err(AlignError::WindowOverflow {
                pre_steps: self.pre_steps,
                post_steps: self.post_steps,
                months,
            });
        }
        Ok(())
    }
}

/// Values labeled by consecutive relative months of a [`Window`].
///
/// Used for aggregate event rates as well as per-month p-values.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthSeries<T> {
    window: Window,
    values: Vec<T>,
}

impl<T> MonthSeries<T> {
    /// Labels `values` with the months of `window`.
    ///
    /// # Panics
    ///
    /// Panics if `values.len()` differs from the window length.
    #[must_use]
    pub fn new(window: Window, values: Vec<T>) -> Self {
        assert_eq!(
            values.len(),
            window.len(),
            "series length must match the window"
        );
        Self { window, values }
    }

    #[must_use]
    pub fn window(&self) -> Window {
        self.window
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    #[must_use]
    pub fn into_values(self) -> Vec<T> {
        self.values
    }

    /// Returns the value at relative month `month`, if it is inside the window.
    #[must_use]
    pub fn get(&self, month: i64) -> Option<&T> {
        let index = usize::try_from(month - self.window.first_month()).ok()?;
        self.values.get(index)
    }

    /// Iterates `(relative month, value)` pairs in month order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &T)> + '_ {
        self.window.months().zip(&self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_months_are_centered_on_entry() {
        let window = Window::new(3, 2);
        assert_eq!(window.first_month(), -3);
        assert_eq!(window.months().collect::<Vec<_>>(), vec![-3, -2, -1, 0, 1]);
    }

    #[test]
    fn test_validate_rejects_overflow() {
        let window = Window::new(6, 5);
        assert_eq!(
            window.validate(10),
            Err(AlignError::WindowOverflow {
                pre_steps: 6,
                post_steps: 5,
                months: 10,
            })
        );
        assert_eq!(window.validate(11), Ok(()));
    }

    #[test]
    fn test_validate_rejects_empty_window() {
        assert_eq!(Window::new(0, 0).validate(10), Err(AlignError::EmptyWindow));
    }

    #[test]
    fn test_series_lookup_by_relative_month() {
        let series = MonthSeries::new(Window::new(2, 2), vec![10, 20, 30, 40]);
        assert_eq!(series.get(-2), Some(&10));
        assert_eq!(series.get(0), Some(&30));
        assert_eq!(series.get(1), Some(&40));
        assert_eq!(series.get(2), None);
        assert_eq!(series.get(-3), None);
        assert_eq!(
            series.iter().map(|(m, v)| (m, *v)).collect::<Vec<_>>(),
            vec![(-2, 10), (-1, 20), (0, 30), (1, 40)]
        );
    }

    #[test]
    fn test_deserialize_fills_missing_steps() {
        let window: Window = serde_json::from_str(r#"{"pre_steps": 12}"#).unwrap();
        assert_eq!(window, Window::new(12, 24));
        let window: Window = serde_json::from_str("{}").unwrap();
        assert_eq!(window, Window::default());
    }

    #[test]
    #[should_panic(expected = "series length must match the window")]
    fn test_series_length_mismatch_panics() {
        let _ = MonthSeries::new(Window::new(1, 1), vec![1.0]);
    }
}
