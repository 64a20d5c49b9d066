//! Circular realignment of individual histories on their entry months.
//!
//! Each individual's history column is rotated upwards so that the row at the
//! individual's offset becomes row `0`. Values rotated past the top reappear
//! at the bottom, so after rotation the months *before* the offset sit at the
//! end of the column:
//!
//! ```text
//! month:    0 1 2 3 4 5        offset = 2
//! history:  a b c d e f
//! rotated:  c d e f a b
//!           ^ entry    ^^^ pre-entry months wrapped to the bottom
//! ```
//!
//! [`align_window`] then stacks the last `pre_steps` rotated rows above the
//! first `post_steps` rows, giving a matrix labeled by relative month.
//!
//! Both operations compute every output cell directly from a row index and the
//! column's offset, `(row + offset) mod months`, without per-column loops.

use ndarray::Array2;

use crate::{
    matrix::{AlignedMatrix, HistoryMatrix},
    window::Window,
};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum AlignError {
    #[display(
        "offset {offset} of individual {individual} is outside the {months} observed months"
    )]
    InvalidOffset {
        individual: usize,
        offset: usize,
        months: usize,
    },
    #[display("got {offsets} offsets for {individuals} individuals")]
    OffsetCountMismatch { offsets: usize, individuals: usize },
    #[display(
        "window of {pre_steps} pre and {post_steps} post months exceeds the {months} observed months"
    )]
    WindowOverflow {
        pre_steps: usize,
        post_steps: usize,
        months: usize,
    },
    #[display("window must span at least one month")]
    EmptyWindow,
    #[display("cohort has no individuals")]
    EmptyCohort,
}

fn check_offsets(matrix: &HistoryMatrix, offsets: &[usize]) -> Result<(), AlignError> {
    if offsets.len() != matrix.individuals() {
        return Err(AlignError::OffsetCountMismatch {
            offsets: offsets.len(),
            individuals: matrix.individuals(),
        });
    }
    let months = matrix.months();
    if let Some((individual, &offset)) = offsets.iter().enumerate().find(|(_, o)| **o >= months) {
        return Err(AlignError::InvalidOffset {
            individual,
            offset,
            months,
        });
    }
    Ok(())
}

/// Rotates each column so that the row at its offset becomes row `0`.
///
/// Output row `i` of column `j` is input row `(i + offsets[j]) mod months`.
///
/// # Errors
///
/// Returns [`AlignError::InvalidOffset`] if any offset is not below
/// `matrix.months()`, and [`AlignError::OffsetCountMismatch`] if there is not
/// exactly one offset per individual. Nothing is rotated in either case.
///
/// # Examples
///
/// ```
/// use permpower_stats::{align, matrix::HistoryMatrix};
///
/// let matrix = HistoryMatrix::from_columns(&[vec![1, 0, 0, 0]]);
/// let rotated = align::rotate(&matrix, &[3]).unwrap();
/// assert_eq!(rotated.column(0).to_vec(), vec![0, 1, 0, 0]);
/// ```
pub fn rotate(matrix: &HistoryMatrix, offsets: &[usize]) -> Result<HistoryMatrix, AlignError> {
    check_offsets(matrix, offsets)?;
    let months = matrix.months();
    let source = matrix.as_array();
    let rotated = Array2::from_shape_fn(source.dim(), |(row, col)| {
        source[[(row + offsets[col]) % months, col]]
    });
    Ok(HistoryMatrix::from_array(rotated))
}

/// Aligns histories on their offsets and cuts out `window` around the entry month.
///
/// Equivalent to [`rotate`] followed by stacking the last `window.pre_steps`
/// rows above the first `window.post_steps` rows, without materializing the
/// full rotated matrix.
///
/// # Errors
///
/// Returns [`AlignError::EmptyWindow`] or [`AlignError::WindowOverflow`] if the
/// window does not fit the histories, and the offset errors of [`rotate`].
pub fn align_window(
    matrix: &HistoryMatrix,
    offsets: &[usize],
    window: Window,
) -> Result<AlignedMatrix, AlignError> {
    window.validate(matrix.months())?;
    check_offsets(matrix, offsets)?;
    let months = matrix.months();
    // rotated row of window row k is (k + months - pre_steps) mod months
    let skip = months - window.pre_steps;
    let source = matrix.as_array();
    let data = Array2::from_shape_fn((window.len(), matrix.individuals()), |(row, col)| {
        source[[(row + skip + offsets[col]) % months, col]]
    });
    Ok(AlignedMatrix::new(window, data))
}
