//! Empirical p-values from a permutation null distribution.
//!
//! The observed statistic is ranked among `{observed, null_1, ..., null_n}`
//! and the p-value is `(rank + 1) / (n + 1)`, where `rank` is the 0-indexed
//! position of the observed value after a stable sort with the observed value
//! placed first. Ties between the observed value and null samples therefore
//! rank the observed value *before* the tied nulls, which yields the smallest
//! p-value consistent with the ordering.
//!
//! Every p-value lies in `[1 / (n + 1), 1]`.

use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Direction of the permutation test.
///
/// [`Less`](Self::Less) tests whether the observed rate is unusually *low*,
/// i.e. whether the treatment suppresses events. It is the default.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alternative {
    /// Small p-value when the observed value is low relative to the null.
    #[default]
    Less,
    /// Small p-value when the observed value is high relative to the null.
    Greater,
    /// Twice the smaller one-sided p-value, capped at 1.
    TwoSided,
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Less => "less",
            Self::Greater => "greater",
            Self::TwoSided => "two-sided",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown alternative '{input}' (expected less, greater or two-sided)")]
pub struct ParseAlternativeError {
    input: String,
}

impl FromStr for Alternative {
    type Err = ParseAlternativeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "less" => Ok(Self::Less),
            "greater" => Ok(Self::Greater),
            "two-sided" | "two_sided" | "twosided" => Ok(Self::TwoSided),
            _ => Err(ParseAlternativeError {
                input: s.to_owned(),
            }),
        }
    }
}

/// Computes the empirical p-value of `observed` against `nulls`.
///
/// Counting strictly smaller (or larger) null samples is equivalent to the
/// stable-sort rank described in the module documentation.
///
/// # Examples
///
/// ```
/// use permpower_stats::p_value::{Alternative, empirical_p_value};
///
/// let nulls = [0.2, 0.3, 0.4, 0.5];
/// // lowest value: rank 0
/// assert_eq!(empirical_p_value(0.1, nulls, Alternative::Less), 0.2);
/// // two nulls below: rank 2
/// assert_eq!(empirical_p_value(0.35, nulls, Alternative::Less), 0.6);
/// assert_eq!(empirical_p_value(0.35, nulls, Alternative::Greater), 0.6);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn empirical_p_value<I>(observed: f64, nulls: I, alternative: Alternative) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut below = 0_usize;
    let mut above = 0_usize;
    let mut total = 0_usize;
    for null in nulls {
        total += 1;
        match null.total_cmp(&observed) {
            Ordering::Less => below += 1,
            Ordering::Greater => above += 1,
            Ordering::Equal => {}
        }
    }
    let denominator = (total + 1) as f64;
    let less = (below + 1) as f64 / denominator;
    let greater = (above + 1) as f64 / denominator;
    match alternative {
        Alternative::Less => less,
        Alternative::Greater => greater,
        Alternative::TwoSided => (2.0 * less.min(greater)).min(1.0),
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _};
    use rand_pcg::Pcg32;

    use super::*;

    /// Rank of the observed value (index 0) after a stable ascending sort.
    #[expect(clippy::cast_precision_loss)]
    fn stable_sort_p_value(observed: f64, nulls: &[f64]) -> f64 {
        let mut stacked = vec![observed];
        stacked.extend_from_slice(nulls);
        let mut indices: Vec<usize> = (0..stacked.len()).collect();
        indices.sort_by(|&a, &b| stacked[a].total_cmp(&stacked[b]));
        let rank = indices.iter().position(|&i| i == 0).unwrap();
        (rank + 1) as f64 / stacked.len() as f64
    }

    #[test]
    fn test_counting_matches_stable_sort_rank() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..200 {
            // coarse values so that ties are frequent
            let nulls: Vec<f64> = (0..19).map(|_| f64::from(rng.random_range(0..5_u8))).collect();
            let observed = f64::from(rng.random_range(0..5_u8));
            assert_eq!(
                empirical_p_value(observed, nulls.iter().copied(), Alternative::Less),
                stable_sort_p_value(observed, &nulls)
            );
        }
    }

    #[test]
    fn test_ties_favor_observed() {
        let p = empirical_p_value(0.5, [0.5, 0.5, 0.5], Alternative::Less);
        assert_eq!(p, 0.25);
    }

    #[test]
    fn test_bounds() {
        let nulls = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9];
        for alternative in [Alternative::Less, Alternative::Greater, Alternative::TwoSided] {
            for observed in [0.0, 0.15, 0.5, 0.95, 1.0] {
                let p = empirical_p_value(observed, nulls, alternative);
                assert!((0.1..=1.0).contains(&p), "{alternative}: {p}");
            }
        }
        assert_eq!(empirical_p_value(1.0, nulls, Alternative::Less), 1.0);
        assert_eq!(empirical_p_value(0.0, nulls, Alternative::Less), 0.1);
    }

    #[test]
    fn test_greater_and_two_sided() {
        let nulls = [0.1, 0.2, 0.3];
        assert_eq!(empirical_p_value(0.9, nulls, Alternative::Greater), 0.25);
        assert_eq!(empirical_p_value(0.9, nulls, Alternative::Less), 1.0);
        assert_eq!(empirical_p_value(0.9, nulls, Alternative::TwoSided), 0.5);
        assert_eq!(empirical_p_value(0.2, nulls, Alternative::TwoSided), 1.0);
    }

    #[test]
    fn test_alternative_parsing_and_display() {
        for alternative in [Alternative::Less, Alternative::Greater, Alternative::TwoSided] {
            assert_eq!(alternative.to_string().parse(), Ok(alternative));
        }
        assert_eq!("TwoSided".parse(), Ok(Alternative::TwoSided));
        assert!("both".parse::<Alternative>().is_err());
        assert_eq!(
            serde_json::to_string(&Alternative::TwoSided).unwrap(),
            "\"two-sided\""
        );
    }
}
