//! Read-only simulation inputs: the entry-offset pool and the rate profile.

use serde::{Deserialize, Serialize};

use crate::SynthError;

/// Empirical per-month event rates, indexed by absolute month.
///
/// Every rate is finite and non-negative, and the profile spans at least one
/// month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct RateProfile {
    rates: Vec<f64>,
}

impl RateProfile {
    /// Validates and wraps per-month rates.
    ///
    /// # Errors
    ///
    /// Returns [`SynthError::EmptyProfile`] for an empty profile and
    /// [`SynthError::InvalidRate`] for a negative or non-finite rate.
    pub fn new(rates: Vec<f64>) -> Result<Self, SynthError> {
        if rates.is_empty() {
            return Err(SynthError::EmptyProfile);
        }
        if let Some((month, &rate)) = rates
            .iter()
            .enumerate()
            .find(|(_, r)| !r.is_finite() || **r < 0.0)
        {
            return Err(SynthError::InvalidRate { month, rate });
        }
        Ok(Self { rates })
    }

    /// Number of months spanned by the profile.
    #[must_use]
    pub fn months(&self) -> usize {
        self.rates.len()
    }

    #[must_use]
    pub fn rates(&self) -> &[f64] {
        &self.rates
    }
}

impl TryFrom<Vec<f64>> for RateProfile {
    type Error = SynthError;

    fn try_from(rates: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(rates)
    }
}

impl From<RateProfile> for Vec<f64> {
    fn from(profile: RateProfile) -> Self {
        profile.rates
    }
}

/// Observed entry offsets (months since the reference birthday) to sample from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct EntryPool {
    offsets: Vec<usize>,
}

impl EntryPool {
    /// # Errors
    ///
    /// Returns [`SynthError::EmptyPool`] if `offsets` is empty.
    pub fn new(offsets: Vec<usize>) -> Result<Self, SynthError> {
        if offsets.is_empty() {
            return Err(SynthError::EmptyPool);
        }
        Ok(Self { offsets })
    }

    #[must_use]
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Always `false` for a constructed pool.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Number of pool entries whose offset lies outside a profile of `months` months.
    #[must_use]
    pub fn count_outside(&self, months: usize) -> usize {
        self.offsets.iter().filter(|&&o| o >= months).count()
    }
}

impl TryFrom<Vec<usize>> for EntryPool {
    type Error = SynthError;

    fn try_from(offsets: Vec<usize>) -> Result<Self, Self::Error> {
        Self::new(offsets)
    }
}

impl From<EntryPool> for Vec<usize> {
    fn from(pool: EntryPool) -> Self {
        pool.offsets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_rejects_empty() {
        assert_eq!(RateProfile::new(vec![]), Err(SynthError::EmptyProfile));
    }

    #[test]
    fn test_profile_rejects_invalid_rates() {
        assert_eq!(
            RateProfile::new(vec![0.1, -0.2]),
            Err(SynthError::InvalidRate {
                month: 1,
                rate: -0.2
            })
        );
        assert!(matches!(
            RateProfile::new(vec![f64::NAN]),
            Err(SynthError::InvalidRate { month: 0, .. })
        ));
        assert!(RateProfile::new(vec![f64::INFINITY]).is_err());
    }

    #[test]
    fn test_pool_rejects_empty() {
        assert_eq!(EntryPool::new(vec![]), Err(SynthError::EmptyPool));
    }

    #[test]
    fn test_deserialize_validates() {
        let profile: RateProfile = serde_json::from_str("[0.0, 0.5]").unwrap();
        assert_eq!(profile.months(), 2);
        assert!(serde_json::from_str::<RateProfile>("[]").is_err());
        assert!(serde_json::from_str::<EntryPool>("[]").is_err());
        let pool: EntryPool = serde_json::from_str("[3, 12, 40]").unwrap();
        assert_eq!(pool.count_outside(12), 2);
    }
}
