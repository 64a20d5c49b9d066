//! Simulation inputs read from JSON.

use std::path::Path;

use anyhow::Context;
use permpower_synth::{
    observed::{ObservedCohort, ObservedHistory},
    profile::{EntryPool, RateProfile},
};

use crate::util;

/// Simulation inputs as written in the input file.
///
/// Either `entry_pool` and `rate_profile` are given directly, or `histories`
/// are given to derive both from. Validation happens in
/// [`into_parts`](Self::into_parts) so that the reason for rejecting an input
/// reaches the user.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationInput {
    entry_pool: Option<Vec<usize>>,
    rate_profile: Option<Vec<f64>>,
    histories: Option<Vec<ObservedHistory>>,
}

impl SimulationInput {
    pub fn read<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        util::read_json_file("input", path)
    }

    pub fn into_parts(self) -> anyhow::Result<(RateProfile, EntryPool)> {
        match self {
            SimulationInput {
                entry_pool: Some(entry_pool),
                rate_profile: Some(rate_profile),
                histories: None,
            } => {
                let profile = RateProfile::new(rate_profile).context("Invalid rate profile")?;
                let pool = EntryPool::new(entry_pool).context("Invalid entry pool")?;
                Ok((profile, pool))
            }
            SimulationInput {
                entry_pool: None,
                rate_profile: None,
                histories: Some(histories),
            } => {
                eprintln!("Deriving inputs from {} observed histories...", histories.len());
                let cohort = ObservedCohort::new(histories).context("Invalid observed cohort")?;
                let profile = cohort
                    .rate_profile()
                    .context("Failed to derive rate profile")?;
                let pool = cohort
                    .entry_pool()
                    .context("Failed to derive entry pool")?;
                Ok((profile, pool))
            }
            SimulationInput {
                histories: Some(_),
                ..
            } => anyhow::bail!(
                "Input must give either histories or entry_pool and rate_profile, not both"
            ),
            SimulationInput {
                entry_pool: None,
                rate_profile: Some(_),
                histories: None,
            } => anyhow::bail!("Input is missing entry_pool"),
            SimulationInput {
                entry_pool: Some(_),
                rate_profile: None,
                histories: None,
            } => anyhow::bail!("Input is missing rate_profile"),
            SimulationInput {
                entry_pool: None,
                rate_profile: None,
                histories: None,
            } => anyhow::bail!("Input must give either histories or entry_pool and rate_profile"),
        }
    }
}

/// Reads `path` and reports the shape of the resulting inputs.
pub fn load<P>(path: P) -> anyhow::Result<(RateProfile, EntryPool)>
where
    P: AsRef<Path>,
{
    let (profile, pool) = SimulationInput::read(path)?.into_parts()?;
    eprintln!(
        "Loaded rate profile of {} months and entry pool of {} offsets",
        profile.months(),
        pool.len()
    );
    let outside = pool.count_outside(profile.months());
    if outside > 0 {
        log::warn!("{outside} entry offsets lie beyond the rate profile");
    }
    Ok((profile, pool))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepared_input() {
        let json = r#"{"entry_pool": [3, 5], "rate_profile": [0.1, 0.2, 0.0, 0.4, 0.1, 0.1]}"#;
        let input: SimulationInput = serde_json::from_str(json).unwrap();
        let (profile, pool) = input.into_parts().unwrap();
        assert_eq!(profile.months(), 6);
        assert_eq!(pool.offsets(), &[3, 5]);
    }

    #[test]
    fn test_observed_input() {
        let json = r#"{"histories": [
            {"start_month": 0, "entry_month": 2, "events": [1, 0, 0]},
            {"start_month": 1, "entry_month": 1, "events": [1, 1, 0]}
        ]}"#;
        let input: SimulationInput = serde_json::from_str(json).unwrap();
        let (profile, pool) = input.into_parts().unwrap();
        assert_eq!(profile.rates(), &[1.0, 0.5, 0.5, 0.0]);
        assert_eq!(pool.offsets(), &[2, 1]);
    }

    fn parts(json: &str) -> anyhow::Result<(RateProfile, EntryPool)> {
        serde_json::from_str::<SimulationInput>(json)
            .unwrap()
            .into_parts()
    }

    #[test]
    fn test_invalid_rate_is_reported() {
        let err = parts(r#"{"entry_pool": [1], "rate_profile": [0.1, -0.2]}"#).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("invalid event rate -0.2 at month 1"), "{message}");
    }

    #[test]
    fn test_empty_pool_is_reported() {
        let err = parts(r#"{"entry_pool": [], "rate_profile": [0.1]}"#).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("entry-offset pool is empty"), "{message}");
    }

    #[test]
    fn test_out_of_range_history_is_reported() {
        let err = parts(
            r#"{"histories": [{"start_month": 18446744073709551615, "entry_month": 0, "events": [1]}]}"#,
        )
        .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("history of individual 0"), "{message}");
    }

    #[test]
    fn test_incomplete_or_mixed_input() {
        let message = |json: &str| format!("{:#}", parts(json).unwrap_err());
        assert!(message(r#"{"rate_profile": [0.1]}"#).contains("missing entry_pool"));
        assert!(message(r#"{"entry_pool": [0]}"#).contains("missing rate_profile"));
        assert!(message("{}").contains("either histories"));
        assert!(
            message(r#"{"entry_pool": [0], "rate_profile": [0.1], "histories": []}"#)
                .contains("not both")
        );
        assert!(message(r#"{"histories": []}"#).contains("cohort has no individuals"));
        assert!(serde_json::from_str::<SimulationInput>(r#"{"entry_pol": [0]}"#).is_err());
    }
}
