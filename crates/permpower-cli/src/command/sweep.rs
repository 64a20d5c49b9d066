use std::path::PathBuf;

use anyhow::Context;
use permpower_stats::{p_value::Alternative, seed::Seed};
use permpower_sweep::{
    config::SweepConfig,
    driver::PowerSweep,
    summary::{PowerCell, PowerSummary},
};

use crate::{
    input,
    util::{self, Output},
};

/// Power reported as sufficient in the summary.
const TARGET_POWER: f64 = 0.8;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SweepArg {
    /// Input JSON: entry pool and rate profile, or observed histories
    input: PathBuf,
    /// Sweep configuration JSON file; the flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Cohort sizes to sweep, comma-separated
    #[arg(long, value_delimiter = ',')]
    cohort_sizes: Vec<usize>,
    /// Treatment factors to sweep, comma-separated
    #[arg(long, value_delimiter = ',')]
    treatment_factors: Vec<f64>,
    /// Null samples per permutation test
    #[arg(long)]
    permutations: Option<usize>,
    /// Runs per configuration
    #[arg(long)]
    runs: Option<usize>,
    /// Months before entry to test
    #[arg(long)]
    pre_steps: Option<usize>,
    /// Months from entry onward to test
    #[arg(long)]
    post_steps: Option<usize>,
    /// Test direction: less, greater or two-sided
    #[arg(long)]
    alternative: Option<Alternative>,
    /// Root seed as 32 hex digits
    #[arg(long)]
    seed: Option<Seed>,
    /// Significance level for the power summary
    #[arg(long, default_value_t = 0.05)]
    alpha: f64,
    /// Output CSV file path
    #[arg(long)]
    output: Option<PathBuf>,
}

impl SweepArg {
    fn build_config(&self) -> anyhow::Result<SweepConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_json_file("sweep config", path)?,
            None => SweepConfig::default(),
        };
        if !self.cohort_sizes.is_empty() {
            config.cohort_sizes.clone_from(&self.cohort_sizes);
        }
        if !self.treatment_factors.is_empty() {
            config.treatment_factors.clone_from(&self.treatment_factors);
        }
        if let Some(permutations) = self.permutations {
            config.permutations = permutations;
        }
        if let Some(runs) = self.runs {
            config.runs = runs;
        }
        if let Some(pre_steps) = self.pre_steps {
            config.window.pre_steps = pre_steps;
        }
        if let Some(post_steps) = self.post_steps {
            config.window.post_steps = post_steps;
        }
        if let Some(alternative) = self.alternative {
            config.alternative = alternative;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        Ok(config)
    }
}

pub(crate) fn run(arg: &SweepArg) -> anyhow::Result<()> {
    anyhow::ensure!(
        arg.alpha > 0.0 && arg.alpha < 1.0,
        "alpha must lie strictly between 0 and 1, got {}",
        arg.alpha
    );

    let (profile, pool) = input::load(&arg.input)?;
    let config = arg.build_config()?;
    let sweep = PowerSweep::new(config, profile, pool).context("Failed to set up sweep")?;

    let config = sweep.config();
    eprintln!("Sweep:");
    eprintln!("  Cohort sizes:      {:?}", config.cohort_sizes);
    eprintln!("  Treatment factors: {:?}", config.treatment_factors);
    eprintln!("  Permutations:      {}", config.permutations);
    eprintln!("  Runs:              {}", config.runs);
    eprintln!(
        "  Window:            {}/{}",
        config.window.pre_steps, config.window.post_steps
    );
    eprintln!("  Alternative:       {}", config.alternative);
    eprintln!("  Seed:              {}", sweep.seed());
    eprintln!("  Rows:              {}", sweep.row_count());

    let table = sweep.run().context("Sweep failed")?;

    let output = Output::from_output_path(arg.output.clone())?;
    let display_path = output.display_path();
    output.write_csv(&table)?;
    eprintln!();
    eprintln!("Wrote {} rows to {display_path}", table.len());

    print_summary(&PowerSummary::new(&table, arg.alpha));
    Ok(())
}

fn print_summary(summary: &PowerSummary) {
    eprintln!();
    eprintln!("Power Summary (alpha = {}):", summary.alpha);
    for cell in &summary.cells {
        print_cell(cell);
    }

    let mut factors = summary
        .cells
        .iter()
        .map(|c| c.treatment_factor)
        .collect::<Vec<_>>();
    factors.sort_by(f64::total_cmp);
    factors.dedup();

    eprintln!();
    eprintln!("Smallest Cohort Size (mean power after entry >= {TARGET_POWER}):");
    for factor in factors {
        match summary.smallest_cohort_size(factor, TARGET_POWER) {
            Some(size) => eprintln!("  treatment_factor {factor:.3}: {size}"),
            None => eprintln!("  treatment_factor {factor:.3}: not reached"),
        }
    }
}

fn print_cell(cell: &PowerCell) {
    let best = cell
        .power
        .iter()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(month, power)| (month, *power));
    let mean_p = cell
        .p_values
        .values()
        .iter()
        .map(|s| s.mean)
        .collect::<Vec<_>>();
    let mean_p_min = mean_p.iter().copied().fold(f64::INFINITY, f64::min);
    let mean_p_max = mean_p.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    eprintln!(
        "  n_people {:5} - treatment_factor {:.3} ({} runs):",
        cell.cohort_size, cell.treatment_factor, cell.runs
    );
    eprintln!(
        "    Mean power after entry: {:.3}",
        cell.mean_power_after_entry()
    );
    if let Some((month, power)) = best {
        eprintln!("    Max power:              {power:.3} (month {month})");
    }
    eprintln!("    Mean p-value range:     {mean_p_min:.3} .. {mean_p_max:.3}");
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct Cli {
        #[command(flatten)]
        arg: SweepArg,
    }

    fn parse(args: &[&str]) -> SweepArg {
        Cli::try_parse_from(["permpower"].iter().chain(args)).unwrap().arg
    }

    #[test]
    fn test_defaults_without_flags() {
        let arg = parse(&["input.json"]);
        assert_eq!(arg.build_config().unwrap(), SweepConfig::default());
        assert!((arg.alpha - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn test_flags_override_defaults() {
        let arg = parse(&[
            "input.json",
            "--cohort-sizes",
            "100,200",
            "--treatment-factors",
            "0.5,0.8",
            "--runs",
            "3",
            "--pre-steps",
            "6",
            "--alternative",
            "two-sided",
            "--seed",
            "000102030405060708090a0b0c0d0e0f",
        ]);
        let config = arg.build_config().unwrap();
        assert_eq!(config.cohort_sizes, vec![100, 200]);
        assert_eq!(config.treatment_factors, vec![0.5, 0.8]);
        assert_eq!(config.runs, 3);
        assert_eq!(config.permutations, 99);
        assert_eq!(config.window.pre_steps, 6);
        assert_eq!(config.window.post_steps, 24);
        assert_eq!(config.alternative, Alternative::TwoSided);
        assert_eq!(
            config.seed.map(|s| s.to_string()),
            Some("000102030405060708090a0b0c0d0e0f".to_owned())
        );
    }

    #[test]
    fn test_rejects_malformed_flags() {
        let parse_err = |args: &[&str]| Cli::try_parse_from(["permpower"].iter().chain(args)).is_err();
        assert!(parse_err(&["input.json", "--alternative", "sideways"]));
        assert!(parse_err(&["input.json", "--seed", "xyz"]));
        assert!(parse_err(&["input.json", "--cohort-sizes", "10,abc"]));
    }
}
