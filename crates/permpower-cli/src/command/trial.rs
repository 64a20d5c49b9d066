use std::path::PathBuf;

use anyhow::Context;
use permpower_stats::{
    p_value::Alternative, permutation::PermutationTest, seed::Seed, window::Window,
};
use permpower_synth::synthesize;

use crate::input;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrialArg {
    /// Input JSON: entry pool and rate profile, or observed histories
    input: PathBuf,
    /// Number of synthetic individuals
    #[arg(long)]
    cohort_size: usize,
    /// Rate multiplier from each individual's entry month onward
    #[arg(long)]
    treatment_factor: f64,
    /// Null samples for the permutation test
    #[arg(long, default_value_t = 99)]
    permutations: usize,
    /// Months before entry to test
    #[arg(long, default_value_t = 24)]
    pre_steps: usize,
    /// Months from entry onward to test
    #[arg(long, default_value_t = 24)]
    post_steps: usize,
    /// Test direction: less, greater or two-sided
    #[arg(long, default_value = "less")]
    alternative: Alternative,
    /// Seed as 32 hex digits
    #[arg(long)]
    seed: Option<Seed>,
}

pub(crate) fn run(arg: &TrialArg) -> anyhow::Result<()> {
    let (profile, pool) = input::load(&arg.input)?;
    let window = Window::new(arg.pre_steps, arg.post_steps);
    window
        .validate(profile.months())
        .context("Invalid test window")?;

    let seed = arg.seed.unwrap_or_else(Seed::random);
    eprintln!("Seed: {seed}");
    let mut rng = seed.rng();

    let entries = synthesize::sample_entries(&pool, arg.cohort_size, &mut rng)
        .context("Failed to sample entry offsets")?;
    let histories = synthesize::simulate(&profile, arg.treatment_factor, &entries, &mut rng)
        .context("Failed to simulate histories")?;
    let outcome = PermutationTest::new(window, arg.permutations)
        .with_alternative(arg.alternative)
        .run(&histories, &entries, &mut rng)
        .context("Permutation test failed")?;

    println!("month\tobserved\tp_value");
    for ((month, observed), (_, p_value)) in outcome.observed.iter().zip(outcome.p_values.iter()) {
        println!("{month}\t{observed:.4}\t{p_value:.4}");
    }
    Ok(())
}
