use clap::{Parser, Subcommand};

use self::{sweep::SweepArg, trial::TrialArg};

mod sweep;
mod trial;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Estimate power over cohort sizes and treatment factors
    Sweep(#[clap(flatten)] SweepArg),
    /// Simulate and test a single synthetic cohort
    Trial(#[clap(flatten)] TrialArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Sweep(arg) => sweep::run(&arg)?,
        Mode::Trial(arg) => trial::run(&arg)?,
    }
    Ok(())
}
