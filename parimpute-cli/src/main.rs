//! parimpute: imputation of ungenotyped parents from genotyped sibships.
//!
//! CLI entry point using clap for argument parsing.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "parimpute",
    version,
    about = "Impute the genotype of an ungenotyped parent from its genotyped children",
    long_about = "Estimates the expected genotype dosage of a missing parent at every marker\n\
                  from the genotypes of its children and of the other (genotyped) parent,\n\
                  using the sample allele frequency as a Hardy-Weinberg prior."
)]
struct Cli {
    /// Number of threads to use
    #[arg(long, default_value = "1", global = true)]
    threads: usize,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Impute missing parents from a PLINK fileset and a pedigree
    Impute(commands::impute::ImputeArgs),

    /// Check the imputation formulas against simulated families
    Validate(commands::validate::ValidateArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    rayon::ThreadPoolBuilder::new()
        .num_threads(cli.threads)
        .build_global()
        .ok();

    tracing::info!("parimpute v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Using {} threads", cli.threads);

    match cli.command {
        Commands::Impute(args) => commands::impute::run(args),
        Commands::Validate(args) => commands::validate::run(args),
    }
}
