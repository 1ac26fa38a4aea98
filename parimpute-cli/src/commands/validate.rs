//! Simulation check of the imputation formulas.
//!
//! parimpute validate --n-siblings 2 --freq 0.5 --replicates 1000000

use anyhow::Result;
use clap::Args;
use tracing::{info, warn};

use parimpute_core::simulation::{validate_imputation, ValidationConfig};

#[derive(Args)]
pub struct ValidateArgs {
    /// Children per simulated family
    #[arg(long, default_value = "2")]
    n_siblings: usize,

    /// Allele frequency
    #[arg(long, default_value = "0.5")]
    freq: f64,

    /// Number of simulated families
    #[arg(long, default_value = "1000000")]
    replicates: usize,

    /// Random seed
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Flag groups whose |z| exceeds this threshold
    #[arg(long, default_value = "4.0")]
    max_z: f64,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let config = ValidationConfig {
        n_siblings: args.n_siblings,
        frequency: args.freq,
        n_replicates: args.replicates,
        seed: args.seed,
    };
    let report = validate_imputation(&config)?;

    println!("imputed\tcount\tmean_hidden\tstd_error\tz\tpvalue");
    for g in &report.groups {
        println!(
            "{:.6}\t{}\t{:.6}\t{:.6}\t{:.3}\t{:.4e}",
            g.imputed, g.count, g.mean_hidden, g.std_error, g.z_score, g.pvalue
        );
    }
    if report.n_undefined > 0 {
        println!("undefined\t{}", report.n_undefined);
    }

    let max_z = report.max_abs_z(0);
    if max_z > args.max_z {
        for g in report.groups.iter().filter(|g| g.z_score.abs() > args.max_z) {
            warn!(
                "Imputed value {:.6} deviates from simulated mean {:.6} (z = {:.2})",
                g.imputed, g.mean_hidden, g.z_score
            );
        }
    } else {
        info!("All groups within |z| <= {} (max {:.2})", args.max_z, max_z);
    }

    Ok(())
}
