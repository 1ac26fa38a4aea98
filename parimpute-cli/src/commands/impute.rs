//! Impute missing parents.
//!
//! parimpute impute --bfile ... --pedigree ... --out ...

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use tracing::{info, warn};

use parimpute_core::output;
use parimpute_core::pipeline::{run_imputation, ImputeConfig};
use parimpute_geno::pedigree::{parse_pedigree, resolve_sibships};
use parimpute_geno::plink::PlinkReader;
use parimpute_geno::traits::GenotypeReader;

#[derive(Args)]
pub struct ImputeArgs {
    /// PLINK file prefix (.bed/.bim/.fam) with parent and offspring genotypes
    #[arg(long)]
    bfile: String,

    /// Pedigree file: header line, then OFFSPRING PARENT [MISSING_PARENT]
    #[arg(long)]
    pedigree: String,

    /// Output prefix; writes <out>.pimp
    #[arg(long)]
    out: String,

    /// Also write a JSON summary (<out>.pimp.json)
    #[arg(long, default_value = "false")]
    json: bool,

    /// Also write the matrix as tab-separated text (<out>.tsv)
    #[arg(long, default_value = "false")]
    tsv: bool,

    /// Markers read per parallel batch
    #[arg(long, default_value = "1024")]
    chunk_size: usize,
}

fn with_suffix(prefix: &str, suffix: &str) -> PathBuf {
    PathBuf::from(format!("{}{}", prefix, suffix))
}

pub fn run(args: ImputeArgs) -> Result<()> {
    info!("=== parimpute: imputing missing parents ===");

    let mut reader = PlinkReader::new(&args.bfile)?;
    info!(
        "Genotype file: {} markers x {} samples",
        reader.n_markers(),
        reader.n_samples()
    );

    let rows = parse_pedigree(Path::new(&args.pedigree))?;
    let pedigree = resolve_sibships(&rows, reader.sample_ids());
    if pedigree.n_dropped > 0 {
        warn!(
            "Dropped {} of {} pedigree rows with ungenotyped samples",
            pedigree.n_dropped,
            rows.len()
        );
    }
    info!(
        "Pedigree: {} rows, {} sibships",
        pedigree.rows.len(),
        pedigree.sibships.len()
    );

    let config = ImputeConfig {
        chunk_size: args.chunk_size,
    };
    let result = run_imputation(&mut reader, &pedigree, &config)?;

    let out_path = with_suffix(&args.out, ".pimp");
    output::save(&result, &out_path)?;
    info!("Wrote {}", out_path.display());

    if args.json {
        let json_path = with_suffix(&args.out, ".pimp.json");
        output::save_json(&result, &json_path)?;
        info!("Wrote {}", json_path.display());
    }
    if args.tsv {
        let tsv_path = with_suffix(&args.out, ".tsv");
        output::write_tsv(&result, &tsv_path)?;
        info!("Wrote {}", tsv_path.display());
    }

    Ok(())
}
