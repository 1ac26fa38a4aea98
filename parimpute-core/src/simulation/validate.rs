//! Empirical unbiasedness check for the imputation formulas.
//!
//! Simulates many families at a fixed sibship size and allele frequency,
//! imputes parent B from parent A and the children, and groups replicates by
//! the imputed value. Within each group the mean true genotype of parent B
//! should match the imputed value.

use std::collections::HashMap;

use rand::SeedableRng;
use rayon::prelude::*;
use statrs::function::erf::erfc;
use tracing::{debug, info};

use super::family::simulate_family;
use crate::genotype::GenotypeCounts;
use crate::impute::{check_frequency, impute_counts, ImputeError, ImputedValue};

/// Replicates simulated per parallel work unit.
const CHUNK_SIZE: usize = 10_000;

/// Configuration for [`validate_imputation`].
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Number of children per simulated family.
    pub n_siblings: usize,
    /// Allele frequency used for both simulation and imputation.
    pub frequency: f64,
    /// Number of simulated families.
    pub n_replicates: usize,
    /// Random seed.
    pub seed: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            n_siblings: 2,
            frequency: 0.5,
            n_replicates: 100_000,
            seed: 42,
        }
    }
}

/// Replicates that received the same imputed value.
#[derive(Debug, Clone)]
pub struct ValidationGroup {
    /// The imputed dosage shared by the group.
    pub imputed: f64,
    /// Number of replicates in the group.
    pub count: usize,
    /// Mean true dosage of the hidden parent.
    pub mean_hidden: f64,
    /// Standard error of `mean_hidden`.
    pub std_error: f64,
    /// (mean_hidden - imputed) / std_error; 0 when both coincide exactly.
    pub z_score: f64,
    /// Two-sided normal p-value for `z_score`.
    pub pvalue: f64,
}

/// Outcome of a validation run.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub config: ValidationConfig,
    /// Groups sorted by imputed value.
    pub groups: Vec<ValidationGroup>,
    /// Replicates where the siblings contradicted parent A. Always 0 under
    /// the simulation model.
    pub n_undefined: usize,
}

impl ValidationReport {
    /// Largest |z| over groups with at least `min_count` replicates.
    pub fn max_abs_z(&self, min_count: usize) -> f64 {
        self.groups
            .iter()
            .filter(|g| g.count >= min_count)
            .map(|g| g.z_score.abs())
            .fold(0.0, f64::max)
    }
}

/// Running sums of the hidden parent's dosage.
#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    count: usize,
    sum: f64,
    sum_sq: f64,
}

impl Accumulator {
    fn push(&mut self, x: f64) {
        self.count += 1;
        self.sum += x;
        self.sum_sq += x * x;
    }

    fn merge(&mut self, other: &Accumulator) {
        self.count += other.count;
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
    }
}

/// Imputed value bits -> accumulator. Families with identical counts get
/// bit-identical values, so exact grouping is safe.
type Groups = HashMap<u64, Accumulator>;

fn merge_groups(mut a: (Groups, usize), b: (Groups, usize)) -> (Groups, usize) {
    for (k, acc) in &b.0 {
        a.0.entry(*k).or_default().merge(acc);
    }
    (a.0, a.1 + b.1)
}

fn simulate_chunk(
    config: &ValidationConfig,
    chunk: usize,
    n_rep: usize,
) -> Result<(Groups, usize), ImputeError> {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(config.seed);
    rng.set_stream(chunk as u64);

    let mut groups = Groups::new();
    let mut n_undefined = 0;
    for _ in 0..n_rep {
        let fam = simulate_family(config.n_siblings, config.frequency, &mut rng);
        let counts = GenotypeCounts::from_genotypes(&fam.siblings);
        match impute_counts(counts, fam.parent_a, config.frequency)? {
            ImputedValue::Dosage(v) => groups
                .entry(v.to_bits())
                .or_default()
                .push(f64::from(fam.parent_b)),
            ImputedValue::Undefined => n_undefined += 1,
        }
    }
    Ok((groups, n_undefined))
}

fn summarize(imputed: f64, acc: &Accumulator) -> ValidationGroup {
    let n = acc.count as f64;
    let mean = acc.sum / n;
    let var = if acc.count > 1 {
        ((acc.sum_sq - n * mean * mean) / (n - 1.0)).max(0.0)
    } else {
        0.0
    };
    let std_error = (var / n).sqrt();
    let diff = mean - imputed;
    let z_score = if std_error > 0.0 {
        diff / std_error
    } else if diff.abs() < 1e-12 {
        0.0
    } else {
        diff.signum() * f64::INFINITY
    };
    let pvalue = erfc(z_score.abs() / std::f64::consts::SQRT_2).min(1.0);

    ValidationGroup {
        imputed,
        count: acc.count,
        mean_hidden: mean,
        std_error,
        z_score,
        pvalue,
    }
}

/// Simulate `config.n_replicates` families and compare imputed values with
/// the hidden parent's true genotype.
///
/// Replicates are split into fixed-size chunks with independent ChaCha
/// streams, so the result depends only on the seed, not on the thread count.
pub fn validate_imputation(config: &ValidationConfig) -> Result<ValidationReport, ImputeError> {
    if config.n_siblings == 0 {
        return Err(ImputeError::EmptyFamily);
    }
    check_frequency(config.frequency)?;

    info!(
        "Validating imputation: {} replicates, {} siblings, f={}",
        config.n_replicates, config.n_siblings, config.frequency
    );

    let n_chunks = config.n_replicates.div_ceil(CHUNK_SIZE);
    let (groups, n_undefined) = (0..n_chunks)
        .into_par_iter()
        .map(|chunk| {
            let start = chunk * CHUNK_SIZE;
            let n_rep = CHUNK_SIZE.min(config.n_replicates - start);
            simulate_chunk(config, chunk, n_rep)
        })
        .try_reduce(|| (Groups::new(), 0), |a, b| Ok(merge_groups(a, b)))?;

    let mut groups: Vec<ValidationGroup> = groups
        .iter()
        .map(|(bits, acc)| summarize(f64::from_bits(*bits), acc))
        .collect();
    groups.sort_by(|a, b| a.imputed.total_cmp(&b.imputed));

    for g in &groups {
        debug!(
            "imputed={:.6} n={} mean_hidden={:.6} z={:.3}",
            g.imputed, g.count, g.mean_hidden, g.z_score
        );
    }

    Ok(ValidationReport {
        config: config.clone(),
        groups,
        n_undefined,
    })
}
