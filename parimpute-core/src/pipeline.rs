//! Per-marker driver: genotype reader + sibships -> parental genotype matrix.
//!
//! Markers are read sequentially in chunks; each chunk is imputed in
//! parallel, one output column per marker, and the columns are assembled
//! into a families x markers matrix at the end.

use anyhow::{bail, Result};
use rayon::prelude::*;
use tracing::{debug, info, trace};

use parimpute_geno::pedigree::{ResolvedPedigree, Sibship};
use parimpute_geno::sample::{subset_in_file_order, SampleIndex};
use parimpute_geno::traits::{GenotypeReader, MarkerData, MarkerInfo};

use crate::genotype::{GenotypeClass, GenotypeCounts};
use crate::impute::{impute_counts, ImputedValue};
use crate::output::ParentalGenotypes;

/// Driver configuration.
#[derive(Debug, Clone)]
pub struct ImputeConfig {
    /// Markers read into memory per parallel batch.
    pub chunk_size: usize,
}

impl Default for ImputeConfig {
    fn default() -> Self {
        Self { chunk_size: 1024 }
    }
}

/// A sibship as positions into the reader's sample order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyIndex {
    pub parent: usize,
    pub siblings: Vec<usize>,
}

impl FamilyIndex {
    /// Map sibships onto the reader's current sample order.
    pub fn from_sibships(sibships: &[Sibship], sample_ids: &[String]) -> Result<Vec<Self>> {
        let index = SampleIndex::new(sample_ids);
        let lookup = |id: &str| match index.get(id) {
            Some(i) => Ok(i),
            None => bail!("Sample {} not present in genotype data", id),
        };

        sibships
            .iter()
            .map(|sib| {
                if sib.offspring.is_empty() {
                    bail!("Sibship of parent {} has no offspring", sib.parent);
                }
                Ok(FamilyIndex {
                    parent: lookup(sib.parent.as_str())?,
                    siblings: sib
                        .offspring
                        .iter()
                        .map(|o| lookup(o.as_str()))
                        .collect::<Result<_>>()?,
                })
            })
            .collect()
    }
}

/// Impute one family at one marker from raw dosages.
///
/// Missing sibling calls (NaN) are skipped. The result is undefined when the
/// parent call is missing, no sibling call remains, a call is not a hard
/// 0/1/2 genotype, or the frequency is unusable.
pub fn impute_family(dosages: &[f64], family: &FamilyIndex, frequency: f64) -> ImputedValue {
    let parent = match GenotypeClass::from_dosage(dosages[family.parent]) {
        Ok(g) => g,
        Err(_) => return ImputedValue::Undefined,
    };

    let mut counts = GenotypeCounts::default();
    for &s in &family.siblings {
        let d = dosages[s];
        if d.is_nan() {
            continue;
        }
        match GenotypeClass::from_dosage(d) {
            Ok(g) => counts.add(g),
            Err(e) => {
                trace!("Sibling sample {}: {}", s, e);
                return ImputedValue::Undefined;
            }
        }
    }

    match impute_counts(counts, parent, frequency) {
        Ok(v) => v,
        Err(e) => {
            trace!("Family with parent sample {}: {}", family.parent, e);
            ImputedValue::Undefined
        }
    }
}

/// Impute every family at one marker. NaN marks undefined values.
pub fn impute_marker(dosages: &[f64], families: &[FamilyIndex], frequency: f64) -> Vec<f32> {
    families
        .iter()
        .map(|fam| impute_family(dosages, fam, frequency).to_f64() as f32)
        .collect()
}

fn impute_block(block: &[MarkerData], families: &[FamilyIndex]) -> Vec<Vec<f32>> {
    block
        .par_iter()
        .map(|m| impute_marker(&m.dosages, families, m.af))
        .collect()
}

/// Read all markers from `reader` and impute each family.
///
/// Returns the marker metadata and one column per marker (one value per
/// family). `families` must index the reader's current sample order.
pub fn impute_reader<R: GenotypeReader + ?Sized>(
    reader: &mut R,
    families: &[FamilyIndex],
    config: &ImputeConfig,
) -> Result<(Vec<MarkerInfo>, Vec<Vec<f32>>)> {
    let n_markers = reader.n_markers();
    let n_samples = reader.n_samples();
    if let Some(fam) = families
        .iter()
        .find(|f| f.parent >= n_samples || f.siblings.iter().any(|&s| s >= n_samples))
    {
        bail!(
            "Family with parent index {} refers to samples beyond the {} read",
            fam.parent,
            n_samples
        );
    }
    let chunk_size = config.chunk_size.max(1);

    let mut markers = Vec::with_capacity(n_markers);
    let mut columns = Vec::with_capacity(n_markers);

    for start in (0..n_markers).step_by(chunk_size) {
        let end = (start + chunk_size).min(n_markers);
        let block = (start..end)
            .map(|j| reader.read_marker(j as u64))
            .collect::<Result<Vec<_>>>()?;

        columns.extend(impute_block(&block, families));
        markers.extend(block.into_iter().map(|m| m.info));
        debug!("Imputed markers {}..{} of {}", start, end, n_markers);
    }

    Ok((markers, columns))
}

/// Full run: restrict the reader to pedigree samples, impute every sibship
/// at every marker, and assemble the output store.
pub fn run_imputation<R: GenotypeReader + ?Sized>(
    reader: &mut R,
    pedigree: &ResolvedPedigree,
    config: &ImputeConfig,
) -> Result<ParentalGenotypes> {
    if pedigree.sibships.is_empty() {
        bail!("No sibships with genotyped parent and offspring");
    }

    let wanted = subset_in_file_order(reader.sample_ids(), &pedigree.sample_ids());
    reader.set_sample_subset(&wanted)?;
    let families = FamilyIndex::from_sibships(&pedigree.sibships, reader.sample_ids())?;

    info!(
        "Imputing {} missing parents from {} genotyped samples at {} markers",
        families.len(),
        reader.n_samples(),
        reader.n_markers()
    );

    let (markers, columns) = impute_reader(reader, &families, config)?;
    let out = ParentalGenotypes::from_columns(pedigree, &markers, &columns);

    info!(
        "Done: {} of {} values defined",
        out.n_defined(),
        out.values.len()
    );
    Ok(out)
}
