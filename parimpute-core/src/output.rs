//! Imputed parental genotypes and their on-disk store.
//!
//! Binary format: bincode-serialized [`ParentalGenotypes`] carrying magic
//! bytes (PIMP) and a format version. A JSON summary and a tab-separated
//! matrix can be written alongside for inspection.

use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use parimpute_geno::pedigree::ResolvedPedigree;
use parimpute_geno::traits::MarkerInfo;

/// One imputed parent (output row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyRecord {
    /// Label of the ungenotyped parent being imputed.
    pub label: String,
    /// The genotyped parent.
    pub parent: String,
    /// Genotyped offspring used for imputation.
    pub offspring: Vec<String>,
}

/// Estimated genotypes of missing parents, families x markers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentalGenotypes {
    pub magic: [u8; 4],
    pub version: u32,
    /// Output rows.
    pub families: Vec<FamilyRecord>,
    /// Pedigree rows actually used: (offspring, parent, missing parent).
    pub pedigree: Vec<(String, String, Option<String>)>,
    pub variant_ids: Vec<String>,
    pub chroms: Vec<String>,
    pub positions: Vec<u64>,
    /// Row-major values, NaN where undefined.
    pub values: Vec<f32>,
}

/// Human-readable sidecar contents.
#[derive(Debug, Serialize)]
struct Summary<'a> {
    version: u32,
    n_families: usize,
    n_markers: usize,
    n_defined: usize,
    families: &'a [FamilyRecord],
}

impl ParentalGenotypes {
    pub const MAGIC: [u8; 4] = *b"PIMP";
    pub const VERSION: u32 = 1;

    /// Assemble the store from per-marker columns (one value per sibship).
    pub fn from_columns(
        pedigree: &ResolvedPedigree,
        markers: &[MarkerInfo],
        columns: &[Vec<f32>],
    ) -> Self {
        let n_families = pedigree.sibships.len();
        debug_assert!(columns.iter().all(|c| c.len() == n_families));

        let values = (0..n_families)
            .flat_map(|i| columns.iter().map(move |col| col[i]))
            .collect();

        Self {
            magic: Self::MAGIC,
            version: Self::VERSION,
            families: pedigree
                .sibships
                .iter()
                .map(|s| FamilyRecord {
                    label: s.label(),
                    parent: s.parent.clone(),
                    offspring: s.offspring.clone(),
                })
                .collect(),
            pedigree: pedigree
                .rows
                .iter()
                .map(|r| (r.offspring.clone(), r.parent.clone(), r.missing_parent.clone()))
                .collect(),
            variant_ids: markers.iter().map(|m| m.id.clone()).collect(),
            chroms: markers.iter().map(|m| m.chrom.clone()).collect(),
            positions: markers.iter().map(|m| m.pos).collect(),
            values,
        }
    }

    pub fn n_families(&self) -> usize {
        self.families.len()
    }

    pub fn n_markers(&self) -> usize {
        self.variant_ids.len()
    }

    /// Imputed dosages of one family across all markers.
    pub fn row(&self, family: usize) -> &[f32] {
        let m = self.n_markers();
        &self.values[family * m..(family + 1) * m]
    }

    pub fn get(&self, family: usize, marker: usize) -> f32 {
        self.values[family * self.n_markers() + marker]
    }

    /// Number of defined (non-NaN) values.
    pub fn n_defined(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }

    fn check_shape(&self) -> Result<()> {
        let expected = self.n_families() * self.n_markers();
        if self.values.len() != expected
            || self.chroms.len() != self.n_markers()
            || self.positions.len() != self.n_markers()
        {
            bail!(
                "Inconsistent parental genotype store: {} values for {} families x {} markers",
                self.values.len(),
                self.n_families(),
                self.n_markers()
            );
        }
        Ok(())
    }
}

/// Save to a binary file.
pub fn save(out: &ParentalGenotypes, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    bincode::serialize_into(&mut writer, out)?;
    writer.flush()?;
    Ok(())
}

/// Load from a binary file written by [`save`].
pub fn load(path: &Path) -> Result<ParentalGenotypes> {
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read output file: {}", path.display()))?;
    let out: ParentalGenotypes = bincode::deserialize(&data)?;

    if out.magic != ParentalGenotypes::MAGIC {
        bail!(
            "Invalid parental genotype file: expected magic bytes {:?}, got {:?}",
            ParentalGenotypes::MAGIC,
            out.magic
        );
    }
    if out.version != ParentalGenotypes::VERSION {
        bail!("Unsupported parental genotype file version {}", out.version);
    }
    out.check_shape()?;
    Ok(out)
}

/// Save a JSON summary (dimensions and family labels).
pub fn save_json(out: &ParentalGenotypes, path: &Path) -> Result<()> {
    let summary = Summary {
        version: out.version,
        n_families: out.n_families(),
        n_markers: out.n_markers(),
        n_defined: out.n_defined(),
        families: &out.families,
    };
    let json = serde_json::to_string_pretty(&summary)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write JSON summary: {}", path.display()))?;
    Ok(())
}

/// Write the matrix as TSV: one row per family, one column per variant.
/// Undefined values are written as NA.
pub fn write_tsv(out: &ParentalGenotypes, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create TSV file: {}", path.display()))?;
    let mut w = BufWriter::new(file);

    write!(w, "LABEL\tPARENT")?;
    for id in &out.variant_ids {
        write!(w, "\t{}", id)?;
    }
    writeln!(w)?;

    for (i, fam) in out.families.iter().enumerate() {
        write!(w, "{}\t{}", fam.label, fam.parent)?;
        for &v in out.row(i) {
            if v.is_nan() {
                write!(w, "\tNA")?;
            } else {
                write!(w, "\t{:.6}", v)?;
            }
        }
        writeln!(w)?;
    }
    w.flush()?;
    Ok(())
}
