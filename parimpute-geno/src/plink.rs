//! PLINK bed/bim/fam reader using memory-mapped files.
//!
//! PLINK binary format consists of three files:
//! - .bed: Binary genotype data (2 bits per genotype, packed)
//! - .bim: Variant information (chrom, id, cm, pos, a1, a2)
//! - .fam: Sample information (fid, iid, father, mother, sex, pheno)
//!
//! Reference: https://www.cog-genomics.org/plink/1.9/formats#bed

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use memmap2::Mmap;
use tracing::debug;

use crate::traits::{GenotypeReader, MarkerData, MarkerInfo};

/// PLINK BIM file entry (one per variant).
#[derive(Debug, Clone)]
pub struct BimEntry {
    pub chrom: String,
    pub id: String,
    pub pos: u64,
    pub allele1: String, // Counted allele
    pub allele2: String,
}

/// Reader for PLINK bed/bim/fam files.
pub struct PlinkReader {
    /// Memory-mapped .bed file.
    mmap: Mmap,
    /// Variant information from .bim file.
    bim: Vec<BimEntry>,
    /// Sample IIDs from the .fam file.
    fam: Vec<String>,
    /// IID -> row in the .fam file.
    fam_index: HashMap<String, usize>,
    /// Number of bytes per marker in the bed file.
    bytes_per_marker: usize,
    /// Sample IDs in read order.
    sample_ids: Vec<String>,
    /// Indices of selected samples (None = all samples).
    sample_subset: Option<Vec<usize>>,
}

/// `base` with `.ext` appended. Prefixes may contain dots (cohort.chr22).
fn fileset_path(base: &Path, ext: &str) -> PathBuf {
    let mut path = OsString::from(base.as_os_str());
    path.push(".");
    path.push(ext);
    PathBuf::from(path)
}

impl PlinkReader {
    /// Open PLINK files from a base path (without extension).
    /// Will look for .bed, .bim, .fam files.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self> {
        let base = base_path.as_ref();
        let bed_path = fileset_path(base, "bed");
        let bim_path = fileset_path(base, "bim");
        let fam_path = fileset_path(base, "fam");

        let fam = Self::parse_fam(&fam_path)?;
        let bim = Self::parse_bim(&bim_path)?;

        let bed_file = std::fs::File::open(&bed_path)
            .with_context(|| format!("Failed to open bed file: {}", bed_path.display()))?;
        // SAFETY: the mapping is read-only and lives as long as the reader.
        let mmap = unsafe { Mmap::map(&bed_file)? };

        if mmap.len() < 3 {
            bail!("Bed file too small");
        }
        if mmap[0] != 0x6C || mmap[1] != 0x1B {
            bail!("Invalid PLINK bed file magic number");
        }
        if mmap[2] != 0x01 {
            bail!("Only SNP-major bed files are supported (mode byte = 0x01)");
        }

        let bytes_per_marker = fam.len().div_ceil(4);
        let expected_size = 3 + bytes_per_marker * bim.len();
        if mmap.len() < expected_size {
            bail!(
                "Bed file too small: expected at least {} bytes, got {}",
                expected_size,
                mmap.len()
            );
        }

        let mut fam_index = HashMap::with_capacity(fam.len());
        for (i, iid) in fam.iter().enumerate() {
            if fam_index.insert(iid.clone(), i).is_some() {
                bail!("Duplicate sample ID in fam file: {}", iid);
            }
        }
        let sample_ids = fam.clone();

        debug!(
            "Opened PLINK fileset {}: {} samples, {} markers",
            base.display(),
            fam.len(),
            bim.len()
        );

        Ok(Self {
            mmap,
            bim,
            fam,
            fam_index,
            bytes_per_marker,
            sample_ids,
            sample_subset: None,
        })
    }

    /// Parse a .fam file, keeping the IID column.
    fn parse_fam(path: &Path) -> Result<Vec<String>> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fam file: {}", path.display()))?;
        let mut entries = Vec::new();
        for (line_num, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 6 {
                bail!("Fam file line {} has fewer than 6 fields", line_num + 1);
            }
            entries.push(fields[1].to_string());
        }
        Ok(entries)
    }

    /// Parse a .bim file.
    fn parse_bim(path: &Path) -> Result<Vec<BimEntry>> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read bim file: {}", path.display()))?;
        let mut entries = Vec::new();
        for (line_num, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 6 {
                bail!("Bim file line {} has fewer than 6 fields", line_num + 1);
            }
            let pos = fields[3].parse().with_context(|| {
                format!("Bim file line {}: invalid position '{}'", line_num + 1, fields[3])
            })?;
            entries.push(BimEntry {
                chrom: fields[0].to_string(),
                id: fields[1].to_string(),
                pos,
                allele1: fields[4].to_string(),
                allele2: fields[5].to_string(),
            });
        }
        Ok(entries)
    }

    /// Decode a single genotype from the bed file.
    /// Returns dosage of allele1: 0, 1, 2, or NaN for missing.
    #[inline]
    fn decode_genotype(byte: u8, offset: usize) -> f64 {
        match (byte >> (offset * 2)) & 0x03 {
            0b00 => 2.0,      // Homozygous A1/A1
            0b01 => f64::NAN, // Missing
            0b10 => 1.0,      // Heterozygous A1/A2
            _ => 0.0,         // Homozygous A2/A2
        }
    }

    #[inline]
    fn decode_sample(&self, marker_offset: usize, sample_idx: usize) -> f64 {
        let byte = self.mmap[marker_offset + sample_idx / 4];
        Self::decode_genotype(byte, sample_idx % 4)
    }

    fn marker_info(&self, index: usize) -> MarkerInfo {
        let bim = &self.bim[index];
        MarkerInfo {
            chrom: bim.chrom.clone(),
            pos: bim.pos,
            id: bim.id.clone(),
            ref_allele: bim.allele2.clone(),
            alt_allele: bim.allele1.clone(),
        }
    }
}

impl GenotypeReader for PlinkReader {
    fn n_markers(&self) -> usize {
        self.bim.len()
    }

    fn n_samples(&self) -> usize {
        match &self.sample_subset {
            Some(indices) => indices.len(),
            None => self.fam.len(),
        }
    }

    fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    fn set_sample_subset(&mut self, ids: &[String]) -> Result<()> {
        let mut indices = Vec::with_capacity(ids.len());
        let mut new_ids = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(&pos) = self.fam_index.get(id) {
                indices.push(pos);
                new_ids.push(id.clone());
            }
        }
        debug!("Sample subset: {} of {} requested IDs found", indices.len(), ids.len());
        self.sample_subset = Some(indices);
        self.sample_ids = new_ids;
        Ok(())
    }

    fn read_marker(&mut self, index: u64) -> Result<MarkerData> {
        let marker_idx = index as usize;
        if marker_idx >= self.bim.len() {
            bail!("Marker index {} out of range ({})", index, self.bim.len());
        }

        let offset = 3 + marker_idx * self.bytes_per_marker;
        let dosages: Vec<f64> = match &self.sample_subset {
            Some(indices) => indices
                .iter()
                .map(|&i| self.decode_sample(offset, i))
                .collect(),
            None => (0..self.fam.len())
                .map(|i| self.decode_sample(offset, i))
                .collect(),
        };

        let af = MarkerData::compute_af(&dosages);

        Ok(MarkerData {
            info: self.marker_info(marker_idx),
            dosages,
            af,
        })
    }
}
