//! Core traits for genotype reading.

use anyhow::Result;

/// Information about a genetic marker (variant).
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerInfo {
    /// Chromosome (e.g. "1", "22", "X").
    pub chrom: String,
    /// Position in base pairs.
    pub pos: u64,
    /// Marker/variant ID (e.g. rsID).
    pub id: String,
    /// Reference allele.
    pub ref_allele: String,
    /// Alternative allele (the allele counted by the dosage).
    pub alt_allele: String,
}

/// Data for a single marker across the selected samples.
#[derive(Debug, Clone)]
pub struct MarkerData {
    /// Marker metadata.
    pub info: MarkerInfo,
    /// Dosage values for each sample (0.0, 1.0 or 2.0).
    /// Missing calls are represented as NaN.
    pub dosages: Vec<f64>,
    /// Frequency of the counted allele among non-missing calls.
    /// NaN when every call is missing.
    pub af: f64,
}

impl MarkerData {
    /// Allele frequency from dosages: mean dosage / 2 over non-missing calls.
    ///
    /// With no valid calls the frequency is NaN so that downstream
    /// imputation leaves the marker undefined.
    pub fn compute_af(dosages: &[f64]) -> f64 {
        let (sum, n) = dosages.iter().fold((0.0, 0usize), |(s, n), &d| {
            if d.is_nan() {
                (s, n)
            } else {
                (s + d, n + 1)
            }
        });
        if n > 0 {
            sum / (2.0 * n as f64)
        } else {
            f64::NAN
        }
    }
}

/// Trait for reading genotype data. The imputation driver is generic over it.
pub trait GenotypeReader: Send {
    /// Total number of markers in the file.
    fn n_markers(&self) -> usize;

    /// Number of samples returned by `read_marker`.
    fn n_samples(&self) -> usize;

    /// Sample IDs in the order dosages are returned.
    fn sample_ids(&self) -> &[String];

    /// Restrict subsequent `read_marker` calls to these samples, in this
    /// order. Unknown IDs are skipped.
    fn set_sample_subset(&mut self, ids: &[String]) -> Result<()>;

    /// Read genotype data for marker at the given index.
    fn read_marker(&mut self, index: u64) -> Result<MarkerData>;
}
