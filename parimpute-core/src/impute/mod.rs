//! Imputation of an ungenotyped parent from its genotyped children.
//!
//! Model: each parent transmits one of its two alleles to each child
//! independently and uniformly at random; the missing parent's genotype has
//! a Hardy-Weinberg prior at allele frequency `f`. The returned value is the
//! posterior expectation of the missing parent's dosage given the sibling
//! genotype counts and the genotyped parent's class.

mod cases;
pub mod formulas;

use thiserror::Error;

use crate::genotype::{GenotypeClass, GenotypeCounts};

pub use cases::ImputationCase;

/// Malformed arguments to the imputation engine.
///
/// Sibling genotypes that contradict the model are not errors; they produce
/// [`ImputedValue::Undefined`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImputeError {
    #[error("no genotyped siblings supplied")]
    EmptyFamily,

    #[error("allele frequency {0} is outside [0, 1]")]
    InvalidFrequency(f64),

    #[error("genotype class {0} is outside {{0, 1, 2}}")]
    InvalidGenotype(i64),

    #[error("dosage {0} is not a hard call (0, 1 or 2)")]
    InvalidDosage(f64),
}

/// Estimated dosage of the missing parent, or undefined when the siblings
/// are incompatible with the genotyped parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImputedValue {
    Dosage(f64),
    Undefined,
}

impl ImputedValue {
    pub fn value(self) -> Option<f64> {
        match self {
            ImputedValue::Dosage(v) => Some(v),
            ImputedValue::Undefined => None,
        }
    }

    /// NaN for undefined, as stored in output matrices.
    pub fn to_f64(self) -> f64 {
        self.value().unwrap_or(f64::NAN)
    }
}

impl From<ImputedValue> for f64 {
    fn from(v: ImputedValue) -> f64 {
        v.to_f64()
    }
}

/// Reject frequencies that are NaN, infinite or outside [0, 1].
///
/// The endpoints are accepted: every formula has a finite limit there.
pub fn check_frequency(f: f64) -> Result<(), ImputeError> {
    if (0.0..=1.0).contains(&f) {
        Ok(())
    } else {
        Err(ImputeError::InvalidFrequency(f))
    }
}

/// Impute the missing parent's dosage from sibling genotypes.
///
/// Only the counts of each sibling class matter, so the order of `siblings`
/// is irrelevant.
///
/// # Errors
/// - [`ImputeError::EmptyFamily`] if `siblings` is empty
/// - [`ImputeError::InvalidFrequency`] if `frequency` is not in [0, 1]
pub fn impute(
    siblings: &[GenotypeClass],
    parent: GenotypeClass,
    frequency: f64,
) -> Result<ImputedValue, ImputeError> {
    impute_counts(GenotypeCounts::from_genotypes(siblings), parent, frequency)
}

/// [`impute`] on precomputed sibling counts.
pub fn impute_counts(
    counts: GenotypeCounts,
    parent: GenotypeClass,
    frequency: f64,
) -> Result<ImputedValue, ImputeError> {
    check_frequency(frequency)?;
    let case = ImputationCase::classify(parent, counts)?;
    Ok(case.estimate(frequency))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genotype::GenotypeClass::*;

    fn value(sibs: &[GenotypeClass], parent: GenotypeClass, f: f64) -> f64 {
        impute(sibs, parent, f).unwrap().to_f64()
    }

    #[test]
    fn test_single_het_sibling_het_parent() {
        assert!((value(&[Het], Het, 0.3) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_two_hom_alt_siblings_hom_alt_parent() {
        for &f in &[0.05, 0.3, 0.5, 0.9] {
            let expected = (1.0 + 3.0 * f) / (1.0 + f);
            assert!((value(&[HomAlt, HomAlt], HomAlt, f) - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_contradictions_are_undefined() {
        for &f in &[0.0, 0.2, 0.5, 1.0] {
            assert_eq!(impute(&[HomRef], HomAlt, f).unwrap(), ImputedValue::Undefined);
            assert_eq!(
                impute(&[HomAlt, Het, HomRef], HomAlt, f).unwrap(),
                ImputedValue::Undefined
            );
            assert_eq!(impute(&[HomAlt], HomRef, f).unwrap(), ImputedValue::Undefined);
            assert_eq!(
                impute(&[HomRef, HomAlt], HomRef, f).unwrap(),
                ImputedValue::Undefined
            );
        }
    }

    #[test]
    fn test_het_parent_mixed_homozygous_children() {
        assert_eq!(value(&[HomRef, Het, HomAlt], Het, 0.1), 1.0);
    }

    #[test]
    fn test_het_parent_uses_only_hom_alt_count() {
        // Heterozygous children carry no information about the missing parent.
        let f = 0.25;
        let a = value(&[HomAlt, HomAlt], Het, f);
        let b = value(&[HomAlt, Het, HomAlt, Het, Het], Het, f);
        assert_eq!(a, b);
        assert!((a - (1.0 + 3.0 * f) / (1.0 + f)).abs() < 1e-12);
    }

    #[test]
    fn test_het_parent_hom_ref_children() {
        // e = n - n1 - 1 = 1 -> f / (2 - f)
        let f = 0.4;
        let v = value(&[HomRef, Het, HomRef], Het, f);
        assert!((v - f / (2.0 - f)).abs() < 1e-12);
    }

    #[test]
    fn test_order_invariance() {
        let f = 0.17;
        let a = impute(&[Het, HomAlt, Het], HomAlt, f).unwrap();
        let b = impute(&[HomAlt, Het, Het], HomAlt, f).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_frequency_validation() {
        assert_eq!(
            impute(&[Het], Het, 1.5),
            Err(ImputeError::InvalidFrequency(1.5))
        );
        assert_eq!(
            impute(&[Het], Het, -0.1),
            Err(ImputeError::InvalidFrequency(-0.1))
        );
        assert!(impute(&[Het], Het, f64::NAN).is_err());
        assert!(impute(&[Het], Het, f64::INFINITY).is_err());
    }

    #[test]
    fn test_boundary_frequencies_are_limits() {
        assert_eq!(value(&[HomAlt, HomAlt], HomAlt, 0.0), 1.0);
        assert_eq!(value(&[HomAlt, HomAlt], HomAlt, 1.0), 2.0);
        assert_eq!(value(&[Het, Het], HomAlt, 0.0), 0.0);
        assert_eq!(value(&[Het, Het], HomAlt, 1.0), 1.0);
        assert_eq!(value(&[Het], Het, 0.0), 0.0);
        assert_eq!(value(&[Het], Het, 1.0), 2.0);
        assert_eq!(value(&[HomRef, HomRef], HomRef, 0.0), 0.0);
        assert_eq!(value(&[Het, Het], HomRef, 1.0), 2.0);
    }

    #[test]
    fn test_empty_family() {
        assert_eq!(impute(&[], Het, 0.3), Err(ImputeError::EmptyFamily));
    }

    #[test]
    fn test_undefined_maps_to_nan() {
        assert!(ImputedValue::Undefined.to_f64().is_nan());
        assert_eq!(ImputedValue::Undefined.value(), None);
        assert_eq!(f64::from(ImputedValue::Dosage(1.25)), 1.25);
    }
}
